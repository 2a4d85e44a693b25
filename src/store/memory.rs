//! In-memory backend for all three storage traits. Backs the test suite and
//! local runs without external services; the save/un-save and moderation
//! collaborators are simulated through the mutator methods.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::model::{Deal, Notification, Save, SavedDeal};
use crate::store::{NotificationStore, SaveStore, UserDirectory};
use crate::windows::WindowKey;

#[derive(Default)]
pub struct MemoryStore {
    deals: RwLock<HashMap<String, Deal>>,
    // keyed by (user_id, deal_id)
    saves: RwLock<HashMap<(String, String), Save>>,
    emails: RwLock<HashMap<String, String>>,
    notifications: RwLock<Vec<Notification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_deal(&self, deal: Deal) {
        let mut deals = self.deals.write().expect("deals lock poisoned");
        deals.insert(deal.id.clone(), deal);
    }

    pub fn upsert_save(&self, save: Save) {
        let mut saves = self.saves.write().expect("saves lock poisoned");
        saves.insert((save.user_id.clone(), save.deal_id.clone()), save);
    }

    pub fn remove_save(&self, user_id: &str, deal_id: &str) {
        let mut saves = self.saves.write().expect("saves lock poisoned");
        saves.remove(&(user_id.to_string(), deal_id.to_string()));
    }

    pub fn put_email(&self, user_id: &str, email: &str) {
        let mut emails = self.emails.write().expect("emails lock poisoned");
        emails.insert(user_id.to_string(), email.to_string());
    }

    pub fn save(&self, user_id: &str, deal_id: &str) -> Option<Save> {
        let saves = self.saves.read().expect("saves lock poisoned");
        saves.get(&(user_id.to_string(), deal_id.to_string())).cloned()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        let n = self.notifications.read().expect("notifications lock poisoned");
        n.clone()
    }
}

#[async_trait]
impl SaveStore for MemoryStore {
    async fn load_due_saves(&self) -> Result<Vec<SavedDeal>> {
        let deals = self.deals.read().expect("deals lock poisoned");
        let saves = self.saves.read().expect("saves lock poisoned");

        let mut out = Vec::new();
        for save in saves.values() {
            let Some(deal) = deals.get(&save.deal_id) else {
                continue;
            };
            if deal.end_at.is_none() {
                continue;
            }
            out.push(SavedDeal {
                save: save.clone(),
                deal: deal.clone(),
            });
        }
        Ok(out)
    }

    async fn mark_sent(&self, user_id: &str, deal_id: &str, key: WindowKey) -> Result<()> {
        let mut saves = self.saves.write().expect("saves lock poisoned");
        let save = saves
            .get_mut(&(user_id.to_string(), deal_id.to_string()))
            .ok_or_else(|| anyhow!("no save for user={user_id} deal={deal_id}"))?;
        // single-key merge under the write lock; other keys untouched
        save.sent_reminders.set(key);
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(&self, notification: Notification) -> Result<()> {
        let mut n = self.notifications.write().expect("notifications lock poisoned");
        n.push(notification);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn email_for(&self, user_id: &str) -> Result<Option<String>> {
        let emails = self.emails.read().expect("emails lock poisoned");
        Ok(emails.get(user_id).cloned())
    }
}
