//! Domain records the dispatcher reads and writes. `Deal` is owned by the
//! submission/moderation side and is read-only here; `Save` carries the
//! per-lead-time enable flags and sent-state this job maintains.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::windows::WindowKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub title: String,
    pub end_at: Option<DateTime<Utc>>,
    pub status: DealStatus,
}

/// Per-lead-time boolean flags, keyed by `WindowKey`. Backs both
/// `reminder_settings` (user opt-in) and `sent_reminders` (dispatch state).
/// An absent key reads as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderFlags(BTreeMap<WindowKey, bool>);

impl ReminderFlags {
    pub fn none() -> Self {
        Self::default()
    }

    /// The product default when a user saves a deal: every window enabled.
    pub fn all_enabled() -> Self {
        Self(WindowKey::ALL.iter().map(|k| (*k, true)).collect())
    }

    pub fn with(mut self, key: WindowKey, on: bool) -> Self {
        self.0.insert(key, on);
        self
    }

    pub fn is_set(&self, key: WindowKey) -> bool {
        self.0.get(&key).copied().unwrap_or(false)
    }

    /// Sets the key to true. Never unsets: sent-state is terminal per key.
    pub fn set(&mut self, key: WindowKey) {
        self.0.insert(key, true);
    }
}

/// A user's record of interest in a deal. Composite identity
/// (`user_id`, `deal_id`); created and deleted by the save/un-save feature,
/// `sent_reminders` mutated only by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Save {
    pub user_id: String,
    pub deal_id: String,
    pub reminder_settings: ReminderFlags,
    pub sent_reminders: ReminderFlags,
}

impl Save {
    pub fn new(user_id: impl Into<String>, deal_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            deal_id: deal_id.into(),
            reminder_settings: ReminderFlags::all_enabled(),
            sent_reminders: ReminderFlags::none(),
        }
    }
}

/// A save joined with its deal, as loaded by the dispatcher at the storage
/// boundary.
#[derive(Debug, Clone)]
pub struct SavedDeal {
    pub save: Save,
    pub deal: Deal,
}

/// An in-app notification record produced by a successful dispatch. Read by
/// the notification-inbox feature; never mutated here after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn reminder(
        user_id: &str,
        deal_title: &str,
        deal_id: &str,
        time_left: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            kind: "reminder".to_string(),
            title: format!("\"{deal_title}\" ends in {time_left}!"),
            message: "Don't miss this deal — act now before it expires.".to_string(),
            payload: serde_json::json!({ "deal_id": deal_id }),
            created_at: now,
        }
    }
}
