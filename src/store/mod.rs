//! Storage seams for the dispatcher. The real deal/save/notification store
//! and the identity lookup live behind these traits so the loop logic stays
//! testable without a database.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{Notification, SavedDeal};
use crate::windows::WindowKey;

/// Reads saves joined with their deals and records per-key sent-state.
#[async_trait]
pub trait SaveStore: Send + Sync {
    /// All saves whose deal has a non-null `end_at`. Status and expiry
    /// filtering happen in the dispatcher; the store stays a dumb reader.
    async fn load_due_saves(&self) -> Result<Vec<SavedDeal>>;

    /// Sent-State Tracker: merge `key = true` into `sent_reminders` for one
    /// (user, deal) pair. Must be a targeted single-key update, never a
    /// whole-record overwrite, so concurrent marks of different keys on the
    /// same save cannot clobber each other.
    async fn mark_sent(&self, user_id: &str, deal_id: &str, key: WindowKey) -> Result<()>;
}

/// Persists in-app notification records for the inbox feature to read.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: Notification) -> Result<()>;
}

/// Resolves a user id to their email address. `Ok(None)` means the account
/// has no resolvable address (deleted, unverified) and the email channel is
/// skipped for them.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn email_for(&self, user_id: &str) -> Result<Option<String>>;
}
