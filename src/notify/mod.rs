//! Outbound reminder channels. Email is best-effort enrichment; the in-app
//! record (see `store::NotificationStore`) is the channel that must succeed
//! for a dispatch to count.

pub mod email;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Everything the email channel needs for one reminder.
#[derive(Debug, Clone)]
pub struct ReminderEmail {
    pub to: String,
    pub deal_title: String,
    pub deal_id: String,
    /// Human lead-time label, e.g. "1 hour".
    pub time_left: String,
    pub deal_url: String,
}

#[async_trait]
pub trait EmailChannel: Send + Sync {
    async fn send_reminder(&self, email: &ReminderEmail) -> Result<()>;
}

/// Stand-in when SMTP is not configured: logs the reminder and drops it.
pub struct NoopEmailSender;

#[async_trait]
impl EmailChannel for NoopEmailSender {
    async fn send_reminder(&self, email: &ReminderEmail) -> Result<()> {
        info!(
            to = %email.to,
            deal = %email.deal_id,
            time_left = %email.time_left,
            "email channel disabled, dropping reminder email"
        );
        Ok(())
    }
}
