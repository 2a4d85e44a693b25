//! # Reminder Dispatcher
//! The cron-driven loop: load saves joined with their deals, ask the
//! evaluator which lead-times are due, deliver through both channels, then
//! record sent-state. One (save, key) unit failing never aborts the batch.
//!
//! Delivery contract per unit: email is best-effort, the in-app record must
//! succeed for the unit to count, and `mark_sent` runs after delivery. A
//! failed `mark_sent` is logged and accepted: the key may fire once more on
//! a later run (at-least-once for that one recipient), which beats losing
//! the notification or stalling the batch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::evaluator::due_windows;
use crate::model::{DealStatus, Notification, SavedDeal};
use crate::notify::{EmailChannel, ReminderEmail};
use crate::store::{NotificationStore, SaveStore, UserDirectory};
use crate::windows::{ReminderWindows, WindowKey};

/// Result of one cron invocation: how many (save, key) units were dispatched
/// (in-app record persisted) and when the run finished.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchSummary {
    pub sent: u64,
    pub timestamp: DateTime<Utc>,
}

pub struct ReminderDispatcher {
    saves: Arc<dyn SaveStore>,
    notifications: Arc<dyn NotificationStore>,
    users: Arc<dyn UserDirectory>,
    email: Arc<dyn EmailChannel>,
    windows: ReminderWindows,
    app_base_url: String,
}

impl ReminderDispatcher {
    pub fn new(
        saves: Arc<dyn SaveStore>,
        notifications: Arc<dyn NotificationStore>,
        users: Arc<dyn UserDirectory>,
        email: Arc<dyn EmailChannel>,
        windows: ReminderWindows,
        app_base_url: impl Into<String>,
    ) -> Self {
        Self {
            saves,
            notifications,
            users,
            email,
            windows,
            app_base_url: app_base_url.into(),
        }
    }

    /// One full pass over all eligible saves. Never fails: storage errors
    /// are logged and reflected in a lower `sent` count.
    pub async fn run_once(&self, now: DateTime<Utc>) -> DispatchSummary {
        counter!("reminder_dispatch_runs_total").increment(1);

        let saved = match self.saves.load_due_saves().await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = ?e, "failed to load saves, skipping run");
                return self.summary(0);
            }
        };

        let mut sent: u64 = 0;
        for item in &saved {
            // eligibility gate: only approved, unexpired deals
            if item.deal.status != DealStatus::Approved {
                continue;
            }
            let Some(end_at) = item.deal.end_at else {
                continue;
            };

            let due = due_windows(
                now,
                end_at,
                &self.windows,
                &item.save.reminder_settings,
                &item.save.sent_reminders,
            );
            for key in due {
                if self.dispatch_one(item, key, now).await {
                    sent += 1;
                }
            }
        }

        gauge!("reminder_last_run_ts").set(now.timestamp() as f64);
        info!(sent, saves = saved.len(), "reminder dispatch finished");
        self.summary(sent)
    }

    /// One (save, key) unit: email (best-effort), in-app record
    /// (must-succeed), then sent-state. Returns whether the unit counts.
    async fn dispatch_one(&self, item: &SavedDeal, key: WindowKey, now: DateTime<Utc>) -> bool {
        let save = &item.save;
        let deal = &item.deal;

        match self.users.email_for(&save.user_id).await {
            Ok(Some(to)) => {
                let email = ReminderEmail {
                    to,
                    deal_title: deal.title.clone(),
                    deal_id: deal.id.clone(),
                    time_left: key.label().to_string(),
                    deal_url: format!("{}/deal/{}", self.app_base_url, deal.id),
                };
                if let Err(e) = self.email.send_reminder(&email).await {
                    counter!("reminder_email_failures_total").increment(1);
                    warn!(
                        user = %save.user_id,
                        deal = %deal.id,
                        window = %key,
                        error = ?e,
                        "reminder email failed, in-app channel continues"
                    );
                }
            }
            Ok(None) => {
                info!(user = %save.user_id, "no email address, skipping email channel");
            }
            Err(e) => {
                warn!(user = %save.user_id, error = ?e, "email lookup failed, skipping email channel");
            }
        }

        let notification =
            Notification::reminder(&save.user_id, &deal.title, &deal.id, key.label(), now);
        if let Err(e) = self.notifications.insert(notification).await {
            error!(
                user = %save.user_id,
                deal = %deal.id,
                window = %key,
                error = ?e,
                "in-app notification insert failed"
            );
            return false;
        }
        counter!("reminder_notifications_sent_total").increment(1);

        if let Err(e) = self.saves.mark_sent(&save.user_id, &save.deal_id, key).await {
            counter!("reminder_mark_sent_failures_total").increment(1);
            // accepted degradation: this key may fire once more next run
            error!(
                user = %save.user_id,
                deal = %deal.id,
                window = %key,
                error = ?e,
                "sent-state write failed, duplicate possible on next run"
            );
        }
        true
    }

    fn summary(&self, sent: u64) -> DispatchSummary {
        DispatchSummary {
            sent,
            timestamp: Utc::now(),
        }
    }
}
