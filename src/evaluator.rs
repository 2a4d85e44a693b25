//! # Time Window Evaluator
//! Pure, testable logic that maps `(now, end_at, settings, sent-state)` to
//! the set of lead-time keys due on this invocation. No I/O, suitable for
//! unit tests independent of any storage or mail mocking.
//!
//! A key fires iff the time remaining has crossed under its lead-time but
//! not by more than the buffer: `lead - buffer < remaining <= lead`. The
//! lower bound is what makes periodic invocation idempotent without a lock:
//! each key's firing interval is one buffer wide, so it is observed by at
//! least one tick (buffer > cadence) and, combined with the sent-state
//! check, claimed by at most one.

use chrono::{DateTime, Utc};

use crate::model::ReminderFlags;
use crate::windows::{ReminderWindows, WindowKey};

/// Returns the keys that should fire right now, in configured window order.
/// An expired deal (`end_at <= now`) yields nothing regardless of flags.
pub fn due_windows(
    now: DateTime<Utc>,
    end_at: DateTime<Utc>,
    windows: &ReminderWindows,
    settings: &ReminderFlags,
    sent: &ReminderFlags,
) -> Vec<WindowKey> {
    if end_at <= now {
        return Vec::new();
    }

    let remaining = end_at - now;
    let buffer = windows.buffer();

    windows
        .iter()
        .filter(|(key, lead)| {
            settings.is_set(*key)
                && !sent.is_set(*key)
                && remaining <= *lead
                && remaining > *lead - buffer
        })
        .map(|(key, _)| *key)
        .collect()
}
