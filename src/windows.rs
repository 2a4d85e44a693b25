//! Reminder window configuration: the fixed set of lead-times before a
//! deal's `end_at` at which a reminder may fire, plus the tolerance buffer
//! that bounds each firing interval to one scheduler tick.

use anyhow::{anyhow, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// One of the supported lead-times. The string form (`"3d"`, `"1d"`, `"6h"`,
/// `"1h"`) is the key space shared with per-save settings and sent-state maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WindowKey {
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "1h")]
    OneHour,
}

impl WindowKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKey::ThreeDays => "3d",
            WindowKey::OneDay => "1d",
            WindowKey::SixHours => "6h",
            WindowKey::OneHour => "1h",
        }
    }

    /// Human-readable lead-time, used in notification titles and email copy.
    pub fn label(&self) -> &'static str {
        match self {
            WindowKey::ThreeDays => "3 days",
            WindowKey::OneDay => "1 day",
            WindowKey::SixHours => "6 hours",
            WindowKey::OneHour => "1 hour",
        }
    }

    pub fn lead_time(&self) -> Duration {
        match self {
            WindowKey::ThreeDays => Duration::days(3),
            WindowKey::OneDay => Duration::days(1),
            WindowKey::SixHours => Duration::hours(6),
            WindowKey::OneHour => Duration::hours(1),
        }
    }

    pub const ALL: [WindowKey; 4] = [
        WindowKey::ThreeDays,
        WindowKey::OneDay,
        WindowKey::SixHours,
        WindowKey::OneHour,
    ];
}

impl std::fmt::Display for WindowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered window list plus the firing-interval buffer.
///
/// Invariant: `buffer` must exceed the scheduler cadence, otherwise a firing
/// interval can fall entirely between two ticks and the reminder is never
/// sent. `validate` makes that coupling explicit instead of baking in a
/// constant tied to an assumed cadence.
#[derive(Debug, Clone)]
pub struct ReminderWindows {
    windows: Vec<(WindowKey, Duration)>,
    buffer: Duration,
}

impl ReminderWindows {
    /// The production set: 3d / 1d / 6h / 1h with a 16-minute buffer for a
    /// 15-minute cron cadence.
    pub fn standard() -> Self {
        Self::for_cadence(Duration::minutes(15))
    }

    /// Derive the buffer from the scheduler cadence (cadence + 1 minute).
    pub fn for_cadence(cadence: Duration) -> Self {
        Self {
            windows: WindowKey::ALL
                .iter()
                .map(|k| (*k, k.lead_time()))
                .collect(),
            buffer: cadence + Duration::minutes(1),
        }
    }

    /// Reject configurations where the firing interval can slip between two
    /// scheduler ticks (buffer <= cadence means a window can be missed).
    pub fn validate(&self, cadence: Duration) -> Result<()> {
        if self.buffer <= cadence {
            return Err(anyhow!(
                "reminder buffer ({}m) must exceed scheduler cadence ({}m)",
                self.buffer.num_minutes(),
                cadence.num_minutes()
            ));
        }
        Ok(())
    }

    pub fn buffer(&self) -> Duration {
        self.buffer
    }

    pub fn iter(&self) -> impl Iterator<Item = &(WindowKey, Duration)> {
        self.windows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_strings_round_trip_through_serde() {
        for k in WindowKey::ALL {
            let s = serde_json::to_string(&k).unwrap();
            assert_eq!(s, format!("\"{}\"", k.as_str()));
            let back: WindowKey = serde_json::from_str(&s).unwrap();
            assert_eq!(back, k);
        }
    }

    #[test]
    fn standard_set_is_ordered_longest_first() {
        let w = ReminderWindows::standard();
        let keys: Vec<_> = w.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                WindowKey::ThreeDays,
                WindowKey::OneDay,
                WindowKey::SixHours,
                WindowKey::OneHour
            ]
        );
        assert_eq!(w.buffer(), Duration::minutes(16));
    }

    #[test]
    fn buffer_must_exceed_cadence() {
        let w = ReminderWindows::standard();
        assert!(w.validate(Duration::minutes(15)).is_ok());
        assert!(w.validate(Duration::minutes(16)).is_err());
        assert!(w.validate(Duration::minutes(30)).is_err());
    }
}
