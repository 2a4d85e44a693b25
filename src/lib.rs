// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod evaluator;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod store;
pub mod windows;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::dispatcher::{DispatchSummary, ReminderDispatcher};
pub use crate::evaluator::due_windows;
pub use crate::model::{Deal, DealStatus, Notification, ReminderFlags, Save, SavedDeal};
pub use crate::windows::{ReminderWindows, WindowKey};
