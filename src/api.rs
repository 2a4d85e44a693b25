//! HTTP surface: health probe and the cron-triggered reminder run. The cron
//! endpoint is gated by a pre-shared bearer secret; everything else about
//! scheduling (cadence, wall-clock caps) lives in the external scheduler.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tower_http::cors::CorsLayer;

use crate::dispatcher::{DispatchSummary, ReminderDispatcher};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ReminderDispatcher>,
    pub cron_secret: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/cron/reminders", get(run_reminders))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Entry point for the external scheduler. Fails closed: a missing or
/// mismatched secret returns 401 before any row is read.
async fn run_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DispatchSummary>, StatusCode> {
    let expected = format!("Bearer {}", state.cron_secret);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let summary = state.dispatcher.run_once(Utc::now()).await;
    Ok(Json(summary))
}
