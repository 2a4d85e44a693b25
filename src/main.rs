//! Reminder Dispatcher Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the dispatcher, storage, email
//! channel, and the Prometheus exporter.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deal_reminder_dispatcher::api::{self, AppState};
use deal_reminder_dispatcher::config::AppConfig;
use deal_reminder_dispatcher::dispatcher::ReminderDispatcher;
use deal_reminder_dispatcher::metrics::Metrics;
use deal_reminder_dispatcher::notify::{email::SmtpEmailSender, EmailChannel, NoopEmailSender};
use deal_reminder_dispatcher::store::memory::MemoryStore;
use deal_reminder_dispatcher::windows::ReminderWindows;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("deal_reminder_dispatcher=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env()?;

    // Windows are fixed; the buffer/cadence coupling is checked up front so
    // a cadence change cannot silently skip or double-fire windows.
    let windows = ReminderWindows::for_cadence(config.cron_cadence);
    windows.validate(config.cron_cadence)?;

    let email: Arc<dyn EmailChannel> = if config.smtp_configured {
        Arc::new(SmtpEmailSender::from_env()?)
    } else {
        info!("SMTP not configured, email channel disabled");
        Arc::new(NoopEmailSender)
    };

    // Single-process backend; swap for a database-backed store via the
    // traits in `store` when wiring a real deployment.
    let store = Arc::new(MemoryStore::new());

    let dispatcher = Arc::new(ReminderDispatcher::new(
        store.clone(),
        store.clone(),
        store,
        email,
        windows,
        config.app_base_url.clone(),
    ));

    let metrics = Metrics::init(config.cron_cadence.num_minutes() as u64);

    let state = AppState {
        dispatcher,
        cron_secret: config.cron_secret.clone(),
    };
    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "reminder dispatcher listening");
    axum::serve(listener, app).await.context("serve")?;

    Ok(())
}
