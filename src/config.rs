//! Environment configuration. Everything comes from env vars (`.env` in
//! local dev via dotenvy); SMTP settings are optional and their absence
//! selects the noop email channel.

use anyhow::{Context, Result};
use chrono::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Shared secret the external scheduler must present as a bearer token.
    pub cron_secret: String,
    /// Public base URL used to build deal links in emails, no trailing slash.
    pub app_base_url: String,
    pub bind_addr: String,
    /// How often the external scheduler hits the cron endpoint. The reminder
    /// buffer must exceed this or windows can be missed.
    pub cron_cadence: Duration,
    pub smtp_configured: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let cron_secret = std::env::var("CRON_SECRET").context("CRON_SECRET missing")?;
        let app_base_url = std::env::var("APP_BASE_URL")
            .context("APP_BASE_URL missing")?
            .trim_end_matches('/')
            .to_string();
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let cadence_minutes: i64 = match std::env::var("CRON_CADENCE_MINUTES") {
            Ok(v) => v.parse().context("CRON_CADENCE_MINUTES not a number")?,
            Err(_) => 15,
        };

        let smtp_configured = std::env::var("SMTP_HOST").is_ok();

        Ok(Self {
            cron_secret,
            app_base_url,
            bind_addr,
            cron_cadence: Duration::minutes(cadence_minutes),
            smtp_configured,
        })
    }
}
