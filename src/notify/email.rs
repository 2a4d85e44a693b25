use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{EmailChannel, ReminderEmail};

/// SMTP sender for reminder emails. One fixed `from` mailbox; the recipient
/// comes per-reminder from the user directory.
pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    /// Reads SMTP_HOST / SMTP_USER / SMTP_PASS / NOTIFY_EMAIL_FROM. Callers
    /// fall back to the noop sender when any of these is absent.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SMTP_HOST").context("SMTP_HOST missing")?;
        let user = std::env::var("SMTP_USER").context("SMTP_USER missing")?;
        let pass = std::env::var("SMTP_PASS").context("SMTP_PASS missing")?;
        let from_addr =
            std::env::var("NOTIFY_EMAIL_FROM").context("NOTIFY_EMAIL_FROM missing")?;

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();

        let from = from_addr.parse().context("invalid NOTIFY_EMAIL_FROM")?;
        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl EmailChannel for SmtpEmailSender {
    async fn send_reminder(&self, ev: &ReminderEmail) -> Result<()> {
        let subject = format!("\"{}\" ends in {}!", ev.deal_title, ev.time_left);
        let to: Mailbox = ev.to.parse().context("invalid recipient address")?;

        let msg = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_HTML)
            .body(render_body(ev))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}

/// Minimal transactional layout: urgency line, deal title, CTA link, footer.
fn render_body(ev: &ReminderEmail) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head>",
            "<body style=\"font-family: sans-serif; max-width: 480px; margin: 0 auto; padding: 20px;\">",
            "<p style=\"color: #ef4444; font-weight: 600;\">Ends in {time_left}!</p>",
            "<h2 style=\"margin: 0 0 16px;\">{title}</h2>",
            "<a href=\"{url}\" style=\"display: inline-block; background: #6366f1; color: white; ",
            "text-decoration: none; padding: 12px 24px; border-radius: 8px;\">View deal</a>",
            "<p style=\"color: #71717a; font-size: 12px;\">",
            "You received this because you saved this deal.</p>",
            "</body></html>"
        ),
        time_left = ev.time_left,
        title = ev.deal_title,
        url = ev.deal_url,
    )
}
