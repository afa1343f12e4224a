//! Email the day's orders to the kitchen.
//!
//! # Usage
//!
//! ```bash
//! # Today's orders, as the cron job sends them
//! lunch-cli digest
//!
//! # Preview another day without sending
//! lunch-cli digest --date 2025-06-04 --dry-run
//! ```
//!
//! Sender and recipients come from the `email_sender` and `email_recipient`
//! parameters (editable at `/admin/settings`); SMTP settings come from the
//! environment.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use thiserror::Error;

use lunch_order_core::{Email, EmailError};
use lunch_order_web::config::WebConfig;
use lunch_order_web::db::RepositoryError;
use lunch_order_web::services::digest::SmtpError;
use lunch_order_web::services::{DigestError, DigestService, OptionsService, load_digest};

/// Errors that can occur while sending the digest.
#[derive(Debug, Error)]
pub enum DigestCommandError {
    #[error("SMTP is not configured (set SMTP_HOST, SMTP_USERNAME and SMTP_PASSWORD)")]
    SmtpNotConfigured,

    #[error("Invalid email_sender parameter: {0}")]
    InvalidSender(EmailError),

    #[error("Invalid email_recipient parameter: {0}")]
    InvalidRecipient(EmailError),

    #[error(transparent)]
    Digest(#[from] DigestError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("SMTP setup failed: {0}")]
    Smtp(#[from] SmtpError),
}

/// Build and send (or print) the digest for `date`, default today.
///
/// # Errors
///
/// Returns an error if the addresses are invalid, SMTP is missing, or the
/// send fails. A day without orders is not an error.
pub async fn run(
    pool: &PgPool,
    config: &WebConfig,
    date: Option<NaiveDate>,
    dry_run: bool,
) -> Result<(), DigestCommandError> {
    let date = date.unwrap_or_else(|| config.timezone.wall_clock(Utc::now()).date());

    let Some(digest) = load_digest(pool, date).await? else {
        tracing::info!(%date, "No orders, nothing to send");
        return Ok(());
    };

    let settings = OptionsService::new(pool.clone()).email_settings().await?;
    let sender = Email::parse(&settings.sender).map_err(DigestCommandError::InvalidSender)?;
    let recipients =
        Email::parse_list(&settings.recipient).map_err(DigestCommandError::InvalidRecipient)?;

    if dry_run {
        print_digest(&sender, &recipients, &digest.subject, &digest.text);
        tracing::info!(%date, orders = digest.order_count, "Dry run, digest not sent");
        return Ok(());
    }

    let email = config
        .email
        .as_ref()
        .ok_or(DigestCommandError::SmtpNotConfigured)?;
    DigestService::new(email)?
        .send(&sender, &recipients, &digest)
        .await?;
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_digest(sender: &Email, recipients: &[Email], subject: &str, text: &str) {
    let to: Vec<&str> = recipients.iter().map(Email::as_str).collect();
    println!("From: {sender}");
    println!("To: {}", to.join(", "));
    println!("Subject: {subject}");
    println!();
    println!("{text}");
}
