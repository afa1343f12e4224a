//! The "today's orders" email.
//!
//! Run once a day from the CLI (`lunch-cli digest`), usually from cron. The
//! server never sends it on its own.

use askama::Template;
use chrono::NaiveDate;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use lunch_order_core::Email;

use crate::config::EmailConfig;
use crate::db::{GuestOrderRepository, OrderRepository, RepositoryError};
use crate::filters;
use crate::models::{GuestOrderDetails, OrderDetails};

pub use lettre::transport::smtp::Error as SmtpError;

/// Subject line of the digest.
pub const DIGEST_SUBJECT: &str = "Today's Lunch Orders";

#[derive(Template)]
#[template(path = "email/digest.txt")]
struct DigestText<'a> {
    lines: &'a [String],
}

#[derive(Template)]
#[template(path = "email/digest.html")]
struct DigestHtml<'a> {
    date: NaiveDate,
    lines: &'a [String],
}

/// Errors that can occur when building or sending the digest.
#[derive(Debug, Error)]
pub enum DigestError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A rendered digest, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub date: NaiveDate,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub order_count: usize,
}

/// One line per order: `username (email): summary`, guests prefixed with
/// `[GUEST]` and attributed to their host.
fn digest_lines(orders: &[OrderDetails], guests: &[GuestOrderDetails]) -> Vec<String> {
    orders
        .iter()
        .map(|o| format!("{} ({}): {}", o.user.username, o.user.email, o.summary()))
        .chain(guests.iter().map(|g| {
            format!(
                "[GUEST] {} ({}): {}",
                g.host_username,
                g.host_email,
                g.summary()
            )
        }))
        .collect()
}

/// Render the digest for `date`, or `None` if nobody ordered.
///
/// # Errors
///
/// Returns `DigestError::Template` if rendering fails.
pub fn compose_digest(
    date: NaiveDate,
    orders: &[OrderDetails],
    guests: &[GuestOrderDetails],
) -> Result<Option<Digest>, DigestError> {
    let lines = digest_lines(orders, guests);
    if lines.is_empty() {
        return Ok(None);
    }

    Ok(Some(Digest {
        date,
        subject: DIGEST_SUBJECT.to_owned(),
        text: DigestText { lines: &lines }.render()?,
        html: DigestHtml { date, lines: &lines }.render()?,
        order_count: lines.len(),
    }))
}

/// Load the day's orders and guest orders and render the digest.
///
/// # Errors
///
/// Returns `DigestError::Repository` if a query fails.
pub async fn load_digest(pool: &PgPool, date: NaiveDate) -> Result<Option<Digest>, DigestError> {
    let orders = OrderRepository::new(pool).list_range(date, date).await?;
    let guests = GuestOrderRepository::new(pool).list_on(date).await?;
    compose_digest(date, &orders, &guests)
}

/// SMTP sender for the digest.
#[derive(Clone)]
pub struct DigestService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl DigestService {
    /// Create the SMTP transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { mailer })
    }

    /// Send `digest` from `sender` to every address in `recipients`.
    ///
    /// # Errors
    ///
    /// Returns error if the message can't be built or the SMTP send fails.
    pub async fn send(
        &self,
        sender: &Email,
        recipients: &[Email],
        digest: &Digest,
    ) -> Result<(), DigestError> {
        let message = build_message(sender, recipients, digest)?;
        self.mailer.send(message).await?;

        tracing::info!(
            date = %digest.date,
            orders = digest.order_count,
            recipients = recipients.len(),
            "Digest sent"
        );
        Ok(())
    }
}

fn mailbox(email: &Email) -> Result<Mailbox, DigestError> {
    email
        .as_str()
        .parse()
        .map_err(|_| DigestError::InvalidAddress(email.to_string()))
}

fn build_message(
    sender: &Email,
    recipients: &[Email],
    digest: &Digest,
) -> Result<Message, DigestError> {
    let mut builder = Message::builder()
        .from(mailbox(sender)?)
        .subject(digest.subject.as_str());
    for recipient in recipients {
        builder = builder.to(mailbox(recipient)?);
    }

    let message = builder.multipart(
        MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(digest.text.clone()),
            )
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(digest.html.clone()),
            ),
    )?;
    Ok(message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};

    use lunch_order_core::{GuestOrderId, LunchTypeId, OrderId, Price, UserId};

    use super::*;
    use crate::models::{GuestOrder, LunchType, Order, OrderWithLunch, UserSummary};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 4).unwrap()
    }

    fn stamp() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(0, 0).unwrap()
    }

    fn cold_order() -> OrderDetails {
        OrderDetails {
            order: OrderWithLunch {
                order: Order {
                    id: OrderId::new(1),
                    user_id: UserId::new(1),
                    lunch_type_id: LunchTypeId::new(1),
                    date: today(),
                    customization: "no butter".to_owned(),
                    cold_type: Some("Salami".to_owned()),
                    bread_type: Some("Ciabatta".to_owned()),
                    drink_type: None,
                    created_at: stamp(),
                    updated_at: stamp(),
                },
                lunch_type: LunchType {
                    id: LunchTypeId::new(1),
                    name: "Cold".to_owned(),
                    price: Price::from_cents(430),
                },
            },
            user: UserSummary {
                id: UserId::new(1),
                username: "alice".to_owned(),
                email: Email::parse("alice@example.com").unwrap(),
            },
        }
    }

    fn guest_order() -> GuestOrderDetails {
        GuestOrderDetails {
            order: GuestOrder {
                id: GuestOrderId::new(1),
                host_user_id: UserId::new(2),
                lunch_type_id: LunchTypeId::new(2),
                date: today(),
                guest_name: "Visitor".to_owned(),
                customization: String::new(),
                cold_type: None,
                bread_type: None,
                drink_type: None,
                price: Price::from_cents(1000),
                created_at: stamp(),
            },
            lunch_name: "Salad".to_owned(),
            host_username: "bob".to_owned(),
            host_email: Email::parse("bob@example.com").unwrap(),
        }
    }

    #[test]
    fn test_no_orders_no_digest() {
        assert!(compose_digest(today(), &[], &[]).unwrap().is_none());
    }

    #[test]
    fn test_digest_lists_orders_and_guests() {
        let digest = compose_digest(today(), &[cold_order()], &[guest_order()])
            .unwrap()
            .unwrap();

        assert_eq!(digest.subject, "Today's Lunch Orders");
        assert_eq!(digest.order_count, 2);
        assert!(digest.text.starts_with("Today's Orders:\n\n"));
        assert!(digest.text.contains(
            "alice (alice@example.com): Cold - Salami | Bread: Ciabatta | Note: no butter\n"
        ));
        assert!(
            digest
                .text
                .contains("[GUEST] bob (bob@example.com): Visitor: Salad")
        );
        assert!(digest.html.contains("<li>alice (alice@example.com): Cold - Salami"));
    }

    #[test]
    fn test_message_has_every_recipient() {
        let digest = compose_digest(today(), &[cold_order()], &[])
            .unwrap()
            .unwrap();
        let sender = Email::parse("lunch@example.com").unwrap();
        let recipients = Email::parse_list("kitchen@example.com; office@example.com").unwrap();

        let message = build_message(&sender, &recipients, &digest).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("kitchen@example.com"));
        assert!(raw.contains("office@example.com"));
        assert!(raw.contains("Subject: Today's Lunch Orders"));
    }
}
