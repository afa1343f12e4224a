//! Menu option lists and site settings.
//!
//! Option lists are `parameters` rows keyed `cold_N`, `bread_N`, `drink_N`.
//! They and the lunch types change rarely, so reads are served from an
//! in-memory cache for an hour. Every parameter write through this service
//! empties the cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, instrument};

use lunch_order_core::{Email, EmailError, Price};

use crate::db::{LunchTypeRepository, ParameterRepository, RepositoryError};
use crate::models::parameter::keys;
use crate::models::{LunchType, Parameter};

/// How long option lists stay cached.
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Price charged for a guest lunch when `guest_price` is unset or unreadable.
pub const DEFAULT_GUEST_PRICE_CENTS: i64 = 1000;

/// Cache key for option lists.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum OptionKey {
    Cold,
    Bread,
    Drink,
    LunchTypes,
}

impl OptionKey {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Cold => keys::COLD_PREFIX,
            Self::Bread => keys::BREAD_PREFIX,
            Self::Drink => keys::DRINK_PREFIX,
            Self::LunchTypes => "",
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum OptionValue {
    List(Arc<Vec<String>>),
    LunchTypes(Arc<Vec<LunchType>>),
}

/// Notification addresses used by the daily digest.
///
/// Both are empty strings when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSettings {
    pub sender: String,
    pub recipient: String,
}

/// Errors saving the email settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid sender email: {0}")]
    InvalidSender(EmailError),

    #[error("Invalid recipient list: {0}")]
    InvalidRecipient(EmailError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cached access to option lists plus parameter writes.
#[derive(Clone)]
pub struct OptionsService {
    pool: PgPool,
    cache: Cache<OptionKey, OptionValue>,
}

impl OptionsService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(CACHE_TTL)
            .build();
        Self { pool, cache }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cold_options(&self) -> Result<Vec<String>, RepositoryError> {
        self.list(OptionKey::Cold).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn bread_options(&self) -> Result<Vec<String>, RepositoryError> {
        self.list(OptionKey::Bread).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn drink_options(&self) -> Result<Vec<String>, RepositoryError> {
        self.list(OptionKey::Drink).await
    }

    /// All lunch types in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lunch_types(&self) -> Result<Vec<LunchType>, RepositoryError> {
        if let Some(OptionValue::LunchTypes(types)) = self.cache.get(&OptionKey::LunchTypes).await {
            debug!("Cache hit for lunch types");
            return Ok(types.as_ref().clone());
        }

        let types = LunchTypeRepository::new(&self.pool).list_all().await?;
        self.cache
            .insert(
                OptionKey::LunchTypes,
                OptionValue::LunchTypes(Arc::new(types.clone())),
            )
            .await;
        Ok(types)
    }

    async fn list(&self, key: OptionKey) -> Result<Vec<String>, RepositoryError> {
        if let Some(OptionValue::List(values)) = self.cache.get(&key).await {
            debug!(?key, "Cache hit for option list");
            return Ok(values.as_ref().clone());
        }

        let values = ParameterRepository::new(&self.pool)
            .list_prefixed(key.prefix())
            .await?;
        self.cache
            .insert(key, OptionValue::List(Arc::new(values.clone())))
            .await;
        Ok(values)
    }

    /// Every parameter, by key. Not cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn parameters(&self) -> Result<Vec<Parameter>, RepositoryError> {
        ParameterRepository::new(&self.pool).list_all().await
    }

    /// Insert or replace one parameter and drop cached lists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    #[instrument(skip(self, value))]
    pub async fn set_parameter(&self, key: &str, value: &str) -> Result<Parameter, RepositoryError> {
        let parameter = ParameterRepository::new(&self.pool).upsert(key, value).await?;
        self.invalidate().await;
        tracing::info!(key, "Parameter saved");
        Ok(parameter)
    }

    /// Price of a guest lunch from the `guest_price` parameter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn guest_price(&self) -> Result<Price, RepositoryError> {
        let raw = ParameterRepository::new(&self.pool)
            .get(keys::GUEST_PRICE)
            .await?;
        Ok(parse_guest_price(raw.as_deref()))
    }

    /// Current sender and recipient addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_settings(&self) -> Result<EmailSettings, RepositoryError> {
        let params = ParameterRepository::new(&self.pool);
        Ok(EmailSettings {
            sender: params.get(keys::EMAIL_SENDER).await?.unwrap_or_default(),
            recipient: params.get(keys::EMAIL_RECIPIENT).await?.unwrap_or_default(),
        })
    }

    /// Validate and store the sender and recipient addresses.
    ///
    /// The recipient may be a `;`-separated list. Values are stored
    /// normalized (lowercased, `; `-joined).
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidSender` or `SettingsError::InvalidRecipient`
    /// if an address doesn't parse.
    #[instrument(skip(self))]
    pub async fn save_email_settings(
        &self,
        sender: &str,
        recipient: &str,
    ) -> Result<EmailSettings, SettingsError> {
        let settings = normalize_email_settings(sender, recipient)?;

        let params = ParameterRepository::new(&self.pool);
        params.upsert(keys::EMAIL_SENDER, &settings.sender).await?;
        params
            .upsert(keys::EMAIL_RECIPIENT, &settings.recipient)
            .await?;
        self.invalidate().await;

        tracing::info!("Email settings saved");
        Ok(settings)
    }

    /// Drop every cached list.
    pub async fn invalidate(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

fn parse_guest_price(raw: Option<&str>) -> Price {
    match raw.map(str::parse::<Price>) {
        Some(Ok(price)) => price,
        Some(Err(_)) => {
            tracing::warn!(value = ?raw, "Unreadable guest_price parameter, using default");
            Price::from_cents(DEFAULT_GUEST_PRICE_CENTS)
        }
        None => Price::from_cents(DEFAULT_GUEST_PRICE_CENTS),
    }
}

fn normalize_email_settings(sender: &str, recipient: &str) -> Result<EmailSettings, SettingsError> {
    let sender = Email::parse(sender).map_err(SettingsError::InvalidSender)?;
    let recipients = Email::parse_list(recipient).map_err(SettingsError::InvalidRecipient)?;

    Ok(EmailSettings {
        sender: sender.into_inner(),
        recipient: recipients
            .iter()
            .map(Email::as_str)
            .collect::<Vec<_>>()
            .join("; "),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_price_defaults() {
        assert_eq!(parse_guest_price(None), Price::from_cents(1000));
        assert_eq!(parse_guest_price(Some("twelve")), Price::from_cents(1000));
        assert_eq!(parse_guest_price(Some("12.50")), Price::from_cents(1250));
    }

    #[test]
    fn test_normalize_email_settings() {
        let settings =
            normalize_email_settings(" Lunch@Example.com ", "a@example.com;B@example.com; ")
                .unwrap();
        assert_eq!(settings.sender, "lunch@example.com");
        assert_eq!(settings.recipient, "a@example.com; b@example.com");
    }

    #[test]
    fn test_normalize_email_settings_rejects_bad_addresses() {
        assert!(matches!(
            normalize_email_settings("not-an-email", "a@example.com"),
            Err(SettingsError::InvalidSender(_))
        ));
        assert!(matches!(
            normalize_email_settings("lunch@example.com", ""),
            Err(SettingsError::InvalidRecipient(_))
        ));
        assert!(matches!(
            normalize_email_settings("lunch@example.com", "a@example.com; nope"),
            Err(SettingsError::InvalidRecipient(_))
        ));
    }
}
