//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LUNCH_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `LUNCH_HOST` - Bind address (default: 127.0.0.1)
//! - `LUNCH_PORT` - Listen port (default: 3000)
//! - `LUNCH_BASE_URL` - Public URL (default: `http://localhost:3000`); `https://` enables secure cookies
//! - `LUNCH_TZ` - Canteen time zone, an IANA name such as `Europe/Amsterdam`
//!   (default: the server's local zone)
//! - `LUNCH_ORDER_CUTOFF` - Same-day ordering deadline, `HH:MM` (default: 10:00)
//! - `LUNCH_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate, 0.0 to 1.0 (default: 0.0)
//!
//! ## SMTP (needed by the daily digest)
//! - `SMTP_HOST`, `SMTP_PORT` (default: 587), `SMTP_USERNAME`, `SMTP_PASSWORD`

use std::net::{IpAddr, SocketAddr};

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use secrecy::SecretString;
use thiserror::Error;

use lunch_order_core::policy::DEFAULT_CUTOFF;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Zone the cutoff and "today" are evaluated in
    pub timezone: CanteenZone,
    /// Same-day ordering deadline
    pub order_cutoff: NaiveTime,
    /// Whether logs are emitted as JSON
    pub log_json: bool,
    /// SMTP settings, if configured
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// SMTP configuration for the daily digest.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .finish()
    }
}

/// Where the canteen's wall clock lives.
///
/// Daylight saving follows the zone's rules, so the cutoff stays at the same
/// wall-clock hour all year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanteenZone {
    /// The server's local zone (honors `TZ`).
    Local,
    /// An IANA zone such as `Europe/Amsterdam`.
    Named(Tz),
}

impl CanteenZone {
    /// Parse an IANA zone name, or `local`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Some(Self::Local);
        }
        trimmed.parse::<Tz>().ok().map(Self::Named)
    }

    /// Wall-clock time in this zone at `instant`.
    #[must_use]
    pub fn wall_clock(self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Local => instant.with_timezone(&Local).naive_local(),
            Self::Named(tz) => instant.with_timezone(&tz).naive_local(),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("LUNCH_DATABASE_URL")?;
        let host = parse_env("LUNCH_HOST", "127.0.0.1", |v| v.parse::<IpAddr>())?;
        let port = parse_env("LUNCH_PORT", "3000", |v| v.parse::<u16>())?;
        let base_url = get_env_or_default("LUNCH_BASE_URL", "http://localhost:3000");

        let timezone = match get_optional_env("LUNCH_TZ") {
            Some(raw) => CanteenZone::parse(&raw).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "LUNCH_TZ".to_string(),
                    format!("unknown time zone {raw:?}"),
                )
            })?,
            None => CanteenZone::Local,
        };

        let order_cutoff = match get_optional_env("LUNCH_ORDER_CUTOFF") {
            Some(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| {
                ConfigError::InvalidEnvVar("LUNCH_ORDER_CUTOFF".to_string(), e.to_string())
            })?,
            None => DEFAULT_CUTOFF,
        };

        let email = EmailConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            timezone,
            order_cutoff,
            log_json: get_optional_env("LUNCH_LOG_JSON").is_some(),
            email,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0", |v| v.parse::<f32>())?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0", |v| {
                v.parse::<f32>()
            })?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl EmailConfig {
    /// SMTP settings are optional as a group: absent `SMTP_HOST` means no
    /// email, but a host without credentials is an error.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            smtp_host,
            smtp_port: parse_env("SMTP_PORT", "587", |v| v.parse::<u16>())?,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: SecretString::from(get_required_env("SMTP_PASSWORD")?),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) with `parse`.
fn parse_env<T, E: std::fmt::Display>(
    key: &str,
    default: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<T, ConfigError> {
    let raw = get_env_or_default(key, default);
    parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, TimeZone};

    use lunch_order_core::OrderingPolicy;

    fn amsterdam() -> CanteenZone {
        CanteenZone::parse("Europe/Amsterdam").unwrap()
    }

    #[test]
    fn test_canteen_zone_parse() {
        assert_eq!(CanteenZone::parse("local"), Some(CanteenZone::Local));
        assert_eq!(
            CanteenZone::parse(" Europe/Amsterdam "),
            Some(CanteenZone::Named(chrono_tz::Europe::Amsterdam))
        );
        assert!(CanteenZone::parse("+01:00").is_none());
        assert!(CanteenZone::parse("Mars/Olympus").is_none());
    }

    #[test]
    fn test_cutoff_follows_summer_time() {
        let policy = OrderingPolicy::default();

        // 08:30 UTC is 10:30 in Amsterdam during summer time.
        let summer = amsterdam().wall_clock(Utc.with_ymd_and_hms(2025, 6, 11, 8, 30, 0).unwrap());
        assert_eq!(
            summer,
            NaiveDate::from_ymd_opt(2025, 6, 11).unwrap().and_hms_opt(10, 30, 0).unwrap()
        );
        assert!(!policy.is_open_today(summer));

        // The same UTC time is 09:30 in winter.
        let winter = amsterdam().wall_clock(Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap());
        assert_eq!(winter.time(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(policy.is_open_today(winter));
    }

    #[test]
    fn test_wall_clock_across_dst_switch() {
        // Clocks jump from 02:00 to 03:00 on 2025-03-30.
        let before = amsterdam().wall_clock(Utc.with_ymd_and_hms(2025, 3, 29, 8, 0, 0).unwrap());
        let after = amsterdam().wall_clock(Utc.with_ymd_and_hms(2025, 3, 31, 8, 0, 0).unwrap());
        assert_eq!(before.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(after.time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "lunch@example.com".to_string(),
            smtp_password: SecretString::from("hunter2hunter2"),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
