//! Integration tests for Lunch Order.
//!
//! The tests talk HTTP to a running server backed by a seeded database.
//!
//! # Running Tests
//!
//! ```bash
//! lunch-cli migrate
//! lunch-cli seed --reset
//! cargo run -p lunch-order-web &
//! cargo test -p lunch-order-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `LUNCH_TEST_BASE_URL` - Server URL (default: `http://localhost:3000`)
//! - `LUNCH_TEST_ADMIN_EMAIL` - Seeded admin (default: `test@example.com`)
//! - `LUNCH_TEST_ADMIN_PASSWORD` - Seeded admin password (default: `testpass1`)

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("LUNCH_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Credentials of the seeded admin.
#[must_use]
pub fn admin_credentials() -> (String, String) {
    (
        std::env::var("LUNCH_TEST_ADMIN_EMAIL").unwrap_or_else(|_| "test@example.com".to_string()),
        std::env::var("LUNCH_TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "testpass1".to_string()),
    )
}

/// A client without a session.
///
/// # Errors
///
/// Returns an error if the client can't be built.
pub fn anonymous_client() -> reqwest::Result<Client> {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Log in through the form and return a client holding the session cookie.
///
/// # Errors
///
/// Returns an error if the request fails or the login is rejected.
pub async fn login(email: &str, password: &str) -> Result<Client, Box<dyn std::error::Error>> {
    let client = anonymous_client()?;
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .form(&[("email", email), ("password", password)])
        .send()
        .await?;

    if resp.status() != StatusCode::SEE_OTHER {
        return Err(format!("login for {email} failed with {}", resp.status()).into());
    }
    Ok(client)
}

/// Log in as the seeded admin.
///
/// # Errors
///
/// Returns an error if the login fails.
pub async fn admin_client() -> Result<Client, Box<dyn std::error::Error>> {
    let (email, password) = admin_credentials();
    login(&email, &password).await
}

/// Create a throwaway non-admin user through the admin API and log in as them.
///
/// # Errors
///
/// Returns an error if creation or login fails.
pub async fn fresh_user(admin: &Client) -> Result<(Client, Value), Box<dyn std::error::Error>> {
    let email = format!("it-{}@example.com", uuid::Uuid::new_v4().simple());
    let password = "integration-pass";
    let resp = admin
        .post(format!("{}/api/admin/users", base_url()))
        .json(&json!({
            "username": "integration",
            "email": email,
            "password": password,
        }))
        .send()
        .await?;

    if resp.status() != StatusCode::CREATED {
        return Err(format!("creating test user failed with {}", resp.status()).into());
    }
    let user: Value = resp.json().await?;
    let client = login(&email, password).await?;
    Ok((client, user))
}

/// The first weekday strictly after `from`.
#[must_use]
pub fn next_weekday_after(from: NaiveDate) -> NaiveDate {
    let mut day = from + Duration::days(1);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day += Duration::days(1);
    }
    day
}

/// A date that is always open for ordering, whatever the clock says.
#[must_use]
pub fn open_date() -> NaiveDate {
    next_weekday_after(Utc::now().date_naive() + Duration::days(1))
}

/// The next Saturday after today.
#[must_use]
pub fn next_saturday() -> NaiveDate {
    let today = Utc::now().date_naive();
    let ahead = (Weekday::Sat.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    today + Duration::days(i64::from(if ahead == 0 { 7 } else { ahead }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_next_weekday_skips_weekend() {
        let friday = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
        assert_eq!(
            next_weekday_after(friday),
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
        );
    }

    #[test]
    fn test_next_saturday_is_saturday() {
        assert_eq!(next_saturday().weekday(), Weekday::Sat);
        assert!(next_saturday() > Utc::now().date_naive());
    }
}
