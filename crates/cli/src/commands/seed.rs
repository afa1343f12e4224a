//! Seed the database with lunch types, option lists and a test admin.
//!
//! Everything is upserted, so running the command twice is harmless.
//! `--reset` wipes users (and with them every order), lunch types and
//! parameters first.

use sqlx::PgPool;
use thiserror::Error;

use lunch_order_core::{Email, EmailError, Price};
use lunch_order_web::db::{LunchTypeRepository, ParameterRepository, RepositoryError, UserRepository};
use lunch_order_web::models::parameter::keys;
use lunch_order_web::services::AuthError;
use lunch_order_web::services::auth::hash_password;

/// Default admin account.
const TEST_USERNAME: &str = "testuser";
const TEST_EMAIL: &str = "test@example.com";
const TEST_PASSWORD: &str = "testpass1";

/// Every lunch type costs the same by default.
const LUNCH_PRICE_CENTS: i64 = 430;
const LUNCH_TYPES: [&str; 4] = ["Cold", "Salad", "Diet", "Menu of the Day"];

const GUEST_PRICE: &str = "10.00";
const EMAIL_SENDER: &str = "lunch@example.com";
const EMAIL_RECIPIENT: &str = "kitchen@example.com";

const COLD_OPTIONS: &[&str] = &[
    "Rosbief (Met Sla, Bieslook, Peper en Zout)",
    "Salami (Met Sla, Tomaat, Rode Paprika en Bieslook)",
    "Chorizo (Met Sla, Tomaat, Rode Paprika en Bieslook)",
    "Gebraden Gehakt (Met Sla, Augurkjes en Bieslook)",
    "Room Pate (Met Sla, Veenbesjes en Bieslook)",
    "Ardenner Pate (Met Sla, Veenbesjes en Bieslook)",
    "Filet Americain (Met Uitjes, Peper en Zout)",
    "Kipfilet V.H Serena",
    "Kalkoen (Met Sla, Mango, Paprika, Pijnboompitjes en Cumberlandsaus)",
    "Gezond (Kaas, Sla, Komkommer, Tomaat, Ei, Paprika, Wortel en Bieslook)",
    "Super Gezond (Alleen Rauwkost)",
    "Jonge Kaas (Met Sla, Tomaat en Bieslook)",
    "Belegen Kaas (Met Sla, Tomaat en Bieslook)",
    "Oude Kaas (Met Sla, Tomaat en Bieslook)",
    "Komijnekaas (Met Sla, Tomaat en Bieslook)",
    "Roomkaas (Met Sla, Komkommer en Bieslook)",
    "Brie (Met Sla, Komkommer en Bieslook)",
    "Bleu Castello (Met Sla, Veenbesjes en Mint)",
    "Nootrambol (Met Sla, Rode Paprika en Bieslook)",
    "Turkse Kaas (Met Sla, Pomodori, Olijfjes, Peper en Basilicum)",
    "Mozzarella (Met Sla, Tomaat, Pijnboompitjes, Peper en Basilicum)",
    "Zalm (Met Sla, Dille, Peper en Mayonaise)",
    "Roomzalm (Zalm met Sla, Peper, Bieslook en Roomkaas)",
    "Tonijn (Met Sla, Ei, Peper, Bieslook en Mayonaise)",
    "Krabsalade (Met Sla, Wortel, Dille en Peper)",
    "Eiersalade (Met Sla, Tomaat, Paprika, Wortel en Bieslook)",
    "Ei (Met Sla, Tomaat, Paprika, Wortel, Bieslook, Peper, Zout en Mayonaise)",
    "Tost Kasarli",
    "Tost Sucuklu",
    "Kinoa Salatasi",
    "Taze Meyve Salatasi",
    "Mercimek Yesil Salatasi",
    "Special Areda Salata",
    "Patlican Biber Kizartmasi",
    "Kisir Salatasi",
    "Arpa veya Kuskus Sehriye Salatasi",
    "Kirmizi Barbunya Salatasi",
    "Yogurtlu Makarna Salatasi",
    "Patates Salatasi",
    "Kozlenmis Patlican Salatasi",
    "Custom Order (Check Notes)",
    "Soguk (Cold) Wrap",
    "Icli Kofte Menu",
    "Kahvalti Menu Pogacali",
];

const BREAD_OPTIONS: &[&str] = &[
    "Italiaanse Bol",
    "Ciabatta",
    "Boeren Bol",
    "Witte en Bruine Pistolet",
    "Grof Volkoren Bolletje",
    "Demi Baguette Rustiek",
    "Demi Baguette Meergranen",
    "Zacht Witte Broodje",
    "Zacht Bruin Broodje",
];

const DRINK_OPTIONS: &[&str] = &["Melk", "Karnemelk", "Ayran", "Orange Juice", "Apple Juice"];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Invalid seed email: {0}")]
    Email(#[from] EmailError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// `cold_1`, `cold_2`, ... for a list of options.
fn numbered<'a>(prefix: &'a str, values: &'a [&'a str]) -> impl Iterator<Item = (String, &'a str)> {
    values
        .iter()
        .enumerate()
        .map(move |(i, value)| (format!("{prefix}{}", i + 1), *value))
}

/// Seed the database.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub async fn run(pool: &PgPool, reset: bool) -> Result<(), SeedError> {
    if reset {
        reset_tables(pool).await?;
    }

    seed_users(pool).await?;

    let lunch_types = LunchTypeRepository::new(pool);
    for name in LUNCH_TYPES {
        lunch_types
            .upsert_by_name(name, Price::from_cents(LUNCH_PRICE_CENTS))
            .await?;
    }
    tracing::info!(count = LUNCH_TYPES.len(), "Lunch types seeded");

    let params = ParameterRepository::new(pool);
    let options = numbered(keys::COLD_PREFIX, COLD_OPTIONS)
        .chain(numbered(keys::BREAD_PREFIX, BREAD_OPTIONS))
        .chain(numbered(keys::DRINK_PREFIX, DRINK_OPTIONS));
    for (key, value) in options {
        params.upsert(&key, value).await?;
    }
    params.upsert(keys::GUEST_PRICE, GUEST_PRICE).await?;
    params.upsert(keys::EMAIL_SENDER, EMAIL_SENDER).await?;
    params.upsert(keys::EMAIL_RECIPIENT, EMAIL_RECIPIENT).await?;
    tracing::info!(
        cold = COLD_OPTIONS.len(),
        bread = BREAD_OPTIONS.len(),
        drink = DRINK_OPTIONS.len(),
        "Parameters seeded"
    );

    Ok(())
}

async fn reset_tables(pool: &PgPool) -> Result<(), SeedError> {
    tracing::info!("Deleting existing data...");
    let mut tx = pool.begin().await?;
    // Users cascade to orders and guest orders.
    sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM parameters").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM lunch_types").execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}

async fn seed_users(pool: &PgPool) -> Result<(), SeedError> {
    let users = UserRepository::new(pool);
    let email = Email::parse(TEST_EMAIL)?;

    if users.get_by_email(&email).await?.is_some() {
        tracing::info!(%email, "Test user already exists");
        return Ok(());
    }

    let hash = hash_password(TEST_PASSWORD)?;
    let user = users.create(TEST_USERNAME, &email, &hash, true).await?;
    tracing::info!(user_id = %user.id, %email, "Test admin created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_keys_start_at_one() {
        let keys: Vec<_> = numbered("drink_", DRINK_OPTIONS).collect();
        assert_eq!(keys.first(), Some(&("drink_1".to_owned(), "Melk")));
        assert_eq!(keys.last().map(|(k, _)| k.as_str()), Some("drink_5"));
    }

    #[test]
    fn test_seed_constants_are_valid() {
        assert!(Email::parse(TEST_EMAIL).is_ok());
        assert!(Email::parse(EMAIL_SENDER).is_ok());
        assert!(GUEST_PRICE.parse::<Price>().is_ok());
        assert!(TEST_PASSWORD.len() >= lunch_order_web::services::auth::MIN_PASSWORD_LENGTH);
    }
}
