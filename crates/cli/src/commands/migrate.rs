//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! lunch-cli migrate
//! ```
//!
//! Migrations live in `crates/web/migrations/` and are embedded at compile
//! time. The server never runs them on startup.

use sqlx::PgPool;

/// Apply every pending migration.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(pool).await?;
    tracing::info!("Migrations complete!");
    Ok(())
}
