//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! lunch-cli user create -u alice -e alice@example.com -p 'correct horse' --admin
//! lunch-cli user set-admin -e alice@example.com --admin false
//! ```

use sqlx::PgPool;
use thiserror::Error;

use lunch_order_core::{Email, EmailError, UserId};
use lunch_order_web::db::{RepositoryError, UserRepository};
use lunch_order_web::services::{AuthError, AuthService};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("No user with email: {0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Create a user with a hashed password.
///
/// # Errors
///
/// Returns `UserError::Auth` if the input is rejected or the email is taken.
pub async fn create(
    pool: &PgPool,
    username: &str,
    email: &str,
    password: &str,
    is_admin: bool,
) -> Result<UserId, UserError> {
    let user = AuthService::new(pool)
        .create_user(username, email, password, is_admin)
        .await?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        is_admin = user.is_admin,
        "User created"
    );
    Ok(user.id)
}

/// Grant or revoke admin rights by email.
///
/// # Errors
///
/// Returns `UserError::NotFound` if no user has that email.
pub async fn set_admin(pool: &PgPool, email: &str, is_admin: bool) -> Result<(), UserError> {
    let email = Email::parse(email)?;
    let users = UserRepository::new(pool);

    let user = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| UserError::NotFound(email.to_string()))?;
    users.set_admin(user.id, is_admin).await?;

    tracing::info!(user_id = %user.id, %email, is_admin, "Admin flag changed");
    Ok(())
}
