//! Login and account-creation errors.

use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Never says which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] lunch_order_core::EmailError),

    #[error("username is required")]
    MissingUsername,

    /// Another account already uses this email.
    #[error("email already registered")]
    EmailTaken,

    #[error("password rejected: {0}")]
    WeakPassword(String),

    #[error("password hashing failed")]
    PasswordHash,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
