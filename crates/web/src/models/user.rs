//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use lunch_order_core::{Email, UserId};

/// A site user.
///
/// The password hash never leaves the repository, so this type is safe to
/// return from the admin API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}
