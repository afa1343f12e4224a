//! Settings row.

use serde::{Deserialize, Serialize};

/// A key/value pair from the `parameters` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Parameter {
    pub key: String,
    pub value: String,
}

/// Well-known parameter keys.
pub mod keys {
    pub const EMAIL_SENDER: &str = "email_sender";
    pub const EMAIL_RECIPIENT: &str = "email_recipient";
    pub const GUEST_PRICE: &str = "guest_price";

    /// Prefixes of the numbered option lists (`cold_1`, `cold_2`, ...).
    pub const COLD_PREFIX: &str = "cold_";
    pub const BREAD_PREFIX: &str = "bread_";
    pub const DRINK_PREFIX: &str = "drink_";
}
