//! Lunch type domain type.

use serde::Serialize;

use lunch_order_core::{LunchKind, LunchTypeId, Price};

/// A menu category with its price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LunchType {
    pub id: LunchTypeId,
    pub name: String,
    pub price: Price,
}

impl LunchType {
    #[must_use]
    pub fn kind(&self) -> LunchKind {
        LunchKind::from_name(&self.name)
    }
}
