//! Guest order domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use lunch_order_core::{Email, GuestOrderId, LunchTypeId, Price, UserId};

use super::order::summarize;

/// A lunch a user registered for a visitor.
///
/// The price is fixed when the order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GuestOrder {
    pub id: GuestOrderId,
    pub host_user_id: UserId,
    pub lunch_type_id: LunchTypeId,
    pub date: NaiveDate,
    pub guest_name: String,
    pub customization: String,
    pub cold_type: Option<String>,
    pub bread_type: Option<String>,
    pub drink_type: Option<String>,
    pub price: Price,
    pub created_at: DateTime<Utc>,
}

/// A guest order with its lunch type name and host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestOrderDetails {
    #[serde(flatten)]
    pub order: GuestOrder,
    pub lunch_name: String,
    pub host_username: String,
    pub host_email: Email,
}

impl GuestOrderDetails {
    /// Same format as [`super::OrderDetails::summary`], prefixed with the
    /// guest's name when one was given.
    #[must_use]
    pub fn summary(&self) -> String {
        let line = summarize(
            &self.lunch_name,
            self.order.cold_type.as_deref(),
            self.order.bread_type.as_deref(),
            self.order.drink_type.as_deref(),
            &self.order.customization,
        );
        match self.order.guest_name.trim() {
            "" => line,
            name => format!("{name}: {line}"),
        }
    }
}
