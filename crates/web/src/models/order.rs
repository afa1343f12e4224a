//! Order domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use lunch_order_core::{Email, LunchTypeId, OrderId, UserId};

use super::LunchType;

/// A user's lunch for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub lunch_type_id: LunchTypeId,
    pub date: NaiveDate,
    pub customization: String,
    pub cold_type: Option<String>,
    pub bread_type: Option<String>,
    pub drink_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order together with its lunch type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithLunch {
    #[serde(flatten)]
    pub order: Order,
    pub lunch_type: LunchType,
}

impl OrderWithLunch {
    /// One-line description used on the admin pages and in the digest,
    /// e.g. `Cold - Salami | Bread: Ciabatta | Drink: Ayran | Note: no butter`.
    #[must_use]
    pub fn summary(&self) -> String {
        summarize(
            &self.lunch_type.name,
            self.order.cold_type.as_deref(),
            self.order.bread_type.as_deref(),
            self.order.drink_type.as_deref(),
            &self.order.customization,
        )
    }
}

/// An entry in a user's order history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: OrderWithLunch,
    pub can_change: bool,
    pub day_name: &'static str,
}

/// The owner fields shown next to an order in admin views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: Email,
}

/// An order with its lunch type and owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: OrderWithLunch,
    pub user: UserSummary,
}

impl OrderDetails {
    #[must_use]
    pub fn summary(&self) -> String {
        self.order.summary()
    }
}

pub(crate) fn summarize(
    lunch: &str,
    cold_type: Option<&str>,
    bread_type: Option<&str>,
    drink_type: Option<&str>,
    customization: &str,
) -> String {
    let mut out = lunch.to_owned();
    if let Some(cold) = cold_type {
        out.push_str(" - ");
        out.push_str(cold);
    }
    if let Some(bread) = bread_type {
        out.push_str(" | Bread: ");
        out.push_str(bread);
    }
    if let Some(drink) = drink_type {
        out.push_str(" | Drink: ");
        out.push_str(drink);
    }
    let note = customization.trim();
    if !note.is_empty() {
        out.push_str(" | Note: ");
        out.push_str(note);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_plain_lunch() {
        assert_eq!(summarize("Salad", None, None, None, ""), "Salad");
    }

    #[test]
    fn test_summarize_cold_with_extras() {
        let line = summarize(
            "Cold",
            Some("Salami"),
            Some("Ciabatta"),
            Some("Ayran"),
            " no butter ",
        );
        assert_eq!(
            line,
            "Cold - Salami | Bread: Ciabatta | Drink: Ayran | Note: no butter"
        );
    }
}
