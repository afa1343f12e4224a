//! CSV export of orders over a date range.

use chrono::NaiveDate;

use lunch_order_core::Price;

use crate::models::{GuestOrderDetails, OrderDetails};

/// Header row of the export.
pub const CSV_HEADER: &str = "date,user,email,lunch,price";

/// `Content-Disposition` value for the download.
pub const CSV_DISPOSITION: &str = "attachment; filename=\"report.csv\"";

struct ReportRow<'a> {
    date: NaiveDate,
    user: String,
    email: &'a str,
    lunch: &'a str,
    price: Price,
}

/// Build the CSV for `orders` and `guests`.
///
/// Rows are in date order; within a day regular orders come before guest
/// orders. Guest rows name the host as `[GUEST] <host>`. The header is
/// always present.
#[must_use]
pub fn build_csv(orders: &[OrderDetails], guests: &[GuestOrderDetails]) -> String {
    let mut rows: Vec<ReportRow<'_>> = orders
        .iter()
        .map(|o| ReportRow {
            date: o.order.order.date,
            user: o.user.username.clone(),
            email: o.user.email.as_str(),
            lunch: &o.order.lunch_type.name,
            price: o.order.lunch_type.price,
        })
        .chain(guests.iter().map(|g| ReportRow {
            date: g.order.date,
            user: format!("[GUEST] {}", g.host_username),
            email: g.host_email.as_str(),
            lunch: &g.lunch_name,
            price: g.order.price,
        }))
        .collect();
    rows.sort_by_key(|r| r.date);

    let mut out = String::from(CSV_HEADER);
    for row in rows {
        out.push('\n');
        let date = row.date.format("%Y-%m-%d").to_string();
        let price = row.price.plain();
        let fields = [
            date.as_str(),
            row.user.as_str(),
            row.email,
            row.lunch,
            price.as_str(),
        ];
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            push_field(&mut out, field);
        }
    }
    out.push('\n');
    out
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};

    use lunch_order_core::{Email, GuestOrderId, LunchTypeId, OrderId, UserId};

    use super::*;
    use crate::models::{GuestOrder, LunchType, Order, OrderWithLunch, UserSummary};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn stamp() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(0, 0).unwrap()
    }

    fn order(d: u32, username: &str, lunch: &str) -> OrderDetails {
        OrderDetails {
            order: OrderWithLunch {
                order: Order {
                    id: OrderId::new(i32::try_from(d).unwrap()),
                    user_id: UserId::new(1),
                    lunch_type_id: LunchTypeId::new(1),
                    date: date(d),
                    customization: String::new(),
                    cold_type: None,
                    bread_type: None,
                    drink_type: None,
                    created_at: stamp(),
                    updated_at: stamp(),
                },
                lunch_type: LunchType {
                    id: LunchTypeId::new(1),
                    name: lunch.to_owned(),
                    price: Price::from_cents(430),
                },
            },
            user: UserSummary {
                id: UserId::new(1),
                username: username.to_owned(),
                email: Email::parse("alice@example.com").unwrap(),
            },
        }
    }

    fn guest(d: u32) -> GuestOrderDetails {
        GuestOrderDetails {
            order: GuestOrder {
                id: GuestOrderId::new(1),
                host_user_id: UserId::new(2),
                lunch_type_id: LunchTypeId::new(3),
                date: date(d),
                guest_name: "Visitor".to_owned(),
                customization: String::new(),
                cold_type: None,
                bread_type: None,
                drink_type: None,
                price: Price::from_cents(1000),
                created_at: stamp(),
            },
            lunch_name: "Salad".to_owned(),
            host_username: "bob".to_owned(),
            host_email: Email::parse("bob@example.com").unwrap(),
        }
    }

    #[test]
    fn test_empty_report_has_header() {
        assert_eq!(build_csv(&[], &[]), "date,user,email,lunch,price\n");
    }

    #[test]
    fn test_rows_in_date_order_with_guests() {
        let csv = build_csv(
            &[order(3, "alice", "Diet"), order(5, "alice", "Salad")],
            &[guest(3)],
        );
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "date,user,email,lunch,price",
                "2025-06-03,alice,alice@example.com,Diet,4.30",
                "2025-06-03,[GUEST] bob,bob@example.com,Salad,10.00",
                "2025-06-05,alice,alice@example.com,Salad,4.30",
            ]
        );
    }

    #[test]
    fn test_fields_are_quoted() {
        let csv = build_csv(&[order(3, "Smith, \"J\"", "Menu of the Day")], &[]);
        assert!(csv.contains("2025-06-03,\"Smith, \"\"J\"\"\",alice@example.com,"));
    }
}
