//! The home page: this week and next week at a glance.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, NaiveDateTime};

use lunch_order_core::OrderingPolicy;
use lunch_order_core::calendar::{day_name, display_range, display_weeks};

use super::{MessageQuery, error_page};
use crate::db::OrderRepository;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, OrderWithLunch};
use crate::state::AppState;

/// A weekday row on the home page.
#[derive(Debug, Clone)]
pub struct DayView {
    pub iso: String,
    pub day_name: &'static str,
    pub summary: Option<String>,
    pub can_change: bool,
    pub is_today: bool,
}

/// Monday to Friday of one week.
#[derive(Debug, Clone)]
pub struct WeekView {
    pub label: String,
    pub days: Vec<DayView>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub open_today: bool,
    pub cutoff: String,
    pub weeks: Vec<WeekView>,
}

/// Lay out this week and next week with the user's orders.
pub(crate) fn build_weeks(
    orders: &[OrderWithLunch],
    policy: &OrderingPolicy,
    now: NaiveDateTime,
) -> Vec<WeekView> {
    let by_date: HashMap<NaiveDate, &OrderWithLunch> =
        orders.iter().map(|o| (o.order.date, o)).collect();
    let today = now.date();

    display_weeks(today)
        .into_iter()
        .zip(["This week", "Next week"])
        .map(|(dates, label)| WeekView {
            label: label.to_owned(),
            days: dates
                .into_iter()
                .map(|date| DayView {
                    iso: date.format("%Y-%m-%d").to_string(),
                    day_name: day_name(date),
                    summary: by_date.get(&date).map(|o| o.summary()),
                    can_change: policy.can_change(date, now),
                    is_today: date == today,
                })
                .collect(),
        })
        .collect()
}

/// GET /
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    let policy = state.policy();
    let now = state.now();

    let (first, last) = display_range(now.date());
    let weeks = match &user {
        Some(u) => match OrderRepository::new(state.pool())
            .list_for_user_between(u.id, first, last)
            .await
        {
            Ok(orders) => build_weeks(&orders, &policy, now),
            Err(e) => return error_page(user, &e.into()),
        },
        None => Vec::new(),
    };

    HomeTemplate {
        user,
        success: query.success(),
        error: query.error(),
        open_today: policy.is_open_today(now),
        cutoff: policy.cutoff.format("%H:%M").to_string(),
        weeks,
    }
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_weeks_without_orders() {
        // Wednesday 2025-06-04 at 11:00, after the cutoff
        let now = NaiveDate::from_ymd_opt(2025, 6, 4)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap();
        let weeks = build_weeks(&[], &OrderingPolicy::default(), now);

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].label, "This week");
        assert_eq!(weeks[0].days.len(), 5);
        assert_eq!(weeks[0].days[0].iso, "2025-06-02");
        assert_eq!(weeks[1].days[0].iso, "2025-06-09");

        let wednesday = &weeks[0].days[2];
        assert!(wednesday.is_today);
        assert!(!wednesday.can_change);
        assert!(weeks[0].days[3].can_change);
        assert!(wednesday.summary.is_none());
    }
}
