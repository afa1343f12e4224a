//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;

/// Format an ISO date (`2025-06-04`) as `Wed 4 Jun`.
///
/// Values that aren't dates are shown unchanged.
///
/// Usage in templates: `{{ order.date|short_date }}`
#[askama::filter_fn]
pub fn short_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_short_date(&value.to_string()))
}

fn format_short_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_or_else(|_| raw.to_owned(), |d| d.format("%a %-d %b").to_string())
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}
