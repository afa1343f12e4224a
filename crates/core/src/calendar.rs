//! Week grouping and the weekday grid.

use chrono::{Datelike, Days, NaiveDate};

/// The week bucket an order date falls in.
///
/// Weeks start on Sunday and week 1 is the one containing January 1st, so
/// the number can differ from the ISO week. It is only used as a grouping
/// key for a user's order history.
#[must_use]
pub fn week_number(date: NaiveDate) -> u32 {
    let jan1_offset = NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .map_or(0, |jan1| jan1.weekday().num_days_from_sunday());
    (date.ordinal0() + jan1_offset + 1).div_ceil(7)
}

/// The Monday of the ISO week containing `date`.
///
/// Sunday belongs to the week that started six days earlier.
#[must_use]
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// Monday to Friday of the week starting at `monday`.
#[must_use]
pub fn work_week(monday: NaiveDate) -> Vec<NaiveDate> {
    monday.iter_days().take(5).collect()
}

/// This week's and next week's working days, as shown on the home page.
///
/// On a weekend "this week" is still the week that is ending.
#[must_use]
pub fn display_weeks(today: NaiveDate) -> [Vec<NaiveDate>; 2] {
    let this_monday = monday_of(today);
    let next_monday = this_monday
        .checked_add_days(Days::new(7))
        .unwrap_or(this_monday);
    [work_week(this_monday), work_week(next_monday)]
}

/// First and last day shown by [`display_weeks`]: this Monday to next Friday.
#[must_use]
pub fn display_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = monday_of(today);
    let last = first.checked_add_days(Days::new(11)).unwrap_or(first);
    (first, last)
}

/// English weekday name, e.g. `Wednesday`.
#[must_use]
pub fn day_name(date: NaiveDate) -> &'static str {
    use chrono::Weekday;

    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_number() {
        // 2025-01-01 is a Wednesday; Sun 2025-01-05 starts week 2.
        assert_eq!(week_number(date(2025, 1, 1)), 1);
        assert_eq!(week_number(date(2025, 1, 4)), 1);
        assert_eq!(week_number(date(2025, 1, 5)), 2);
        assert_eq!(week_number(date(2025, 6, 11)), 24);
    }

    #[test]
    fn test_week_number_groups_monday_to_friday() {
        let monday = date(2025, 6, 9);
        let week = week_number(monday);
        for day in work_week(monday) {
            assert_eq!(week_number(day), week);
        }
    }

    #[test]
    fn test_display_range_spans_both_weeks() {
        let today = date(2025, 6, 11);
        let (first, last) = display_range(today);
        let weeks = display_weeks(today);
        assert_eq!(first, weeks[0][0]);
        assert_eq!(last, weeks[1][4]);
        assert_eq!((first, last), (date(2025, 6, 9), date(2025, 6, 20)));
    }

    #[test]
    fn test_monday_of() {
        assert_eq!(monday_of(date(2025, 6, 11)), date(2025, 6, 9));
        assert_eq!(monday_of(date(2025, 6, 9)), date(2025, 6, 9));
        assert_eq!(monday_of(date(2025, 6, 15)), date(2025, 6, 9));
    }

    #[test]
    fn test_display_weeks_on_weekend() {
        let [this_week, next_week] = display_weeks(date(2025, 6, 14));
        assert_eq!(this_week.first(), Some(&date(2025, 6, 9)));
        assert_eq!(this_week.last(), Some(&date(2025, 6, 13)));
        assert_eq!(next_week.first(), Some(&date(2025, 6, 16)));
        assert_eq!(next_week.len(), 5);
    }

    #[test]
    fn test_day_name() {
        assert_eq!(day_name(date(2025, 6, 11)), "Wednesday");
        assert_eq!(day_name(date(2025, 6, 15)), "Sunday");
    }
}
