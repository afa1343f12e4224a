//! The ordering window.
//!
//! An order may be placed or changed for a date when all of these hold:
//!
//! - the date is not before today,
//! - if the date is today, the local time is before the cutoff,
//! - the date is a weekday.
//!
//! Checks run in that order, so a past Saturday reports [`PastDate`] rather
//! than [`Weekend`]. Callers pass the canteen's local "now"; nothing here
//! reads the clock.
//!
//! [`PastDate`]: OrderingViolation::PastDate
//! [`Weekend`]: OrderingViolation::Weekend

use core::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Default same-day cutoff: 10:00 local time.
pub const DEFAULT_CUTOFF: NaiveTime = match NaiveTime::from_hms_opt(10, 0, 0) {
    Some(t) => t,
    None => panic!("10:00 is a valid time"),
};

/// What the caller is trying to do; only affects the error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderAction {
    Create,
    Edit,
}

impl OrderAction {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Create => "Cannot order",
            Self::Edit => "Cannot edit order",
        }
    }
}

/// Why an order falls outside the ordering window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingViolation {
    /// The date is before today.
    PastDate { action: OrderAction },
    /// The date is today and the cutoff has passed.
    AfterCutoff {
        action: OrderAction,
        cutoff: NaiveTime,
    },
    /// The date is a Saturday or Sunday.
    Weekend { action: OrderAction },
}

impl fmt::Display for OrderingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PastDate { action } => write!(f, "{} for previous dates", action.prefix()),
            Self::AfterCutoff { action, cutoff } => write!(
                f,
                "{} for today after {}",
                action.prefix(),
                clock_label(*cutoff)
            ),
            Self::Weekend { action } => write!(f, "{} on weekends", action.prefix()),
        }
    }
}

impl std::error::Error for OrderingViolation {}

/// Format a time the way the canteen writes it: `10 a.m.`, `1:30 p.m.`.
fn clock_label(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let suffix = if is_pm { "p.m." } else { "a.m." };
    match time.minute() {
        0 => format!("{hour} {suffix}"),
        m => format!("{hour}:{m:02} {suffix}"),
    }
}

/// Saturday or Sunday.
#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The weekday/past/cutoff rules with a configurable cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingPolicy {
    pub cutoff: NaiveTime,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

impl OrderingPolicy {
    #[must_use]
    pub const fn new(cutoff: NaiveTime) -> Self {
        Self { cutoff }
    }

    /// Check whether `action` is allowed for `date` at local time `now`.
    ///
    /// # Errors
    ///
    /// Returns the first rule the date breaks, in the order past date,
    /// same-day cutoff, weekend.
    pub fn check(
        &self,
        date: NaiveDate,
        now: NaiveDateTime,
        action: OrderAction,
    ) -> Result<(), OrderingViolation> {
        let today = now.date();
        if date < today {
            return Err(OrderingViolation::PastDate { action });
        }
        if date == today && now.time() >= self.cutoff {
            return Err(OrderingViolation::AfterCutoff {
                action,
                cutoff: self.cutoff,
            });
        }
        if is_weekend(date) {
            return Err(OrderingViolation::Weekend { action });
        }
        Ok(())
    }

    /// Whether an existing order for `date` may still be changed.
    #[must_use]
    pub fn can_change(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        self.check(date, now, OrderAction::Edit).is_ok()
    }

    /// Whether orders for today are still being accepted.
    #[must_use]
    pub fn is_open_today(&self, now: NaiveDateTime) -> bool {
        self.check(now.date(), now, OrderAction::Create).is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        d.and_hms_opt(h, min, 0).unwrap()
    }

    // 2025-06-11 is a Wednesday.
    fn wednesday() -> NaiveDate {
        date(2025, 6, 11)
    }

    #[test]
    fn test_is_weekend() {
        assert!(is_weekend(date(2025, 6, 14)));
        assert!(is_weekend(date(2025, 6, 15)));
        assert!(!is_weekend(date(2025, 6, 16)));
        assert!(!is_weekend(wednesday()));
    }

    #[test]
    fn test_future_weekday_is_allowed() {
        let policy = OrderingPolicy::default();
        let now = at(wednesday(), 15, 0);
        assert!(policy.check(date(2025, 6, 12), now, OrderAction::Create).is_ok());
    }

    #[test]
    fn test_today_before_cutoff_is_allowed() {
        let policy = OrderingPolicy::default();
        assert!(policy.check(wednesday(), at(wednesday(), 9, 59), OrderAction::Create).is_ok());
    }

    #[test]
    fn test_today_at_cutoff_is_rejected() {
        let policy = OrderingPolicy::default();
        let err = policy
            .check(wednesday(), at(wednesday(), 10, 0), OrderAction::Create)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot order for today after 10 a.m.");
    }

    #[test]
    fn test_past_date_is_rejected() {
        let policy = OrderingPolicy::default();
        let err = policy
            .check(date(2025, 6, 10), at(wednesday(), 8, 0), OrderAction::Create)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot order for previous dates");
    }

    #[test]
    fn test_weekend_is_rejected() {
        let policy = OrderingPolicy::default();
        let err = policy
            .check(date(2025, 6, 14), at(wednesday(), 8, 0), OrderAction::Create)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot order on weekends");
    }

    #[test]
    fn test_past_takes_precedence_over_weekend() {
        let policy = OrderingPolicy::default();
        let err = policy
            .check(date(2025, 6, 8), at(wednesday(), 8, 0), OrderAction::Edit)
            .unwrap_err();
        assert_eq!(err, OrderingViolation::PastDate { action: OrderAction::Edit });
        assert_eq!(err.to_string(), "Cannot edit order for previous dates");
    }

    #[test]
    fn test_edit_messages() {
        let policy = OrderingPolicy::default();
        let now = at(wednesday(), 11, 0);
        assert_eq!(
            policy.check(wednesday(), now, OrderAction::Edit).unwrap_err().to_string(),
            "Cannot edit order for today after 10 a.m."
        );
        assert_eq!(
            policy.check(date(2025, 6, 15), now, OrderAction::Edit).unwrap_err().to_string(),
            "Cannot edit order on weekends"
        );
    }

    #[test]
    fn test_custom_cutoff_changes_message() {
        let policy = OrderingPolicy::new(NaiveTime::from_hms_opt(13, 30, 0).unwrap());
        assert!(policy.is_open_today(at(wednesday(), 13, 29)));
        let err = policy
            .check(wednesday(), at(wednesday(), 13, 30), OrderAction::Create)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot order for today after 1:30 p.m.");
    }

    #[test]
    fn test_can_change_and_is_open_today() {
        let policy = OrderingPolicy::default();
        let morning = at(wednesday(), 9, 0);
        let noon = at(wednesday(), 12, 0);

        assert!(policy.can_change(wednesday(), morning));
        assert!(!policy.can_change(wednesday(), noon));
        assert!(policy.can_change(date(2025, 6, 13), noon));
        assert!(!policy.can_change(date(2025, 6, 14), noon));

        assert!(policy.is_open_today(morning));
        assert!(!policy.is_open_today(noon));
        // Saturday morning: before the cutoff but still closed.
        assert!(!policy.is_open_today(at(date(2025, 6, 14), 8, 0)));
    }
}
