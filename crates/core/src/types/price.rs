//! Euro prices using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in euros.
///
/// Stored as `NUMERIC(10, 2)` and serialized as a string (`"4.30"`) so no
/// precision is lost on the way to JSON.
///
/// ```
/// use lunch_order_core::Price;
///
/// let price = Price::from_cents(430);
/// assert_eq!(price.to_string(), "€4.30");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero euros.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a euro amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The amount in euros.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount without the currency sign, always two decimals (`4.30`).
    ///
    /// Used for CSV exports where a bare number is easier to sum.
    #[must_use]
    pub fn plain(&self) -> String {
        format!("{:.2}", self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "€{}", self.plain())
    }
}

impl std::str::FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('€').trim();
        Decimal::from_str_exact(s).map(Self)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_cents() {
        assert_eq!(Price::from_cents(1000).to_string(), "€10.00");
        assert_eq!(Price::new(Decimal::new(43, 1)).to_string(), "€4.30");
        assert_eq!(Price::ZERO.plain(), "0.00");
    }

    #[test]
    fn test_parse_accepts_euro_sign() {
        let price: Price = "€ 4.30".parse().unwrap();
        assert_eq!(price, Price::from_cents(430));
        assert!("four".parse::<Price>().is_err());
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(430), Price::from_cents(1000)]
            .into_iter()
            .sum();
        assert_eq!(total.plain(), "14.30");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::from_cents(430)).unwrap();
        assert_eq!(json, "\"4.30\"");
    }
}
