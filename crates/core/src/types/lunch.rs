//! Lunch categories.

use serde::{Deserialize, Serialize};

/// The kind of a lunch type, derived from its name.
///
/// Lunch types are reference rows in the database; only a few names carry
/// behavior, so everything else maps to [`LunchKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LunchKind {
    /// Sandwich lunch; needs a sandwich choice.
    Cold,
    Salad,
    Diet,
    MenuOfTheDay,
    Other,
}

impl LunchKind {
    /// Classify a lunch type by its display name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "cold" => Self::Cold,
            "salad" => Self::Salad,
            "diet" => Self::Diet,
            "menu of the day" => Self::MenuOfTheDay,
            _ => Self::Other,
        }
    }

    /// Whether an order of this kind must name a sandwich.
    #[must_use]
    pub const fn requires_sandwich(self) -> bool {
        matches!(self, Self::Cold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(LunchKind::from_name("Cold"), LunchKind::Cold);
        assert_eq!(LunchKind::from_name(" cold "), LunchKind::Cold);
        assert_eq!(LunchKind::from_name("Menu of the Day"), LunchKind::MenuOfTheDay);
        assert_eq!(LunchKind::from_name("Soup"), LunchKind::Other);
    }

    #[test]
    fn test_only_cold_requires_sandwich() {
        assert!(LunchKind::Cold.requires_sandwich());
        assert!(!LunchKind::Salad.requires_sandwich());
        assert!(!LunchKind::Diet.requires_sandwich());
        assert!(!LunchKind::MenuOfTheDay.requires_sandwich());
        assert!(!LunchKind::Other.requires_sandwich());
    }
}
