//! Core types for Lunch Order.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod lunch;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use lunch::LunchKind;
pub use price::Price;
