//! Lunch Order Core - Shared types and ordering rules.
//!
//! This crate provides the types used across all Lunch Order components:
//! - `web` - The ordering site, JSON API and admin pages
//! - `cli` - Command-line tools for migrations, seeding and the daily digest
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Anything that needs "now" takes it as an argument so the
//! ordering rules can be tested with fixed clocks.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices and lunch kinds
//! - [`policy`] - Weekday, past-date and same-day cutoff rules
//! - [`calendar`] - Week grouping and the weekday grid shown on the home page

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod calendar;
pub mod policy;
pub mod types;

pub use policy::{OrderAction, OrderingPolicy, OrderingViolation};
pub use types::*;
