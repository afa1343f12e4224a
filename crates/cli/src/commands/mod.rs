//! Subcommand implementations.

pub mod digest;
pub mod migrate;
pub mod seed;
pub mod user;
