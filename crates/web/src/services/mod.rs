//! Business logic between the route handlers and the repositories.

pub mod auth;
pub mod digest;
pub mod guest;
pub mod options;
pub mod ordering;
pub mod report;

pub use auth::{AuthError, AuthService};
pub use digest::{Digest, DigestError, DigestService, compose_digest, load_digest};
pub use guest::{GuestOrderInput, GuestService};
pub use options::{EmailSettings, OptionsService, SettingsError};
pub use ordering::{AdminOrderInput, OrderInput, OrderingError, OrderingService};
pub use report::build_csv;
