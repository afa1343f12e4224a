//! Domain types for the lunch site.
//!
//! These are validated objects handed out by the repositories, separate from
//! the database row types. JSON field names are camelCase.

pub mod guest;
pub mod lunch;
pub mod order;
pub mod parameter;
pub mod session;
pub mod user;

pub use guest::{GuestOrder, GuestOrderDetails};
pub use lunch::LunchType;
pub use order::{Order, OrderDetails, OrderView, OrderWithLunch, UserSummary};
pub use parameter::Parameter;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
