//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (`http_request` span with status and latency)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is enforced per handler by the extractors in [`auth`].

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, set_current_user,
};
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, session_layer_with_store};
