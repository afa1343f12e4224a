//! Authentication extractors.
//!
//! The session only stores who is logged in. Every extractor re-reads the
//! user from the database, so a deleted account is logged out and a revoked
//! admin flag takes effect on the next request.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::set_sentry_user;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// Page requests without a session are redirected to the login page; API
/// requests get a 401 JSON error.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in administrator.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Error returned when authentication is required but missing.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Logged in, but not an admin (for HTML requests).
    RedirectHome,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The user lookup failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::RedirectHome => Redirect::to("/?error=admin_only").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

/// Nested routers see a stripped URI, so check the original one.
fn is_api(parts: &Parts) -> bool {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or(parts.uri.path(), |uri| uri.0.path())
        .starts_with("/api/")
}

/// Load the session user and refresh it from the database.
///
/// Returns `Ok(None)` when nobody is logged in or the account is gone.
async fn load_current_user(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<CurrentUser>, AuthRejection> {
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };

    let Some(cached) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
    else {
        return Ok(None);
    };

    let user = UserRepository::new(state.pool())
        .get_by_id(cached.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load session user");
            AuthRejection::Internal
        })?;

    match user {
        Some(user) => {
            let current = CurrentUser::from(&user);
            set_sentry_user(&current.id, Some(current.email.as_str()));
            Ok(Some(current))
        }
        None => {
            tracing::info!(user_id = %cached.id, "Session user no longer exists");
            let _ = clear_current_user(session).await;
            Ok(None)
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match load_current_user(parts, state).await? {
            Some(user) => Ok(Self(user)),
            None if is_api(parts) => Err(AuthRejection::Unauthorized),
            None => Err(AuthRejection::RedirectToLogin),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match load_current_user(parts, state).await? {
            Some(user) if user.is_admin => Ok(Self(user)),
            _ if is_api(parts) => Err(AuthRejection::Unauthorized),
            Some(_) => Err(AuthRejection::RedirectHome),
            None => Err(AuthRejection::RedirectToLogin),
        }
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(load_current_user(parts, state).await?))
    }
}

/// Helper to set the current user in the session.
///
/// Cycles the session ID first so a pre-login session can't be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
