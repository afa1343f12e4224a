//! Login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::MessageQuery;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub email: String,
}

/// GET /auth/login
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        user: None,
        success: query.success(),
        error: query.error(),
        email: String::new(),
    }
    .into_response()
}

/// POST /auth/login
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed");
            return LoginTemplate {
                user: None,
                success: None,
                error: Some(super::flash_message("credentials")),
                email: form.email,
            }
            .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Login error");
            return Redirect::to("/auth/login?error=session").into_response();
        }
    };

    let current = CurrentUser::from(&user);
    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!(error = %e, "Failed to set session");
        return Redirect::to("/auth/login?error=session").into_response();
    }
    set_sentry_user(&current.id, Some(current.email.as_str()));

    Redirect::to("/").into_response()
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    Redirect::to("/auth/login?success=logged_out").into_response()
}
