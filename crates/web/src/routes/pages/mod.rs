//! Server-rendered pages.
//!
//! Forms post back to the same path. Failed writes re-render the form with
//! the error; successful ones redirect with a `?success=` code that
//! [`flash_message`] turns into text.

pub mod admin;
pub mod auth;
pub mod guest;
pub mod home;
pub mod order;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::filters;
use crate::models::CurrentUser;
use crate::services::options::OptionsService;
use crate::state::AppState;

/// Build the pages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/order/{date}", get(order::order_page).post(order::submit_order))
        .route("/guest", get(guest::guest_page).post(guest::submit_guest))
        .route("/admin", get(admin::index))
        .route("/admin/today", get(admin::today))
        .route("/admin/orders", get(admin::orders))
        .route("/admin/orders/{id}/delete", post(admin::delete_order))
        .route("/admin/guest-orders/{id}/delete", post(admin::delete_guest_order))
        .route("/admin/users", get(admin::users).post(admin::create_user))
        .route("/admin/users/{id}/toggle-admin", post(admin::toggle_admin))
        .route("/admin/users/{id}/delete", post(admin::delete_user))
        .route("/admin/settings", get(admin::settings).post(admin::save_settings))
}

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl MessageQuery {
    fn success(&self) -> Option<String> {
        self.success.as_deref().map(flash_message)
    }

    fn error(&self) -> Option<String> {
        self.error.as_deref().map(flash_message)
    }
}

/// Text for a redirect message code. Unknown codes are shown as-is.
#[must_use]
pub fn flash_message(code: &str) -> String {
    match code {
        "order_saved" => "Your order has been saved.",
        "guest_saved" => "The guest lunch has been ordered.",
        "logged_out" => "You have been logged out.",
        "credentials" => "Invalid email or password.",
        "session" => "Could not start your session, please try again.",
        "admin_only" => "That page is for administrators.",
        "order_deleted" => "Order deleted.",
        "user_created" => "User created.",
        "user_updated" => "User updated.",
        "user_deleted" => "User deleted.",
        "self" => "You cannot change or delete your own account here.",
        "email_taken" => "A user with this email already exists.",
        "invalid_email" => "That email address is not valid.",
        "weak_password" => "Passwords must be at least 8 characters.",
        "missing_username" => "Username is required.",
        "not_found" => "That record no longer exists.",
        "settings_saved" => "Email settings saved.",
        other => other,
    }
    .to_owned()
}

/// One `<option>` in a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn from_values(values: Vec<String>, selected: Option<&str>) -> Vec<Self> {
        values
            .into_iter()
            .map(|value| Self {
                selected: selected == Some(value.as_str()),
                label: value.clone(),
                value,
            })
            .collect()
    }
}

/// The lunch fields shared by the order and guest forms.
#[derive(Debug, Clone, Default)]
pub struct LunchFields {
    pub lunch_types: Vec<SelectOption>,
    pub cold_options: Vec<SelectOption>,
    pub bread_options: Vec<SelectOption>,
    pub drink_options: Vec<SelectOption>,
    pub customization: String,
}

/// Current selections to prefill the lunch fields with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LunchForm {
    #[serde(default)]
    pub lunch_type_id: String,
    pub cold_type: Option<String>,
    pub bread_type: Option<String>,
    pub drink_type: Option<String>,
    pub customization: Option<String>,
}

impl LunchForm {
    fn lunch_type_id(&self) -> Option<lunch_order_core::LunchTypeId> {
        self.lunch_type_id.parse().ok()
    }
}

/// Load the option lists and mark the current selections.
async fn lunch_fields(options: &OptionsService, form: &LunchForm) -> Result<LunchFields, AppError> {
    let selected_type = form.lunch_type_id();
    let lunch_types = options
        .lunch_types()
        .await?
        .into_iter()
        .map(|lt| SelectOption {
            value: lt.id.to_string(),
            label: format!("{} ({})", lt.name, lt.price),
            selected: selected_type == Some(lt.id),
        })
        .collect();

    Ok(LunchFields {
        lunch_types,
        cold_options: SelectOption::from_values(
            options.cold_options().await?,
            form.cold_type.as_deref(),
        ),
        bread_options: SelectOption::from_values(
            options.bread_options().await?,
            form.bread_type.as_deref(),
        ),
        drink_options: SelectOption::from_values(
            options.drink_options().await?,
            form.drink_type.as_deref(),
        ),
        customization: form.customization.clone().unwrap_or_default(),
    })
}

/// Error page template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub user: Option<CurrentUser>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub message: String,
}

/// Render an error as an HTML page.
///
/// Server errors are reported to Sentry and shown with a generic message.
pub fn error_page(user: Option<CurrentUser>, err: &AppError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        let event_id = sentry::capture_error(err);
        tracing::error!(error = %err, sentry_event_id = %event_id, "Page error");
    }

    let page = ErrorTemplate {
        user,
        success: None,
        error: None,
        message: err.public_message(),
    };
    (status, page).into_response()
}

/// A 400 page for malformed path parameters.
pub fn bad_request_page(user: Option<CurrentUser>, what: &str) -> Response {
    error_page(user, &AppError::BadRequest(format!("Invalid {what}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_message_known_and_unknown() {
        assert_eq!(flash_message("order_saved"), "Your order has been saved.");
        assert_eq!(flash_message("something else"), "something else");
    }

    #[test]
    fn test_select_options_mark_selection() {
        let opts = SelectOption::from_values(
            vec!["Milk".to_owned(), "Ayran".to_owned()],
            Some("Ayran"),
        );
        assert!(!opts[0].selected);
        assert!(opts[1].selected);
        assert_eq!(opts[1].label, "Ayran");
    }
}
