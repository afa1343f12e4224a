//! Guest lunches billed to the logged-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{LunchFields, LunchForm, error_page, lunch_fields};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::services::{GuestOrderInput, GuestService};
use crate::state::AppState;

/// Posted guest form.
#[derive(Debug, Default, Deserialize)]
pub struct GuestForm {
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub date: String,
    #[serde(flatten)]
    pub lunch: LunchForm,
}

/// Guest order template.
#[derive(Template, WebTemplate)]
#[template(path = "guest.html")]
pub struct GuestTemplate {
    pub user: Option<CurrentUser>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub guest_price: String,
    pub guest_name: String,
    pub iso: String,
    pub fields: LunchFields,
}

async fn render(
    state: &AppState,
    user: CurrentUser,
    form: &GuestForm,
    error: Option<String>,
) -> Result<GuestTemplate, AppError> {
    let options = state.options();
    Ok(GuestTemplate {
        user: Some(user),
        success: None,
        error,
        guest_price: options.guest_price().await?.to_string(),
        guest_name: form.guest_name.clone(),
        iso: form.date.clone(),
        fields: lunch_fields(options, &form.lunch).await?,
    })
}

/// GET /guest
pub async fn guest_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Response {
    let form = GuestForm {
        date: state.today().format("%Y-%m-%d").to_string(),
        ..GuestForm::default()
    };
    match render(&state, user.clone(), &form, None).await {
        Ok(page) => page.into_response(),
        Err(e) => error_page(Some(user), &e),
    }
}

/// POST /guest
pub async fn submit_guest(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<GuestForm>,
) -> Response {
    let input = GuestOrderInput {
        guest_name: Some(form.guest_name.clone()),
        lunch_type_id: form.lunch.lunch_type_id(),
        date: NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d").ok(),
        customization: form.lunch.customization.clone(),
        cold_type: form.lunch.cold_type.clone(),
        bread_type: form.lunch.bread_type.clone(),
        drink_type: form.lunch.drink_type.clone(),
    };

    let result = GuestService::new(state.pool(), state.options(), state.policy())
        .place_guest_order(user.id, &input, state.now())
        .await;

    match result {
        Ok(_) => Redirect::to("/?success=guest_saved").into_response(),
        Err(e) => {
            let err = AppError::from(e);
            if err.status().is_server_error() {
                return error_page(Some(user), &err);
            }
            let status = err.status();
            match render(&state, user.clone(), &form, Some(err.public_message())).await {
                Ok(page) => (status, page).into_response(),
                Err(e) => error_page(Some(user), &e),
            }
        }
    }
}
