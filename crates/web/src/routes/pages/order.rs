//! The order form for one day.
//!
//! Admins can open it for someone else with `?user=<id>`; the save then goes
//! through the admin path and lands back on the today overview.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;

use lunch_order_core::calendar::day_name;
use lunch_order_core::{OrderAction, UserId};

use super::{LunchFields, LunchForm, bad_request_page, error_page, lunch_fields};
use crate::db::UserRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, OrderWithLunch};
use crate::services::{AdminOrderInput, OrderInput, OrderingService};
use crate::state::AppState;

/// `?user=` on the order page.
#[derive(Debug, Default, Deserialize)]
pub struct TargetQuery {
    pub user: Option<String>,
}

/// Posted order form.
#[derive(Debug, Default, Deserialize)]
pub struct OrderForm {
    pub user: Option<String>,
    #[serde(flatten)]
    pub lunch: LunchForm,
}

/// Order form template.
#[derive(Template, WebTemplate)]
#[template(path = "order.html")]
pub struct OrderTemplate {
    pub user: Option<CurrentUser>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub iso: String,
    pub day_name: &'static str,
    pub on_behalf_of: Option<String>,
    pub closed_reason: Option<String>,
    pub target_user_id: Option<String>,
    pub editing: bool,
    pub fields: LunchFields,
}

/// Whose order the form is for.
struct Target {
    id: UserId,
    /// Set when an admin is ordering for someone else.
    on_behalf_of: Option<String>,
}

async fn resolve_target(
    state: &AppState,
    current: &CurrentUser,
    requested: Option<&str>,
) -> Result<Target, Response> {
    let requested = requested.map(str::trim).filter(|v| !v.is_empty());
    let Some(raw) = requested else {
        return Ok(Target {
            id: current.id,
            on_behalf_of: None,
        });
    };

    let Ok(id) = raw.parse::<UserId>() else {
        return Err(bad_request_page(Some(current.clone()), "user"));
    };
    if id == current.id {
        return Ok(Target {
            id,
            on_behalf_of: None,
        });
    }
    if !current.is_admin {
        return Err(Redirect::to("/?error=admin_only").into_response());
    }

    match UserRepository::new(state.pool()).get_by_id(id).await {
        Ok(Some(user)) => Ok(Target {
            id,
            on_behalf_of: Some(user.username),
        }),
        Ok(None) => Err(error_page(
            Some(current.clone()),
            &AppError::NotFound("User not found".to_owned()),
        )),
        Err(e) => Err(error_page(Some(current.clone()), &e.into())),
    }
}

fn prefill(existing: Option<&OrderWithLunch>) -> LunchForm {
    existing
        .map(|o| LunchForm {
            lunch_type_id: o.order.lunch_type_id.to_string(),
            cold_type: o.order.cold_type.clone(),
            bread_type: o.order.bread_type.clone(),
            drink_type: o.order.drink_type.clone(),
            customization: Some(o.order.customization.clone()),
        })
        .unwrap_or_default()
}

/// Everything needed to render the form.
struct FormContext {
    date: NaiveDate,
    target: Target,
    existing: Option<OrderWithLunch>,
}

impl FormContext {
    fn action(&self) -> OrderAction {
        if self.existing.is_some() {
            OrderAction::Edit
        } else {
            OrderAction::Create
        }
    }

    async fn render(
        &self,
        state: &AppState,
        user: CurrentUser,
        form: &LunchForm,
        error: Option<String>,
    ) -> Result<OrderTemplate, AppError> {
        let closed_reason = state
            .policy()
            .check(self.date, state.now(), self.action())
            .err()
            .map(|v| v.to_string());

        Ok(OrderTemplate {
            user: Some(user),
            success: None,
            error,
            iso: self.date.format("%Y-%m-%d").to_string(),
            day_name: day_name(self.date),
            target_user_id: self
                .target
                .on_behalf_of
                .as_ref()
                .map(|_| self.target.id.to_string()),
            on_behalf_of: self.target.on_behalf_of.clone(),
            closed_reason,
            editing: self.existing.is_some(),
            fields: lunch_fields(state.options(), form).await?,
        })
    }
}

async fn load_context(
    state: &AppState,
    user: &CurrentUser,
    raw_date: &str,
    requested: Option<&str>,
) -> Result<FormContext, Response> {
    let Ok(date) = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") else {
        return Err(bad_request_page(Some(user.clone()), "date"));
    };
    let target = resolve_target(state, user, requested).await?;

    let existing = OrderingService::new(state.pool(), state.policy())
        .order_on(target.id, date)
        .await
        .map_err(|e| error_page(Some(user.clone()), &e.into()))?;

    Ok(FormContext {
        date,
        target,
        existing,
    })
}

/// GET /order/{date}
pub async fn order_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(raw_date): Path<String>,
    Query(query): Query<TargetQuery>,
) -> Response {
    let ctx = match load_context(&state, &user, &raw_date, query.user.as_deref()).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let form = prefill(ctx.existing.as_ref());
    match ctx.render(&state, user.clone(), &form, None).await {
        Ok(page) => page.into_response(),
        Err(e) => error_page(Some(user), &e),
    }
}

/// POST /order/{date}
pub async fn submit_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(raw_date): Path<String>,
    Form(form): Form<OrderForm>,
) -> Response {
    let ctx = match load_context(&state, &user, &raw_date, form.user.as_deref()).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let lunch = &form.lunch;
    let input = OrderInput {
        id: ctx.existing.as_ref().map(|o| o.order.id),
        lunch_type_id: lunch.lunch_type_id(),
        date: Some(ctx.date),
        customization: lunch.customization.clone(),
        cold_type: lunch.cold_type.clone(),
        bread_type: lunch.bread_type.clone(),
        drink_type: lunch.drink_type.clone(),
    };

    let service = OrderingService::new(state.pool(), state.policy());
    let now = state.now();
    let result = if ctx.target.on_behalf_of.is_some() {
        service
            .admin_save(
                &AdminOrderInput {
                    user_id: Some(ctx.target.id),
                    order: input,
                },
                now,
            )
            .await
    } else if ctx.existing.is_some() {
        service.edit_order(user.id, &input, now).await
    } else {
        service.place_order(user.id, &input, now).await
    };

    match result {
        Ok(_) if ctx.target.on_behalf_of.is_some() => {
            Redirect::to("/admin/today?success=order_saved").into_response()
        }
        Ok(_) => Redirect::to("/?success=order_saved").into_response(),
        Err(e) => {
            let err = AppError::from(e);
            if err.status().is_server_error() {
                return error_page(Some(user), &err);
            }
            let status = err.status();
            match ctx
                .render(&state, user.clone(), lunch, Some(err.public_message()))
                .await
            {
                Ok(page) => (status, page).into_response(),
                Err(e) => error_page(Some(user), &e),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_form_reads_flattened_fields() {
        let form: OrderForm = serde_json::from_value(json!({
            "user": "7",
            "lunch_type_id": "2",
            "cold_type": "Ham",
            "bread_type": "",
            "customization": "no onions",
        }))
        .unwrap();
        assert_eq!(form.user.as_deref(), Some("7"));
        assert_eq!(form.lunch.lunch_type_id, "2");
        assert_eq!(form.lunch.cold_type.as_deref(), Some("Ham"));
        assert_eq!(form.lunch.customization.as_deref(), Some("no onions"));
    }

    #[test]
    fn test_prefill_without_order_is_blank() {
        let form = prefill(None);
        assert!(form.lunch_type_id.is_empty());
        assert!(form.customization.is_none());
    }

    #[test]
    fn test_status_for_closed_order_is_bad_request() {
        let err = AppError::from(crate::services::OrderingError::MissingFields("x"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
