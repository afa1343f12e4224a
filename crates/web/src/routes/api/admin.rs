//! Admin JSON API: users, orders, CSV report and email settings.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lunch_order_core::{OrderId, UserId};

use super::{ApiJson, ApiQuery, parse_filter};
use crate::db::{GuestOrderRepository, OrderRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{CurrentUser, OrderDetails, OrderWithLunch, User};
use crate::services::report::{CSV_DISPOSITION, build_csv};
use crate::services::{AdminOrderInput, AuthService, EmailSettings, OrderingService};
use crate::state::AppState;

/// Build the `/api/admin` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users)
                .post(create_user)
                .put(set_admin)
                .delete(delete_user),
        )
        .route(
            "/orders",
            get(list_orders).post(save_order).delete(delete_order),
        )
        .route("/report", get(report))
        .route("/settings", get(get_settings).post(save_settings))
}

// =============================================================================
// Users
// =============================================================================

/// Body of `POST /api/admin/users`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Body of `PUT /api/admin/users`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAdminRequest {
    pub user_id: Option<UserId>,
    pub is_admin: Option<bool>,
}

/// Body of the admin `DELETE` endpoints.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest<Id> {
    pub id: Option<Id>,
}

/// Reject admins changing their own account in a way that would lock
/// them out.
pub(crate) fn ensure_not_self(admin: &CurrentUser, target: UserId, action: &str) -> Result<()> {
    if admin.id == target {
        return Err(AppError::BadRequest(format!(
            "You cannot {action} your own account"
        )));
    }
    Ok(())
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.pool()).list_all().await?))
}

/// POST /api/admin/users
#[instrument(skip(state, _admin, req))]
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let (Some(username), Some(email), Some(password)) = (
        req.username.as_deref(),
        req.email.as_deref(),
        req.password.as_deref(),
    ) else {
        return Err(AppError::BadRequest(
            "Missing fields: username, email and password are required".to_owned(),
        ));
    };

    let user = AuthService::new(state.pool())
        .create_user(username, email, password, req.is_admin)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/admin/users
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn set_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<SetAdminRequest>,
) -> Result<Json<User>> {
    let (Some(user_id), Some(is_admin)) = (req.user_id, req.is_admin) else {
        return Err(AppError::BadRequest(
            "Missing fields: userId and isAdmin are required".to_owned(),
        ));
    };
    if !is_admin {
        ensure_not_self(&admin, user_id, "remove admin rights from")?;
    }

    let user = UserRepository::new(state.pool())
        .set_admin(user_id, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("User not found".to_owned()),
            other => other.into(),
        })?;

    tracing::info!(%user_id, is_admin, "Admin flag changed");
    Ok(Json(user))
}

/// DELETE /api/admin/users
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<DeleteRequest<UserId>>,
) -> Result<StatusCode> {
    let Some(user_id) = req.id else {
        return Err(AppError::BadRequest("Missing fields: id is required".to_owned()));
    };
    ensure_not_self(&admin, user_id, "delete")?;

    UserRepository::new(state.pool())
        .delete(user_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("User not found".to_owned()),
            other => other.into(),
        })?;

    tracing::info!(%user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders
// =============================================================================

/// Query of `GET /api/admin/orders`. Blank values mean "any".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub date: Option<String>,
    pub user_id: Option<String>,
}

impl OrdersQuery {
    /// The day and user filters.
    pub(crate) fn filters(&self) -> Result<(Option<NaiveDate>, Option<UserId>)> {
        Ok((
            parse_filter(self.date.as_deref(), "date")?,
            parse_filter(self.user_id.as_deref(), "userId")?,
        ))
    }
}

/// GET /api/admin/orders
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<Json<Vec<OrderDetails>>> {
    let (date, user_id) = query.filters()?;
    let orders = OrderRepository::new(state.pool())
        .list_filtered(date, user_id)
        .await?;
    Ok(Json(orders))
}

/// POST /api/admin/orders
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn save_order(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(input): ApiJson<AdminOrderInput>,
) -> Result<(StatusCode, Json<OrderWithLunch>)> {
    let order = OrderingService::new(state.pool(), state.policy())
        .admin_save(&input, state.now())
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// DELETE /api/admin/orders
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete_order(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<DeleteRequest<OrderId>>,
) -> Result<StatusCode> {
    let Some(id) = req.id else {
        return Err(AppError::BadRequest("Missing fields: id is required".to_owned()));
    };
    OrderingService::new(state.pool(), state.policy())
        .admin_delete(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Report
// =============================================================================

/// Query of `GET /api/admin/report`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Validate a report range; both ends are required and inclusive.
pub(crate) fn report_range(query: &ReportQuery) -> Result<(NaiveDate, NaiveDate)> {
    let from: Option<NaiveDate> = parse_filter(query.from.as_deref(), "from date")?;
    let to: Option<NaiveDate> = parse_filter(query.to.as_deref(), "to date")?;
    match (from, to) {
        (Some(from), Some(to)) if from <= to => Ok((from, to)),
        (Some(_), Some(_)) => Err(AppError::BadRequest(
            "Invalid date range: from is after to".to_owned(),
        )),
        _ => Err(AppError::BadRequest("Missing date range".to_owned())),
    }
}

/// Render the CSV download response for `from..=to`.
pub(crate) async fn csv_response(state: &AppState, from: NaiveDate, to: NaiveDate) -> Result<Response> {
    let orders = OrderRepository::new(state.pool())
        .list_range(from, to)
        .await?;
    let guests = GuestOrderRepository::new(state.pool())
        .list_range(from, to)
        .await?;

    tracing::info!(%from, %to, orders = orders.len(), guests = guests.len(), "Report exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, CSV_DISPOSITION),
        ],
        build_csv(&orders, &guests),
    )
        .into_response())
}

/// GET /api/admin/report?from=&to=
#[instrument(skip(state, _admin))]
pub async fn report(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> Result<Response> {
    let (from, to) = report_range(&query)?;
    csv_response(&state, from, to).await
}

// =============================================================================
// Settings
// =============================================================================

/// Response of `POST /api/admin/settings`.
#[derive(Debug, Serialize)]
pub struct SaveSettingsResponse {
    pub success: bool,
}

/// GET /api/admin/settings
pub async fn get_settings(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<EmailSettings>> {
    Ok(Json(state.options().email_settings().await?))
}

/// POST /api/admin/settings
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn save_settings(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<EmailSettings>,
) -> Result<Json<SaveSettingsResponse>> {
    state
        .options()
        .save_email_settings(&req.sender, &req.recipient)
        .await?;
    Ok(Json(SaveSettingsResponse { success: true }))
}
