//! Admin pages: today's overview, orders by day, users and email settings.
//!
//! Every handler takes [`RequireAdmin`]; non-admins are sent home with
//! `?error=admin_only`.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use lunch_order_core::{GuestOrderId, OrderId, UserId};

use super::{MessageQuery, bad_request_page, error_page};
use crate::db::{GuestOrderRepository, OrderRepository, RepositoryError, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{CurrentUser, GuestOrderDetails, OrderDetails, User};
use crate::services::{
    AuthError, AuthService, EmailSettings, GuestService, OrderingError, OrderingService,
    SettingsError,
};
use crate::state::AppState;

/// One user on the today overview.
#[derive(Debug, Clone)]
pub struct TodayRow {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub summary: Option<String>,
}

/// Join every user with their order for the day, if any.
pub(crate) fn today_rows(users: &[User], orders: &[OrderDetails]) -> Vec<TodayRow> {
    let by_user: HashMap<UserId, &OrderDetails> =
        orders.iter().map(|o| (o.user.id, o)).collect();
    users
        .iter()
        .map(|u| TodayRow {
            user_id: u.id.to_string(),
            username: u.username.clone(),
            email: u.email.to_string(),
            summary: by_user.get(&u.id).map(|o| o.summary()),
        })
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/today.html")]
pub struct TodayTemplate {
    pub user: Option<CurrentUser>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub iso: String,
    pub open_today: bool,
    pub rows: Vec<TodayRow>,
    pub guests: Vec<GuestOrderDetails>,
    pub ordered_count: usize,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub user: Option<CurrentUser>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub iso: String,
    pub orders: Vec<OrderDetails>,
    pub guests: Vec<GuestOrderDetails>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub user: Option<CurrentUser>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub users: Vec<User>,
    pub current_id: UserId,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/settings.html")]
pub struct SettingsTemplate {
    pub user: Option<CurrentUser>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub settings: EmailSettings,
}

/// `?date=` on the orders page, plus flash messages.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub date: Option<String>,
    #[serde(flatten)]
    pub message: MessageQuery,
}

/// Hidden `date` field on the delete forms.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    pub date: Option<String>,
}

/// Admin "add user" form.
#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub is_admin: Option<String>,
}

fn orders_url(date: Option<&str>, code: &str, kind: &str) -> String {
    match date.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()) {
        Some(d) => format!("/admin/orders?date={}&{kind}={code}", d.format("%Y-%m-%d")),
        None => format!("/admin/orders?{kind}={code}"),
    }
}

/// GET /admin
pub async fn index(RequireAdmin(_admin): RequireAdmin) -> Redirect {
    Redirect::to("/admin/today")
}

/// GET /admin/today
pub async fn today(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> Response {
    let now = state.now();
    let date = now.date();

    let loaded = async {
        let users = UserRepository::new(state.pool()).list_all().await?;
        let orders = OrderRepository::new(state.pool())
            .list_filtered(Some(date), None)
            .await?;
        let guests = GuestOrderRepository::new(state.pool()).list_on(date).await?;
        Ok::<_, RepositoryError>((users, orders, guests))
    }
    .await;

    let (users, orders, guests) = match loaded {
        Ok(data) => data,
        Err(e) => return error_page(Some(admin), &e.into()),
    };

    TodayTemplate {
        user: Some(admin),
        success: query.success(),
        error: query.error(),
        iso: date.format("%Y-%m-%d").to_string(),
        open_today: state.policy().is_open_today(now),
        rows: today_rows(&users, &orders),
        ordered_count: orders.len(),
        guests,
    }
    .into_response()
}

/// GET /admin/orders
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<OrdersQuery>,
) -> Response {
    let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => return bad_request_page(Some(admin), "date"),
        },
        None => state.today(),
    };

    let loaded = async {
        let orders = OrderRepository::new(state.pool())
            .list_filtered(Some(date), None)
            .await?;
        let guests = GuestOrderRepository::new(state.pool()).list_on(date).await?;
        Ok::<_, RepositoryError>((orders, guests))
    }
    .await;

    match loaded {
        Ok((orders, guests)) => OrdersTemplate {
            user: Some(admin),
            success: query.message.success(),
            error: query.message.error(),
            iso: date.format("%Y-%m-%d").to_string(),
            orders,
            guests,
        }
        .into_response(),
        Err(e) => error_page(Some(admin), &e.into()),
    }
}

/// POST /admin/orders/{id}/delete
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn delete_order(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Form(form): Form<DeleteForm>,
) -> Response {
    let result = OrderingService::new(state.pool(), state.policy())
        .admin_delete(id)
        .await;
    delete_redirect(admin, result, form.date.as_deref())
}

/// POST /admin/guest-orders/{id}/delete
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn delete_guest_order(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<GuestOrderId>,
    Form(form): Form<DeleteForm>,
) -> Response {
    let result = GuestService::new(state.pool(), state.options(), state.policy())
        .delete(id)
        .await;
    delete_redirect(admin, result, form.date.as_deref())
}

fn delete_redirect(
    admin: CurrentUser,
    result: Result<(), OrderingError>,
    date: Option<&str>,
) -> Response {
    match result {
        Ok(()) => Redirect::to(&orders_url(date, "order_deleted", "success")).into_response(),
        Err(OrderingError::NotFound) => {
            Redirect::to(&orders_url(date, "not_found", "error")).into_response()
        }
        Err(e) => error_page(Some(admin), &e.into()),
    }
}

/// GET /admin/users
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> Response {
    match UserRepository::new(state.pool()).list_all().await {
        Ok(users) => UsersTemplate {
            current_id: admin.id,
            user: Some(admin),
            success: query.success(),
            error: query.error(),
            users,
        }
        .into_response(),
        Err(e) => error_page(Some(admin), &e.into()),
    }
}

/// Message code for a failed user creation, if it is the user's fault.
const fn create_user_code(err: &AuthError) -> Option<&'static str> {
    match err {
        AuthError::EmailTaken => Some("email_taken"),
        AuthError::InvalidEmail(_) => Some("invalid_email"),
        AuthError::WeakPassword(_) => Some("weak_password"),
        AuthError::MissingUsername => Some("missing_username"),
        _ => None,
    }
}

/// POST /admin/users
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<CreateUserForm>,
) -> Response {
    let result = AuthService::new(state.pool())
        .create_user(
            &form.username,
            &form.email,
            &form.password,
            form.is_admin.is_some(),
        )
        .await;

    match result {
        Ok(_) => Redirect::to("/admin/users?success=user_created").into_response(),
        Err(e) => match create_user_code(&e) {
            Some(code) => Redirect::to(&format!("/admin/users?error={code}")).into_response(),
            None => error_page(Some(admin), &e.into()),
        },
    }
}

/// POST /admin/users/{id}/toggle-admin
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn toggle_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Response {
    if id == admin.id {
        return Redirect::to("/admin/users?error=self").into_response();
    }

    let users = UserRepository::new(state.pool());
    let result = async {
        let user = users.get_by_id(id).await?.ok_or(RepositoryError::NotFound)?;
        users.set_admin(id, !user.is_admin).await
    }
    .await;

    match result {
        Ok(user) => {
            tracing::info!(user_id = %id, is_admin = user.is_admin, "Admin flag changed");
            Redirect::to("/admin/users?success=user_updated").into_response()
        }
        Err(RepositoryError::NotFound) => {
            Redirect::to("/admin/users?error=not_found").into_response()
        }
        Err(e) => error_page(Some(admin), &e.into()),
    }
}

/// POST /admin/users/{id}/delete
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Response {
    if id == admin.id {
        return Redirect::to("/admin/users?error=self").into_response();
    }

    match UserRepository::new(state.pool()).delete(id).await {
        Ok(()) => {
            tracing::info!(user_id = %id, "User deleted");
            Redirect::to("/admin/users?success=user_deleted").into_response()
        }
        Err(RepositoryError::NotFound) => {
            Redirect::to("/admin/users?error=not_found").into_response()
        }
        Err(e) => error_page(Some(admin), &e.into()),
    }
}

/// GET /admin/settings
pub async fn settings(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> Response {
    match state.options().email_settings().await {
        Ok(settings) => SettingsTemplate {
            user: Some(admin),
            success: query.success(),
            error: query.error(),
            settings,
        }
        .into_response(),
        Err(e) => error_page(Some(admin), &e.into()),
    }
}

/// POST /admin/settings
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn save_settings(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<EmailSettings>,
) -> Response {
    match state
        .options()
        .save_email_settings(&form.sender, &form.recipient)
        .await
    {
        Ok(_) => Redirect::to("/admin/settings?success=settings_saved").into_response(),
        Err(e @ (SettingsError::InvalidSender(_) | SettingsError::InvalidRecipient(_))) => {
            let err = AppError::from(e);
            let page = SettingsTemplate {
                user: Some(admin),
                success: None,
                error: Some(err.public_message()),
                settings: form,
            };
            (err.status(), page).into_response()
        }
        Err(e) => error_page(Some(admin), &e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use lunch_order_core::{Email, LunchTypeId, Price};

    use super::*;
    use crate::models::{LunchType, Order, OrderWithLunch, UserSummary};

    fn user(id: i32, name: &str) -> User {
        User {
            id: UserId::new(id),
            username: name.to_owned(),
            email: Email::parse(&format!("{name}@example.com")).unwrap(),
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn order_for(u: &User) -> OrderDetails {
        let date = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        OrderDetails {
            order: OrderWithLunch {
                order: Order {
                    id: OrderId::new(1),
                    user_id: u.id,
                    lunch_type_id: LunchTypeId::new(1),
                    date,
                    customization: String::new(),
                    cold_type: None,
                    bread_type: None,
                    drink_type: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
                lunch_type: LunchType {
                    id: LunchTypeId::new(1),
                    name: "Warm".to_owned(),
                    price: Price::from_cents(430),
                },
            },
            user: UserSummary {
                id: u.id,
                username: u.username.clone(),
                email: u.email.clone(),
            },
        }
    }

    #[test]
    fn test_today_rows_join_users_with_orders() {
        let alice = user(1, "alice");
        let bob = user(2, "bob");
        let rows = today_rows(&[alice.clone(), bob], &[order_for(&alice)]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].summary.as_deref(), Some("Warm"));
        assert!(rows[1].summary.is_none());
        assert_eq!(rows[1].user_id, "2");
    }

    #[test]
    fn test_orders_url_keeps_valid_date() {
        assert_eq!(
            orders_url(Some("2025-06-04"), "order_deleted", "success"),
            "/admin/orders?date=2025-06-04&success=order_deleted"
        );
        assert_eq!(
            orders_url(Some("junk"), "not_found", "error"),
            "/admin/orders?error=not_found"
        );
    }

    #[test]
    fn test_create_user_codes() {
        assert_eq!(create_user_code(&AuthError::EmailTaken), Some("email_taken"));
        assert_eq!(create_user_code(&AuthError::PasswordHash), None);
    }
}
