//! A user's own orders and guest orders.

use std::collections::BTreeMap;

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use super::ApiJson;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{GuestOrder, OrderView, OrderWithLunch};
use crate::services::{GuestOrderInput, GuestService, OrderInput, OrderingService};
use crate::state::AppState;

/// GET /api/orders
///
/// The user's orders keyed by week number.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<BTreeMap<u32, Vec<OrderView>>>> {
    let orders = OrderingService::new(state.pool(), state.policy())
        .list_grouped(user.id, state.now())
        .await?;
    Ok(Json(orders))
}

/// POST /api/orders
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<OrderInput>,
) -> Result<(StatusCode, Json<OrderWithLunch>)> {
    let order = OrderingService::new(state.pool(), state.policy())
        .place_order(user.id, &input, state.now())
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT /api/orders
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<OrderInput>,
) -> Result<Json<OrderWithLunch>> {
    let order = OrderingService::new(state.pool(), state.policy())
        .edit_order(user.id, &input, state.now())
        .await?;
    Ok(Json(order))
}

/// POST /api/guest-orders
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn create_guest(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<GuestOrderInput>,
) -> Result<(StatusCode, Json<GuestOrder>)> {
    let order = GuestService::new(state.pool(), state.options(), state.policy())
        .place_guest_order(user.id, &input, state.now())
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
