//! JSON API.
//!
//! Field names are camelCase. Errors are `{"error": "..."}` with the status
//! from [`AppError`].

pub mod admin;
pub mod options;
pub mod orders;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{
        FromRequest, FromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
    routing::get,
};

use crate::error::AppError;
use crate::state::AppState;

/// `Cache-Control` for option lists that change rarely.
pub const OPTIONS_CACHE_CONTROL: &str = "public, max-age=3600";

/// JSON body extractor whose rejections are 400 `{"error": ...}` responses.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Query-string extractor whose rejections are 400 `{"error": ...}` responses.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Parse an optional query value. Absent and blank both mean "no filter".
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming `what` if a non-blank value
/// doesn't parse.
pub(crate) fn parse_filter<T: FromStr>(value: Option<&str>, what: &str) -> Result<Option<T>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid {what}"))),
        None => Ok(None),
    }
}

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lunch-types", get(options::lunch_types))
        .route("/cold-options", get(options::cold_options))
        .route("/bread-options", get(options::bread_options))
        .route("/drink-options", get(options::drink_options))
        .route(
            "/parameters",
            get(options::list_parameters).post(options::save_parameter),
        )
        .route(
            "/orders",
            get(orders::list)
                .post(orders::create)
                .put(orders::update),
        )
        .route("/guest-orders", axum::routing::post(orders::create_guest))
        .nest("/admin", admin::router())
}
