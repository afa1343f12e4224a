//! Menu option lists and the parameters table.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use super::{ApiJson, OPTIONS_CACHE_CONTROL};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Parameter;
use crate::state::AppState;

fn cached<T: serde::Serialize>(body: T) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, OPTIONS_CACHE_CONTROL)], Json(body))
}

/// GET /api/lunch-types
pub async fn lunch_types(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(cached(state.options().lunch_types().await?))
}

/// GET /api/cold-options
pub async fn cold_options(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(cached(state.options().cold_options().await?))
}

/// GET /api/bread-options
pub async fn bread_options(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(cached(state.options().bread_options().await?))
}

/// GET /api/drink-options
pub async fn drink_options(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(cached(state.options().drink_options().await?))
}

/// GET /api/parameters
pub async fn list_parameters(State(state): State<AppState>) -> Result<Json<Vec<Parameter>>> {
    Ok(Json(state.options().parameters().await?))
}

/// Body of `POST /api/parameters`.
#[derive(Debug, Deserialize)]
pub struct SaveParameterRequest {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl SaveParameterRequest {
    /// Key and value; a blank key or value counts as missing.
    fn fields(&self) -> Result<(&str, &str)> {
        let key = self.key.as_deref().map(str::trim).unwrap_or_default();
        let value = self.value.as_deref().unwrap_or_default();
        if key.is_empty() || value.trim().is_empty() {
            return Err(AppError::BadRequest("Missing key or value".to_owned()));
        }
        Ok((key, value))
    }
}

/// POST /api/parameters
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn save_parameter(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<SaveParameterRequest>,
) -> Result<(StatusCode, Json<Parameter>)> {
    let (key, value) = req.fields()?;
    let parameter = state.options().set_parameter(key, value).await?;
    Ok((StatusCode::CREATED, Json(parameter)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(key: Option<&str>, value: Option<&str>) -> SaveParameterRequest {
        SaveParameterRequest {
            key: key.map(str::to_owned),
            value: value.map(str::to_owned),
        }
    }

    #[test]
    fn test_parameter_fields_trim_key() {
        let req = request(Some(" guest_price "), Some("12.50"));
        assert_eq!(req.fields().unwrap(), ("guest_price", "12.50"));
    }

    #[test]
    fn test_parameter_fields_reject_blank_value() {
        for req in [
            request(Some("guest_price"), Some("")),
            request(Some("guest_price"), Some("   ")),
            request(Some("guest_price"), None),
            request(Some(""), Some("12.50")),
            request(None, Some("12.50")),
        ] {
            assert!(matches!(
                req.fields(),
                Err(AppError::BadRequest(msg)) if msg == "Missing key or value"
            ));
        }
    }
}
