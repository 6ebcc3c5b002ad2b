use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value;

use crate::models::order::SuccessResponse;
use crate::services::orders::OrderError;
use crate::services::settings;
use crate::AppState;

pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let raw = settings::raw_settings(&state.db).await?;
    Ok(Json(Value::Object(raw)))
}

/// Partial upsert: only the keys present in the body are written.
pub async fn patch_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SuccessResponse>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let Json(value) =
        body.map_err(|_| OrderError::Validation("Invalid payload.".to_string()))?;
    let Value::Object(updates) = value else {
        return Err(OrderError::Validation("Invalid payload.".to_string()));
    };
    settings::upsert_settings(&state.db, &updates).await?;
    Ok(Json(SuccessResponse { success: true }))
}
