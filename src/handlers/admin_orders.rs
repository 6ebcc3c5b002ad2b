use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::models::order::{
    AdminOrderDetail, AdminOrderListQuery, AdminOrderSummary, AdminOrderUpdateRequest,
    SuccessResponse,
};
use crate::services::orders::{self as engine, OrderError};
use crate::AppState;

pub async fn list_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminOrderListQuery>,
) -> Result<Json<Vec<AdminOrderSummary>>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let orders = engine::admin_list_orders(&state.db, &query).await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<AdminOrderDetail>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let detail = engine::admin_get_order(&state.db, &id).await?;
    Ok(Json(detail))
}

pub async fn update_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<AdminOrderUpdateRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let Json(req) =
        body.map_err(|_| OrderError::Validation("Invalid payload.".to_string()))?;
    engine::admin_update_order(&state.db, &id, &req).await?;
    Ok(Json(SuccessResponse { success: true }))
}
