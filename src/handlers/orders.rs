use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::models::order::{
    CreateOrderRequest, CreateOrderResponse, OrderView, PayoutUpdateRequest, SuccessResponse,
    TxidRequest,
};
use crate::services::orders::{self as engine, OrderError};
use crate::AppState;

/// The capability token rides along as `?t=` on every customer request.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub t: Option<String>,
}

impl TokenQuery {
    fn token(&self) -> Option<&str> {
        self.t.as_deref().filter(|t| !t.is_empty())
    }
}

/// First hop of CF-Connecting-IP / X-Forwarded-For, same as the edge saw it.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("cf-connecting-ip")
        .or_else(|| headers.get("x-forwarded-for"))?;
    let first = forwarded.to_str().ok()?.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), OrderError> {
    let ip = client_ip(&headers);
    if !state.limiter.allow(ip.as_deref()) {
        return Err(OrderError::Throttled);
    }

    let Json(req) =
        body.map_err(|_| OrderError::Validation("Invalid request.".to_string()))?;
    let created = engine::create_order(&state.db, req, ip).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<OrderView>, OrderError> {
    let view = engine::read_order(&state.db, &public_id, query.token()).await?;
    Ok(Json(view))
}

pub async fn submit_txid(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    Query(query): Query<TokenQuery>,
    body: Result<Json<TxidRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, OrderError> {
    if query.token().is_none() {
        return Err(OrderError::Unauthorized);
    }
    let Json(req) =
        body.map_err(|_| OrderError::Validation("Invalid payload.".to_string()))?;
    engine::submit_txid(&state.db, &public_id, query.token(), &req.txid).await?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn update_payout(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    Query(query): Query<TokenQuery>,
    body: Result<Json<PayoutUpdateRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, OrderError> {
    if query.token().is_none() {
        return Err(OrderError::Unauthorized);
    }
    let Json(req) =
        body.map_err(|_| OrderError::Validation("Invalid payload.".to_string()))?;
    engine::update_payout(&state.db, &public_id, query.token(), req).await?;
    Ok(Json(SuccessResponse { success: true }))
}
