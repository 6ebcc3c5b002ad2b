use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entities::{prelude::*, rates};
use crate::models::order::{SuccessResponse, SUPPORTED_ASSETS, SUPPORTED_FIATS, SUPPORTED_NETWORKS};
use crate::models::rate::{RateCreateRequest, RateDeleteRequest, RateUpdateRequest};
use crate::services::orders::OrderError;
use crate::AppState;

fn validate_terms(
    asset_symbol: &str,
    network: &str,
    fiat_currency: &str,
    buy_rate: f64,
    fee_pct: Option<f64>,
    fee_flat: Option<f64>,
) -> Result<(), OrderError> {
    let valid = SUPPORTED_ASSETS.contains(&asset_symbol)
        && SUPPORTED_NETWORKS.contains(&network)
        && SUPPORTED_FIATS.contains(&fiat_currency)
        && buy_rate.is_finite()
        && buy_rate > 0.0
        && fee_pct.is_none_or(|f| f.is_finite() && f >= 0.0)
        && fee_flat.is_none_or(|f| f.is_finite() && f >= 0.0);
    if valid {
        Ok(())
    } else {
        Err(OrderError::Validation("Invalid payload.".to_string()))
    }
}

pub async fn list_rates(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<rates::Model>>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let rows = Rates::find()
        .order_by_desc(rates::Column::UpdatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// Inserts a new rate row. History is kept; the resolver picks the newest
/// row per key.
pub async fn create_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RateCreateRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let Json(req) =
        body.map_err(|_| OrderError::Validation("Invalid payload.".to_string()))?;
    validate_terms(
        &req.asset_symbol,
        &req.network,
        &req.fiat_currency,
        req.buy_rate,
        req.fee_pct,
        req.fee_flat,
    )?;

    rates::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        asset_symbol: Set(req.asset_symbol),
        network: Set(req.network),
        fiat_currency: Set(req.fiat_currency),
        buy_rate: Set(req.buy_rate),
        fee_pct: Set(req.fee_pct),
        fee_flat: Set(req.fee_flat),
        updated_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&state.db)
    .await?;

    Ok(Json(SuccessResponse { success: true }))
}

pub async fn update_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RateUpdateRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let Json(req) =
        body.map_err(|_| OrderError::Validation("Invalid payload.".to_string()))?;
    validate_terms(
        &req.asset_symbol,
        &req.network,
        &req.fiat_currency,
        req.buy_rate,
        req.fee_pct,
        req.fee_flat,
    )?;

    Rates::update_many()
        .col_expr(rates::Column::AssetSymbol, Expr::value(req.asset_symbol))
        .col_expr(rates::Column::Network, Expr::value(req.network))
        .col_expr(rates::Column::FiatCurrency, Expr::value(req.fiat_currency))
        .col_expr(rates::Column::BuyRate, Expr::value(req.buy_rate))
        .col_expr(rates::Column::FeePct, Expr::value(req.fee_pct))
        .col_expr(rates::Column::FeeFlat, Expr::value(req.fee_flat))
        .col_expr(
            rates::Column::UpdatedAt,
            Expr::value(Utc::now().fixed_offset()),
        )
        .filter(rates::Column::Id.eq(req.id))
        .exec(&state.db)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

pub async fn delete_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RateDeleteRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let Json(req) =
        body.map_err(|_| OrderError::Validation("Invalid payload.".to_string()))?;
    Rates::delete_many()
        .filter(rates::Column::Id.eq(req.id))
        .exec(&state.db)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}
