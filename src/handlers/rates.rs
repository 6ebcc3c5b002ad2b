use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::models::order::ErrorResponse;
use crate::models::rate::{RateQuery, RateResponse};
use crate::services::rates;
use crate::AppState;

/// Public estimator: latest rate for an (asset, network, fiat) triple, with
/// an advisory quote breakdown when an amount is supplied. The figures the
/// customer ultimately gets are the snapshot on the order, not this.
pub async fn get_rate(
    State(state): State<AppState>,
    Query(query): Query<RateQuery>,
) -> Result<Json<RateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (Some(asset), Some(network), Some(fiat)) =
        (query.asset, query.network, query.fiat)
    else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing parameters.".to_string(),
            }),
        ));
    };

    let rate = rates::resolve(&state.db, &asset, &network, &fiat)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "rate lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Database error.".to_string(),
                }),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Rate unavailable.".to_string(),
                }),
            )
        })?;

    let quote = query
        .amount
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .map(|amount| rates::quote(amount, rate.buy_rate, rate.fee_pct, rate.fee_flat));

    Ok(Json(RateResponse {
        id: rate.id,
        asset_symbol: rate.asset_symbol,
        network: rate.network,
        fiat_currency: rate.fiat_currency,
        buy_rate: rate.buy_rate,
        fee_pct: rate.fee_pct,
        fee_flat: rate.fee_flat,
        updated_at: rate.updated_at,
        quote,
    }))
}
