use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct RateQuery {
    pub asset: Option<String>,
    pub network: Option<String>,
    pub fiat: Option<String>,
    pub amount: Option<f64>,
}

/// Advisory estimator numbers. The authoritative figures are the snapshot
/// stored on the order at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    pub gross: f64,
    pub fee: f64,
    pub payout: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateResponse {
    pub id: String,
    pub asset_symbol: String,
    pub network: String,
    pub fiat_currency: String,
    pub buy_rate: f64,
    pub fee_pct: Option<f64>,
    pub fee_flat: Option<f64>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteBreakdown>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateCreateRequest {
    pub asset_symbol: String,
    pub network: String,
    pub fiat_currency: String,
    pub buy_rate: f64,
    pub fee_pct: Option<f64>,
    pub fee_flat: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateUpdateRequest {
    pub id: String,
    pub asset_symbol: String,
    pub network: String,
    pub fiat_currency: String,
    pub buy_rate: f64,
    pub fee_pct: Option<f64>,
    pub fee_flat: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateDeleteRequest {
    pub id: String,
}
