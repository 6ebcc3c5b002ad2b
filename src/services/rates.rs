//! Buy-rate resolution and the advisory quote
//!
//! The rates table keeps history; only the most recently updated row for an
//! (asset, network, fiat) triple is authoritative. Quote math here feeds the
//! public estimator; the numbers that matter are snapshotted onto the order
//! at creation.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{prelude::*, rates};
use crate::models::rate::QuoteBreakdown;

pub async fn resolve<C: ConnectionTrait>(
    conn: &C,
    asset_symbol: &str,
    network: &str,
    fiat_currency: &str,
) -> Result<Option<rates::Model>, DbErr> {
    Rates::find()
        .filter(rates::Column::AssetSymbol.eq(asset_symbol))
        .filter(rates::Column::Network.eq(network))
        .filter(rates::Column::FiatCurrency.eq(fiat_currency))
        .order_by_desc(rates::Column::UpdatedAt)
        .one(conn)
        .await
}

/// gross = amount * rate, fee = pct * gross + flat, payout floored at zero.
pub fn quote(amount_crypto: f64, buy_rate: f64, fee_pct: Option<f64>, fee_flat: Option<f64>) -> QuoteBreakdown {
    let gross = amount_crypto * buy_rate;
    let fee = fee_pct.unwrap_or(0.0) * gross + fee_flat.unwrap_or(0.0);
    QuoteBreakdown {
        gross,
        fee,
        payout: (gross - fee).max(0.0),
    }
}
