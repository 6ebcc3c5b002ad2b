use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::orders;

/// Assets, networks and payout vocabulary accepted by the public surface.
/// Anything outside these lists is a validation failure, not a 500.
pub const SUPPORTED_ASSETS: &[&str] = &["BTC", "ETH", "USDT"];
pub const SUPPORTED_NETWORKS: &[&str] = &["BTC", "ERC20", "BEP20", "TRC20"];
pub const SUPPORTED_FIATS: &[&str] = &["USD", "INR", "EUR", "GBP"];
pub const PAYOUT_METHODS: &[&str] = &["Bank Transfer", "UPI", "Other"];

/// Workflow states of an order.
///
/// The happy path runs pending_deposit -> detecting -> confirming ->
/// payout_processing -> completed. `hold` and `rejected` are operator-set.
/// Operators may assign any state to any order; the server validates the
/// name only. Settlement is driven manually, not by a transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    PendingDeposit,
    Detecting,
    Confirming,
    PayoutProcessing,
    Completed,
    Hold,
    Rejected,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::PendingDeposit,
        OrderStatus::Detecting,
        OrderStatus::Confirming,
        OrderStatus::PayoutProcessing,
        OrderStatus::Completed,
        OrderStatus::Hold,
        OrderStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingDeposit => "pending_deposit",
            OrderStatus::Detecting => "detecting",
            OrderStatus::Confirming => "confirming",
            OrderStatus::PayoutProcessing => "payout_processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Hold => "hold",
            OrderStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<OrderStatus> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }

    /// completed and rejected lock the order against customer mutation.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub asset_symbol: String,
    pub network: String,
    pub amount_crypto: f64,
    pub fiat_currency: String,
    pub payout_method: String,
}

/// The only response that ever carries the token secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(rename = "publicId")]
    pub public_id: String,
    pub token: String,
}

/// Free-form payout fields plus the destination country.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutDetails {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub details: HashMap<String, String>,
}

/// Customer-facing order snapshot. Never includes the internal id or the
/// token secret; payout details arrive masked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub public_id: String,
    pub asset_symbol: String,
    pub network: String,
    pub amount_crypto: f64,
    pub fiat_currency: String,
    pub payout_method: String,
    pub payout_details: PayoutDetails,
    pub deposit_address: String,
    pub status: String,
    pub txid: Option<String>,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxidRequest {
    pub txid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayoutUpdateRequest {
    pub payout_method: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub details: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminOrderListQuery {
    pub status: Option<String>,
    pub network: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderSummary {
    pub id: String,
    pub public_id: String,
    pub status: String,
    pub asset_symbol: String,
    pub network: String,
    pub amount_crypto: f64,
    pub fiat_currency: String,
    pub txid: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<orders::Model> for AdminOrderSummary {
    fn from(order: orders::Model) -> Self {
        AdminOrderSummary {
            id: order.id,
            public_id: order.public_id,
            status: order.status,
            asset_symbol: order.asset_symbol,
            network: order.network,
            amount_crypto: order.amount_crypto,
            fiat_currency: order.fiat_currency,
            txid: order.txid,
            created_at: order.created_at,
        }
    }
}

/// Full row for the operator view, raw payout details included, since
/// settlement needs them.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderDetail {
    #[serde(flatten)]
    pub order: orders::Model,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminOrderUpdateRequest {
    pub status: String,
    pub confirmations_current: u32,
    pub payout_reference: Option<String>,
    pub admin_note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(!OrderStatus::Hold.is_terminal());
        assert!(!OrderStatus::PendingDeposit.is_terminal());
        assert!(!OrderStatus::PayoutProcessing.is_terminal());
    }
}
