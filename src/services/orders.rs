//! Order engine
//!
//! Composes the rate resolver, address allocator and token authority into
//! order creation, and applies the customer/operator mutation rules. All
//! business failures surface as `OrderError` and are mapped to HTTP at this
//! boundary; raw storage errors never reach a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{orders, prelude::*};
use crate::models::order::{
    AdminOrderDetail, AdminOrderListQuery, AdminOrderSummary, AdminOrderUpdateRequest,
    CreateOrderRequest, CreateOrderResponse, ErrorResponse, OrderStatus, OrderView,
    PayoutDetails, PayoutUpdateRequest, PAYOUT_METHODS, SUPPORTED_ASSETS, SUPPORTED_FIATS,
    SUPPORTED_NETWORKS,
};
use crate::services::allocator::{self, AllocError};
use crate::services::masks;
use crate::services::rates::resolve as resolve_rate;
use crate::services::settings::StoreSettings;
use crate::services::tokens;

const EMPTY_PAYOUT_DETAILS: &str = r#"{"country":"","details":{}}"#;
const MIN_TXID_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),
    #[error("Rate missing for this pair.")]
    RateMissing,
    #[error("{0}")]
    AddressUnavailable(AllocError),
    #[error("Unauthorized.")]
    Unauthorized,
    #[error("Order not found.")]
    NotFound,
    #[error("Order locked.")]
    OrderLocked,
    #[error("Too many requests. Please wait.")]
    Throttled,
    #[error("Database error.")]
    Storage(#[from] DbErr),
}

impl From<AllocError> for OrderError {
    fn from(err: AllocError) -> Self {
        match err {
            AllocError::Db(err) => OrderError::Storage(err),
            other => OrderError::AddressUnavailable(other),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        if let OrderError::Storage(err) = &self {
            tracing::error!(error = %err, "storage failure");
        }
        let status = match &self {
            OrderError::Validation(_)
            | OrderError::RateMissing
            | OrderError::AddressUnavailable(_)
            | OrderError::OrderLocked => StatusCode::BAD_REQUEST,
            OrderError::Unauthorized => StatusCode::UNAUTHORIZED,
            OrderError::NotFound => StatusCode::NOT_FOUND,
            OrderError::Throttled => StatusCode::TOO_MANY_REQUESTS,
            OrderError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

fn invalid_request() -> OrderError {
    OrderError::Validation("Invalid request.".to_string())
}

fn invalid_payload() -> OrderError {
    OrderError::Validation("Invalid payload.".to_string())
}

fn validate_create(req: &CreateOrderRequest) -> Result<(), OrderError> {
    let valid = SUPPORTED_ASSETS.contains(&req.asset_symbol.as_str())
        && SUPPORTED_NETWORKS.contains(&req.network.as_str())
        && SUPPORTED_FIATS.contains(&req.fiat_currency.as_str())
        && PAYOUT_METHODS.contains(&req.payout_method.as_str())
        && req.amount_crypto.is_finite()
        && req.amount_crypto > 0.0;
    if valid {
        Ok(())
    } else {
        Err(invalid_request())
    }
}

/// Creates an order: rate snapshot, deposit address, fresh token pair.
///
/// The pool claim, the order insert and the assigned_order_id bind all run
/// in one transaction, so a failure at any step releases the claim.
pub async fn create_order(
    db: &DatabaseConnection,
    req: CreateOrderRequest,
    client_ip: Option<String>,
) -> Result<CreateOrderResponse, OrderError> {
    validate_create(&req)?;

    let rate = resolve_rate(db, &req.asset_symbol, &req.network, &req.fiat_currency)
        .await?
        .ok_or(OrderError::RateMissing)?;
    let settings = StoreSettings::load(db).await?;

    let txn = db.begin().await?;

    let allocation = allocator::allocate(&txn, &req.network, &settings).await?;

    let order_id = Uuid::new_v4().to_string();
    let public_id = tokens::mint_public_id();
    let token_secret = tokens::mint_token_secret();
    let now = Utc::now().fixed_offset();

    orders::ActiveModel {
        id: Set(order_id.clone()),
        public_id: Set(public_id.clone()),
        token_secret: Set(token_secret.clone()),
        asset_symbol: Set(req.asset_symbol),
        network: Set(req.network.clone()),
        amount_crypto: Set(req.amount_crypto),
        fiat_currency: Set(req.fiat_currency),
        buy_rate: Set(rate.buy_rate),
        fee_pct: Set(rate.fee_pct.unwrap_or(0.0)),
        fee_flat: Set(rate.fee_flat.unwrap_or(0.0)),
        payout_method: Set(req.payout_method),
        payout_details_json: Set(EMPTY_PAYOUT_DETAILS.to_string()),
        deposit_address: Set(allocation.address),
        deposit_source: Set(allocation.source.as_str().to_string()),
        deposit_pool_address_id: Set(allocation.pool_address_id.clone()),
        txid: Set(None),
        status: Set(OrderStatus::PendingDeposit.as_str().to_string()),
        confirmations_required: Set(1),
        confirmations_current: Set(0),
        payout_reference: Set(None),
        admin_note: Set(None),
        ip_address: Set(client_ip),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    if let Some(pool_address_id) = &allocation.pool_address_id {
        allocator::bind(&txn, pool_address_id, &order_id).await?;
    }

    txn.commit().await?;

    tracing::info!(%public_id, network = %req.network, "order created");

    Ok(CreateOrderResponse {
        public_id,
        token: token_secret,
    })
}

/// Resolves an order from its public id and token. A missing order and a
/// wrong token are indistinguishable to the caller.
async fn authorize(
    db: &DatabaseConnection,
    public_id: &str,
    token: Option<&str>,
) -> Result<orders::Model, OrderError> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or(OrderError::Unauthorized)?;

    let order = Orders::find()
        .filter(orders::Column::PublicId.eq(public_id))
        .one(db)
        .await?;

    match order {
        Some(order) if tokens::token_matches(token, &order.token_secret) => Ok(order),
        _ => Err(OrderError::NotFound),
    }
}

pub async fn read_order(
    db: &DatabaseConnection,
    public_id: &str,
    token: Option<&str>,
) -> Result<OrderView, OrderError> {
    let order = authorize(db, public_id, token).await?;
    let settings = StoreSettings::load(db).await?;
    let explorer_url = settings.explorer_url(&order.network, order.txid.as_deref());

    let mut payout_details: PayoutDetails =
        serde_json::from_str(&order.payout_details_json).unwrap_or_default();
    payout_details.details = masks::mask_payout_details(&payout_details.details);

    Ok(OrderView {
        public_id: order.public_id,
        asset_symbol: order.asset_symbol,
        network: order.network,
        amount_crypto: order.amount_crypto,
        fiat_currency: order.fiat_currency,
        payout_method: order.payout_method,
        payout_details,
        deposit_address: order.deposit_address,
        status: order.status,
        txid: order.txid,
        explorer_url,
    })
}

/// Stores the customer-reported transaction hash exactly as submitted and
/// forces the workflow to `detecting`. Resubmission moves an order back to
/// `detecting` even after an operator advanced it; operators re-advance
/// manually. Terminal orders refuse the edit.
pub async fn submit_txid(
    db: &DatabaseConnection,
    public_id: &str,
    token: Option<&str>,
    txid: &str,
) -> Result<(), OrderError> {
    let order = authorize(db, public_id, token).await?;

    if txid.len() < MIN_TXID_LEN {
        return Err(invalid_payload());
    }
    if OrderStatus::parse(&order.status).is_some_and(OrderStatus::is_terminal) {
        return Err(OrderError::OrderLocked);
    }

    let mut active: orders::ActiveModel = order.into();
    active.txid = Set(Some(txid.to_string()));
    active.status = Set(OrderStatus::Detecting.as_str().to_string());
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(db).await?;

    Ok(())
}

pub async fn update_payout(
    db: &DatabaseConnection,
    public_id: &str,
    token: Option<&str>,
    req: PayoutUpdateRequest,
) -> Result<(), OrderError> {
    let order = authorize(db, public_id, token).await?;

    if !PAYOUT_METHODS.contains(&req.payout_method.as_str()) {
        return Err(invalid_payload());
    }
    if OrderStatus::parse(&order.status).is_some_and(OrderStatus::is_terminal) {
        return Err(OrderError::OrderLocked);
    }

    let details = PayoutDetails {
        country: req.country,
        details: req.details,
    };
    let encoded = serde_json::to_string(&details).map_err(|_| invalid_payload())?;

    let mut active: orders::ActiveModel = order.into();
    active.payout_method = Set(req.payout_method);
    active.payout_details_json = Set(encoded);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(db).await?;

    Ok(())
}

pub async fn admin_list_orders(
    db: &DatabaseConnection,
    query: &AdminOrderListQuery,
) -> Result<Vec<AdminOrderSummary>, OrderError> {
    let mut find = Orders::find();
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        find = find.filter(orders::Column::Status.eq(status));
    }
    if let Some(network) = query.network.as_deref().filter(|s| !s.is_empty()) {
        find = find.filter(orders::Column::Network.eq(network));
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        find = find.filter(
            Condition::any()
                .add(orders::Column::PublicId.contains(search))
                .add(orders::Column::Txid.contains(search)),
        );
    }

    let rows = find
        .order_by_desc(orders::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(AdminOrderSummary::from).collect())
}

pub async fn admin_get_order(
    db: &DatabaseConnection,
    id: &str,
) -> Result<AdminOrderDetail, OrderError> {
    let order = Orders::find_by_id(id)
        .one(db)
        .await?
        .ok_or(OrderError::NotFound)?;
    let settings = StoreSettings::load(db).await?;
    let explorer_url = settings.explorer_url(&order.network, order.txid.as_deref());
    Ok(AdminOrderDetail {
        order,
        explorer_url,
    })
}

/// Operator status assignment. Only the status name is validated; there is
/// deliberately no transition graph, since settlement is driven by humans.
pub async fn admin_update_order(
    db: &DatabaseConnection,
    id: &str,
    req: &AdminOrderUpdateRequest,
) -> Result<(), OrderError> {
    let status = OrderStatus::parse(&req.status).ok_or_else(invalid_payload)?;
    let confirmations =
        i32::try_from(req.confirmations_current).map_err(|_| invalid_payload())?;

    let order = Orders::find_by_id(id)
        .one(db)
        .await?
        .ok_or(OrderError::NotFound)?;

    let mut active: orders::ActiveModel = order.into();
    active.status = Set(status.as_str().to_string());
    active.confirmations_current = Set(confirmations);
    active.payout_reference = Set(req.payout_reference.clone());
    active.admin_note = Set(req.admin_note.clone());
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(db).await?;

    Ok(())
}
