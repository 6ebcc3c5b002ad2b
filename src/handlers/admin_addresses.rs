use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entities::{addresses, prelude::*};
use crate::models::address::{AddressDeleteRequest, AddressUploadRequest};
use crate::models::order::{SuccessResponse, SUPPORTED_NETWORKS};
use crate::services::allocator::ADDRESS_UNUSED;
use crate::services::orders::OrderError;
use crate::AppState;

const MIN_ADDRESS_LEN: usize = 8;

pub async fn list_addresses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<addresses::Model>>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let rows = Addresses::find()
        .order_by_desc(addresses::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// Accepts a single `{network, address}` entry or a bulk
/// `{network, addresses: []}` upload. Re-uploaded addresses are ignored
/// rather than duplicated.
pub async fn upload_addresses(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<AddressUploadRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let Json(req) =
        body.map_err(|_| OrderError::Validation("Invalid payload.".to_string()))?;

    let (network, entries) = match req {
        AddressUploadRequest::Single { network, address } => (network, vec![address]),
        AddressUploadRequest::Bulk { network, addresses } => (network, addresses),
    };

    if !SUPPORTED_NETWORKS.contains(&network.as_str())
        || entries.iter().any(|a| a.len() < MIN_ADDRESS_LEN)
    {
        return Err(OrderError::Validation("Invalid payload.".to_string()));
    }

    let now = Utc::now().fixed_offset();
    for address in entries {
        let row = addresses::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            network: Set(network.clone()),
            address: Set(address),
            status: Set(ADDRESS_UNUSED.to_string()),
            assigned_order_id: Set(None),
            created_at: Set(now),
        };
        Addresses::insert(row)
            .on_conflict(
                OnConflict::column(addresses::Column::Address)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&state.db)
            .await?;
    }

    Ok(Json(SuccessResponse { success: true }))
}

pub async fn delete_address(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<AddressDeleteRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, OrderError> {
    if !state.admin.authorized(&headers) {
        return Err(OrderError::Unauthorized);
    }
    let Json(req) =
        body.map_err(|_| OrderError::Validation("Invalid payload.".to_string()))?;
    Addresses::delete_many()
        .filter(addresses::Column::Id.eq(req.id))
        .exec(&state.db)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}
