//! Deposit address allocation
//!
//! Fixed mode hands out the configured per-network address. Pool mode claims
//! the oldest unused pool row; the claim is a conditional update keyed on the
//! current status, so two concurrent creations can never both win the same
//! row. Callers run allocation inside the order-creation transaction; if the
//! order insert fails afterwards, the rollback releases the claim.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use thiserror::Error;

use crate::entities::{addresses, prelude::*};
use crate::services::settings::{DepositMode, StoreSettings};

pub const ADDRESS_UNUSED: &str = "unused";
pub const ADDRESS_ASSIGNED: &str = "assigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositSource {
    Fixed,
    Pool,
}

impl DepositSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositSource::Fixed => "fixed",
            DepositSource::Pool => "pool",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Allocation {
    pub address: String,
    pub source: DepositSource,
    pub pool_address_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum AllocError {
    /// Pool mode, no unused row left, and fallback is disabled.
    #[error("No deposit addresses available.")]
    Exhausted,
    /// The resolved address (fixed or pool) is absent or empty.
    #[error("Deposit address missing.")]
    MissingAddress,
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub async fn allocate<C: ConnectionTrait>(
    conn: &C,
    network: &str,
    settings: &StoreSettings,
) -> Result<Allocation, AllocError> {
    if settings.deposit_mode == DepositMode::Pool {
        if let Some(claimed) = claim_unused(conn, network).await? {
            if claimed.address.is_empty() {
                return Err(AllocError::MissingAddress);
            }
            return Ok(Allocation {
                address: claimed.address,
                source: DepositSource::Pool,
                pool_address_id: Some(claimed.id),
            });
        }
        if !settings.fallback_to_fixed {
            return Err(AllocError::Exhausted);
        }
        tracing::warn!(network, "address pool exhausted, falling back to fixed address");
    }

    let address = settings
        .fixed_address(network)
        .ok_or(AllocError::MissingAddress)?;
    Ok(Allocation {
        address: address.to_string(),
        source: DepositSource::Fixed,
        pool_address_id: None,
    })
}

/// Claims the oldest unused address for a network.
///
/// The select only nominates a candidate; ownership is decided by the
/// conditional update. A zero rows_affected means another creation won the
/// row first, so the loop nominates the next one.
pub async fn claim_unused<C: ConnectionTrait>(
    conn: &C,
    network: &str,
) -> Result<Option<addresses::Model>, DbErr> {
    loop {
        let candidate = Addresses::find()
            .filter(addresses::Column::Network.eq(network))
            .filter(addresses::Column::Status.eq(ADDRESS_UNUSED))
            .order_by_asc(addresses::Column::CreatedAt)
            .one(conn)
            .await?;

        let Some(candidate) = candidate else {
            return Ok(None);
        };

        let result = Addresses::update_many()
            .col_expr(addresses::Column::Status, Expr::value(ADDRESS_ASSIGNED))
            .filter(addresses::Column::Id.eq(candidate.id.clone()))
            .filter(addresses::Column::Status.eq(ADDRESS_UNUSED))
            .exec(conn)
            .await?;

        if result.rows_affected == 1 {
            return Ok(Some(candidate));
        }
        tracing::debug!(address_id = %candidate.id, "lost claim race, retrying");
    }
}

/// Records which order consumed a claimed pool address. Runs after the order
/// row exists, inside the same transaction as the claim.
pub async fn bind<C: ConnectionTrait>(
    conn: &C,
    address_id: &str,
    order_id: &str,
) -> Result<(), DbErr> {
    Addresses::update_many()
        .col_expr(
            addresses::Column::AssignedOrderId,
            Expr::value(order_id),
        )
        .filter(addresses::Column::Id.eq(address_id))
        .exec(conn)
        .await?;
    Ok(())
}
