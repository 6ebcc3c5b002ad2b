//! SeaORM Entity for the orders table
//!
//! One row per settlement order. The rate columns are a snapshot taken at
//! creation and are never re-resolved from the rates table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub public_id: String,
    pub token_secret: String,
    pub asset_symbol: String,
    pub network: String,
    pub amount_crypto: f64,
    pub fiat_currency: String,
    pub buy_rate: f64,
    pub fee_pct: f64,
    pub fee_flat: f64,
    pub payout_method: String,
    pub payout_details_json: String,
    pub deposit_address: String,
    pub deposit_source: String,
    pub deposit_pool_address_id: Option<String>,
    pub txid: Option<String>,
    pub status: String,
    pub confirmations_required: i32,
    pub confirmations_current: i32,
    pub payout_reference: Option<String>,
    pub admin_note: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
