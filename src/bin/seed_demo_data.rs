//! Seeds demo settings and rates so a fresh deployment can take orders.
//!
//! Run once after pointing DATABASE_URL at the target database. Existing
//! settings keys are overwritten; rates are appended (the resolver always
//! picks the newest row per key).

use std::env;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Database, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use uuid::Uuid;

use offramp_backend::entities::rates;
use offramp_backend::services::settings::upsert_settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let db = Database::connect(env::var("DATABASE_URL")?).await?;
    migration::Migrator::up(&db, None).await?;

    let settings = json!({
        "deposit_mode": "fixed",
        "fallback_to_fixed": true,
        "fixed_addresses": {
            "BTC": "bc1qexamplebtcaddress",
            "ERC20": "0xExampleEthAddress",
            "BEP20": "0xExampleBscAddress",
            "TRC20": "TExampleTronAddress"
        },
        "explorer_templates": {
            "BTC": "https://www.blockchain.com/explorer/transactions/btc/{txid}",
            "ERC20": "https://etherscan.io/tx/{txid}",
            "BEP20": "https://bscscan.com/tx/{txid}",
            "TRC20": "https://tronscan.org/#/transaction/{txid}"
        }
    });
    let updates = settings.as_object().cloned().expect("settings literal is an object");
    upsert_settings(&db, &updates).await?;
    println!("Seeded {} settings keys", updates.len());

    let demo_rates = [
        ("BTC", "BTC", "USD", 64000.0, Some(0.01), Some(0.0)),
        ("ETH", "ERC20", "USD", 3100.0, Some(0.01), Some(0.0)),
        ("USDT", "TRC20", "USD", 1.0, Some(0.005), Some(1.0)),
        ("USDT", "BEP20", "INR", 83.0, Some(0.005), Some(50.0)),
    ];

    let now = Utc::now().fixed_offset();
    for (asset, network, fiat, buy_rate, fee_pct, fee_flat) in demo_rates {
        rates::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            asset_symbol: Set(asset.to_string()),
            network: Set(network.to_string()),
            fiat_currency: Set(fiat.to_string()),
            buy_rate: Set(buy_rate),
            fee_pct: Set(fee_pct),
            fee_flat: Set(fee_flat),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;
        println!("Seeded rate {asset}/{network} -> {fiat} @ {buy_rate}");
    }

    Ok(())
}
