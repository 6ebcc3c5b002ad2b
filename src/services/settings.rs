//! Store-wide settings
//!
//! The table is a flat key -> JSON-string map written by operators; this
//! module gives the rest of the crate a typed view with explicit defaults.
//! Settings are re-read on each request that needs them.

use std::collections::HashMap;

use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use serde_json::Value;

use crate::entities::{prelude::*, settings};

pub const KEY_DEPOSIT_MODE: &str = "deposit_mode";
pub const KEY_FALLBACK_TO_FIXED: &str = "fallback_to_fixed";
pub const KEY_FIXED_ADDRESSES: &str = "fixed_addresses";
pub const KEY_EXPLORER_TEMPLATES: &str = "explorer_templates";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositMode {
    Fixed,
    Pool,
}

/// Typed snapshot of the settings table.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub deposit_mode: DepositMode,
    pub fallback_to_fixed: bool,
    pub fixed_addresses: HashMap<String, String>,
    pub explorer_templates: HashMap<String, String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            deposit_mode: DepositMode::Fixed,
            fallback_to_fixed: true,
            fixed_addresses: HashMap::new(),
            explorer_templates: HashMap::new(),
        }
    }
}

impl StoreSettings {
    pub async fn load<C: ConnectionTrait>(conn: &C) -> Result<StoreSettings, DbErr> {
        Ok(StoreSettings::from_map(&raw_settings(conn).await?))
    }

    /// Unknown keys are ignored; missing or malformed keys fall back to the
    /// defaults (fixed mode, fallback enabled, empty maps).
    pub fn from_map(raw: &serde_json::Map<String, Value>) -> StoreSettings {
        let mut settings = StoreSettings::default();

        if let Some(Value::String(mode)) = raw.get(KEY_DEPOSIT_MODE) {
            if mode == "pool" {
                settings.deposit_mode = DepositMode::Pool;
            }
        }
        if let Some(Value::Bool(fallback)) = raw.get(KEY_FALLBACK_TO_FIXED) {
            settings.fallback_to_fixed = *fallback;
        }
        if let Some(value) = raw.get(KEY_FIXED_ADDRESSES) {
            settings.fixed_addresses = string_map(value);
        }
        if let Some(value) = raw.get(KEY_EXPLORER_TEMPLATES) {
            settings.explorer_templates = string_map(value);
        }

        settings
    }

    pub fn fixed_address(&self, network: &str) -> Option<&str> {
        self.fixed_addresses
            .get(network)
            .map(String::as_str)
            .filter(|address| !address.is_empty())
    }

    /// Substitutes `{txid}` into the network's explorer template. Absent
    /// template or absent txid both yield None.
    pub fn explorer_url(&self, network: &str, txid: Option<&str>) -> Option<String> {
        let template = self.explorer_templates.get(network)?;
        let txid = txid?;
        Some(template.replace("{txid}", txid))
    }
}

fn string_map(value: &Value) -> HashMap<String, String> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_str()
                    .map(|text| (key.clone(), text.to_string()))
            })
            .collect(),
        _ => HashMap::new(),
    }
}

/// The untyped map, as the admin settings screen sees it. Values that are
/// not valid JSON are passed through as plain strings.
pub async fn raw_settings<C: ConnectionTrait>(
    conn: &C,
) -> Result<serde_json::Map<String, Value>, DbErr> {
    let rows = Settings::find().all(conn).await?;
    let mut map = serde_json::Map::new();
    for row in rows {
        let value = serde_json::from_str(&row.value)
            .unwrap_or_else(|_| Value::String(row.value.clone()));
        map.insert(row.key, value);
    }
    Ok(map)
}

pub async fn upsert_settings<C: ConnectionTrait>(
    conn: &C,
    updates: &serde_json::Map<String, Value>,
) -> Result<(), DbErr> {
    for (key, value) in updates {
        let encoded = serde_json::to_string(value)
            .map_err(|e| DbErr::Custom(format!("unencodable setting {key}: {e}")))?;
        let row = settings::ActiveModel {
            key: Set(key.clone()),
            value: Set(encoded),
        };
        Settings::insert(row)
            .on_conflict(
                OnConflict::column(settings::Column::Key)
                    .update_column(settings::Column::Value)
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}
