// Shared between the integration test binaries; not every binary uses
// every helper.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use offramp_backend::entities::{addresses, rates};
use offramp_backend::services::admin::AdminGate;
use offramp_backend::services::rate_limit::RateLimiter;
use offramp_backend::services::settings::upsert_settings;
use offramp_backend::{router, AppState};

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Set up an in-memory test database with the schema applied.
/// A single pooled connection keeps every query on the same database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_app(db: DatabaseConnection) -> Router {
    router(AppState {
        db,
        limiter: RateLimiter::new(),
        admin: AdminGate::new(Some(ADMIN_TOKEN.to_string())),
    })
}

pub async fn seed_settings(db: &DatabaseConnection, settings: Value) {
    let updates = settings.as_object().cloned().expect("settings literal");
    upsert_settings(db, &updates)
        .await
        .expect("settings seed should succeed");
}

/// Inserts a rate row dated `age_secs` in the past, so tests can control
/// which row is newest.
#[allow(dead_code)]
pub async fn seed_rate(
    db: &DatabaseConnection,
    asset: &str,
    network: &str,
    fiat: &str,
    buy_rate: f64,
    fee_pct: Option<f64>,
    fee_flat: Option<f64>,
    age_secs: i64,
) {
    rates::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        asset_symbol: Set(asset.to_string()),
        network: Set(network.to_string()),
        fiat_currency: Set(fiat.to_string()),
        buy_rate: Set(buy_rate),
        fee_pct: Set(fee_pct),
        fee_flat: Set(fee_flat),
        updated_at: Set((Utc::now() - Duration::seconds(age_secs)).fixed_offset()),
    }
    .insert(db)
    .await
    .expect("rate seed should succeed");
}

/// Inserts an unused pool address dated `age_secs` in the past and returns
/// its id.
#[allow(dead_code)]
pub async fn seed_pool_address(
    db: &DatabaseConnection,
    network: &str,
    address: &str,
    age_secs: i64,
) -> String {
    let id = Uuid::new_v4().to_string();
    addresses::ActiveModel {
        id: Set(id.clone()),
        network: Set(network.to_string()),
        address: Set(address.to_string()),
        status: Set("unused".to_string()),
        assigned_order_id: Set(None),
        created_at: Set((Utc::now() - Duration::seconds(age_secs)).fixed_offset()),
    }
    .insert(db)
    .await
    .expect("address seed should succeed");
    id
}

/// Fires one request at the router and decodes the JSON body (Null when
/// the body is empty or not JSON).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
    forwarded_for: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body), None, None).await
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, None, None).await
}

pub async fn patch_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "PATCH", uri, Some(body), None, None).await
}

#[allow(dead_code)]
pub async fn admin_get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, Some(ADMIN_TOKEN), None).await
}

#[allow(dead_code)]
pub async fn admin_patch(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "PATCH", uri, Some(body), Some(ADMIN_TOKEN), None).await
}
