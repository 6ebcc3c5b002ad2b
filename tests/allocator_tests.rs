mod common;

use axum::http::StatusCode;
use axum::Router;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::{json, Value};

use offramp_backend::entities::prelude::*;
use offramp_backend::services::allocator;

use crate::common::*;

fn pool_settings(fallback: bool) -> Value {
    json!({
        "deposit_mode": "pool",
        "fallback_to_fixed": fallback,
        "fixed_addresses": {"BTC": "bc1qfallbackfixed"}
    })
}

fn order_body() -> Value {
    json!({
        "asset_symbol": "BTC",
        "network": "BTC",
        "amount_crypto": 0.25,
        "fiat_currency": "USD",
        "payout_method": "Bank Transfer"
    })
}

async fn setup_pool_app(fallback: bool) -> (DatabaseConnection, Router) {
    let db = setup_test_db().await.expect("test db should connect");
    seed_settings(&db, pool_settings(fallback)).await;
    seed_rate(&db, "BTC", "BTC", "USD", 64000.0, None, None, 100).await;
    let app = test_app(db.clone());
    (db, app)
}

#[tokio::test]
async fn test_concurrent_pool_creates_assign_distinct_addresses() {
    let (db, app) = setup_pool_app(false).await;
    for i in 0..4 {
        seed_pool_address(&db, "BTC", &format!("bc1qpooladdr000{i}"), 100 - i).await;
    }

    let (r1, r2, r3, r4) = tokio::join!(
        post_json(&app, "/api/orders", order_body()),
        post_json(&app, "/api/orders", order_body()),
        post_json(&app, "/api/orders", order_body()),
        post_json(&app, "/api/orders", order_body()),
    );
    for (status, body) in [&r1, &r2, &r3, &r4] {
        assert_eq!(*status, StatusCode::CREATED, "create failed: {body}");
    }

    let order_rows = Orders::find().all(&db).await.unwrap();
    assert_eq!(order_rows.len(), 4);

    let mut deposit_addresses: Vec<_> = order_rows
        .iter()
        .map(|o| o.deposit_address.clone())
        .collect();
    deposit_addresses.sort();
    deposit_addresses.dedup();
    assert_eq!(deposit_addresses.len(), 4, "addresses were double-assigned");
    assert!(order_rows.iter().all(|o| o.deposit_source == "pool"));

    // Every pool row consumed, each owned by a distinct order, and the
    // back-reference matches the order's own binding
    let address_rows = Addresses::find().all(&db).await.unwrap();
    assert!(address_rows.iter().all(|a| a.status == "assigned"));
    let mut owners: Vec<_> = address_rows
        .iter()
        .map(|a| a.assigned_order_id.clone().expect("assigned without owner"))
        .collect();
    owners.sort();
    owners.dedup();
    assert_eq!(owners.len(), 4);

    for order in &order_rows {
        let pool_id = order
            .deposit_pool_address_id
            .as_ref()
            .expect("pool order without pool id");
        let address = address_rows
            .iter()
            .find(|a| &a.id == pool_id)
            .expect("bound address row missing");
        assert_eq!(address.assigned_order_id.as_deref(), Some(order.id.as_str()));
        assert_eq!(address.address, order.deposit_address);
    }
}

#[tokio::test]
async fn test_overcommitted_pool_fails_exactly_once_without_fallback() {
    let (db, app) = setup_pool_app(false).await;
    seed_pool_address(&db, "BTC", "bc1qpoolonly0001", 100).await;
    seed_pool_address(&db, "BTC", "bc1qpoolonly0002", 90).await;

    let (r1, r2, r3) = tokio::join!(
        post_json(&app, "/api/orders", order_body()),
        post_json(&app, "/api/orders", order_body()),
        post_json(&app, "/api/orders", order_body()),
    );
    let results = [r1, r2, r3];

    let created = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::CREATED)
        .count();
    assert_eq!(created, 2);

    let failures: Vec<_> = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::BAD_REQUEST)
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].1["error"], "No deposit addresses available.");

    // The failed creation left nothing behind
    assert_eq!(Orders::find().all(&db).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_exhausted_pool_falls_back_to_fixed() {
    let (db, app) = setup_pool_app(true).await;
    seed_pool_address(&db, "BTC", "bc1qlastpooladdr", 100).await;

    let (status, _) = post_json(&app, "/api/orders", order_body()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post_json(&app, "/api/orders", order_body()).await;
    assert_eq!(status, StatusCode::CREATED);

    let order_rows = Orders::find().all(&db).await.unwrap();
    let pooled: Vec<_> = order_rows
        .iter()
        .filter(|o| o.deposit_source == "pool")
        .collect();
    let fixed: Vec<_> = order_rows
        .iter()
        .filter(|o| o.deposit_source == "fixed")
        .collect();
    assert_eq!(pooled.len(), 1);
    assert_eq!(fixed.len(), 1);
    assert_eq!(pooled[0].deposit_address, "bc1qlastpooladdr");
    assert_eq!(fixed[0].deposit_address, "bc1qfallbackfixed");
    assert!(fixed[0].deposit_pool_address_id.is_none());
}

#[tokio::test]
async fn test_pool_hands_out_oldest_address_first() {
    let (db, app) = setup_pool_app(false).await;
    seed_pool_address(&db, "BTC", "bc1qnewestaddr00", 5).await;
    seed_pool_address(&db, "BTC", "bc1qoldestaddr00", 500).await;

    let (status, body) = post_json(&app, "/api/orders", order_body()).await;
    assert_eq!(status, StatusCode::CREATED);

    let public_id = body["publicId"].as_str().unwrap();
    let order = Orders::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .find(|o| o.public_id == public_id)
        .unwrap();
    assert_eq!(order.deposit_address, "bc1qoldestaddr00");
}

#[tokio::test]
async fn test_claim_consumes_an_address_exactly_once() {
    let db = setup_test_db().await.unwrap();
    let id = seed_pool_address(&db, "BTC", "bc1qsingleclaim0", 100).await;

    let first = allocator::claim_unused(&db, "BTC").await.unwrap();
    assert_eq!(first.map(|a| a.id), Some(id.clone()));

    // The same row is never handed out twice, and it never goes back
    let second = allocator::claim_unused(&db, "BTC").await.unwrap();
    assert!(second.is_none());

    let row = Addresses::find_by_id(id.as_str()).one(&db).await.unwrap().unwrap();
    assert_eq!(row.status, "assigned");
}

#[tokio::test]
async fn test_claim_is_scoped_to_the_network() {
    let db = setup_test_db().await.unwrap();
    seed_pool_address(&db, "ERC20", "0xothernetworkaddr", 100).await;

    let claimed = allocator::claim_unused(&db, "BTC").await.unwrap();
    assert!(claimed.is_none());
}

#[tokio::test]
async fn test_fixed_mode_leaves_pool_untouched() {
    let db = setup_test_db().await.unwrap();
    seed_settings(
        &db,
        json!({
            "deposit_mode": "fixed",
            "fixed_addresses": {"BTC": "bc1qfixedonly000"}
        }),
    )
    .await;
    seed_rate(&db, "BTC", "BTC", "USD", 64000.0, None, None, 100).await;
    seed_pool_address(&db, "BTC", "bc1qneverclaimed", 100).await;
    let app = test_app(db.clone());

    let (status, _) = post_json(&app, "/api/orders", order_body()).await;
    assert_eq!(status, StatusCode::CREATED);

    let order = &Orders::find().all(&db).await.unwrap()[0];
    assert_eq!(order.deposit_source, "fixed");
    assert_eq!(order.deposit_address, "bc1qfixedonly000");

    let pool_row = &Addresses::find().all(&db).await.unwrap()[0];
    assert_eq!(pool_row.status, "unused");
    assert!(pool_row.assigned_order_id.is_none());
}

#[tokio::test]
async fn test_missing_fallback_address_reports_missing() {
    let db = setup_test_db().await.unwrap();
    // Pool mode with fallback, but no fixed address configured and no pool
    seed_settings(
        &db,
        json!({"deposit_mode": "pool", "fallback_to_fixed": true}),
    )
    .await;
    seed_rate(&db, "BTC", "BTC", "USD", 64000.0, None, None, 100).await;
    let app = test_app(db);

    let (status, body) = post_json(&app, "/api/orders", order_body()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Deposit address missing.");
}
