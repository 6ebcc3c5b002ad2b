// src/lib.rs

use axum::routing::{get, patch, post};
use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use services::admin::AdminGate;
use services::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub limiter: RateLimiter,
    pub admin: AdminGate,
}

pub mod entities {
    pub mod prelude;
    pub mod addresses;
    pub mod orders;
    pub mod rates;
    pub mod settings;
}

pub mod services {
    pub mod admin;
    pub mod allocator;
    pub mod masks;
    pub mod orders;
    pub mod rate_limit;
    pub mod rates;
    pub mod settings;
    pub mod tokens;
}

pub mod models {
    pub mod address;
    pub mod order;
    pub mod rate;
}

pub mod handlers {
    pub mod admin_addresses;
    pub mod admin_orders;
    pub mod admin_rates;
    pub mod admin_settings;
    pub mod orders;
    pub mod rates;
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/rates", get(handlers::rates::get_rate))
        .route("/api/orders", post(handlers::orders::create_order))
        .route("/api/orders/{public_id}", get(handlers::orders::get_order))
        .route(
            "/api/orders/{public_id}/txid",
            patch(handlers::orders::submit_txid),
        )
        .route(
            "/api/orders/{public_id}/payout",
            patch(handlers::orders::update_payout),
        )
        .route("/api/admin/orders", get(handlers::admin_orders::list_orders))
        .route(
            "/api/admin/orders/{id}",
            get(handlers::admin_orders::get_order).patch(handlers::admin_orders::update_order),
        )
        .route(
            "/api/admin/addresses",
            get(handlers::admin_addresses::list_addresses)
                .post(handlers::admin_addresses::upload_addresses)
                .delete(handlers::admin_addresses::delete_address),
        )
        .route(
            "/api/admin/rates",
            get(handlers::admin_rates::list_rates)
                .post(handlers::admin_rates::create_rate)
                .patch(handlers::admin_rates::update_rate)
                .delete(handlers::admin_rates::delete_rate),
        )
        .route(
            "/api/admin/settings",
            get(handlers::admin_settings::get_settings)
                .patch(handlers::admin_settings::patch_settings),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "Offramp settlement backend"
}
