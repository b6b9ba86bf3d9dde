//! HTTP surface for the sales dashboard
//!
//! Serves the HTML dashboard plus a small JSON API over the same snapshot.

pub mod charts;
pub mod format;
pub mod handlers;
pub mod page;
pub mod service;

pub use service::DashboardService;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(service: Arc<DashboardService>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page
        .route("/", get(handlers::index))
        .route("/risk", get(handlers::risk_page))
        .route("/refresh", post(handlers::refresh_page))
        // JSON API
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/summary", get(handlers::get_summary))
        .route("/api/v1/monthly", get(handlers::get_monthly))
        .route("/api/v1/forecast", get(handlers::get_forecast))
        .route("/api/v1/breakdown/:dimension", get(handlers::get_breakdown))
        .route("/api/v1/records", get(handlers::get_records))
        .route("/api/v1/risk/classify", get(handlers::classify_risk))
        .route("/api/v1/refresh", post(handlers::refresh))
        .route("/api/v1/export/monthly.csv", get(handlers::export_monthly_csv))
        // State and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
