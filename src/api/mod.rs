pub mod groups;
pub mod health;
pub mod params;
pub mod risk;
pub mod sales;
pub mod summary;
pub mod timeline;
pub mod transactions;

use crate::config::Config;
use crate::db::Repository;
use crate::import::Importer;
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Upper bound for import request bodies.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub importer: Importer,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self {
            importer: Importer::new(repo.clone(), config.max_import_rows),
            repo,
            config,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/sales", post(sales::post_sales))
        .route("/v1/sales/csv", post(sales::post_sales_csv))
        .route("/v1/sales/:row_key", get(sales::get_sale))
        .route("/v1/summary", get(summary::get_summary))
        .route("/v1/affiliates", get(groups::get_affiliates))
        .route("/v1/products", get(groups::get_products))
        .route("/v1/timeline", get(timeline::get_timeline))
        .route("/v1/transactions", get(transactions::get_transactions))
        .route("/v1/risk", get(risk::get_risk))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}
