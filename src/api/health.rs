use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::AppState;
use crate::error::AppError;

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Ready once the sales store answers a query.
pub async fn ready(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let records = state.repo.count_rows().await?;
    Ok(Json(json!({"status": "ready", "records": records})))
}
