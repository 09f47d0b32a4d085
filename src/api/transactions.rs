use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::params::{load_records, FilterQuery};
use super::AppState;
use crate::engine::{annotate_net_sales, NetSalesRecord};
use crate::error::AppError;

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    /// Matching records before the limit is applied.
    pub total: usize,
    pub transactions: Vec<NetSalesRecord>,
}

fn validate_limit(limit: Option<usize>) -> Result<usize, AppError> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        Some(_) => Err(AppError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        ))),
    }
}

/// Filtered records, newest first; undated records come last.
pub async fn get_transactions(
    Query(filter): Query<FilterQuery>,
    Query(params): Query<TransactionsQuery>,
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let limit = validate_limit(params.limit)?;
    let filter = filter.to_filter(&state.config, Utc::now())?;
    let records = load_records(&state, &filter).await?;

    let total = records.len();
    let page = &records[..total.min(limit)];

    Ok(Json(TransactionsResponse {
        total,
        transactions: annotate_net_sales(page),
    }))
}
