use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use super::AppState;
use crate::engine::{calculate_net_sales, NetSalesRecord};
use crate::error::AppError;
use crate::import::{parse_csv, parse_json_rows, ImportSummary};
use crate::normalize::normalize_row;

/// Ingest a JSON array of raw rows.
pub async fn post_sales(
    State(state): State<AppState>,
    Json(values): Json<Vec<Value>>,
) -> Result<Json<ImportSummary>, AppError> {
    let rows = parse_json_rows(values)?;
    let summary = state.importer.import_rows(rows).await?;
    Ok(Json(summary))
}

/// Ingest a CSV export. The first line names the fields.
pub async fn post_sales_csv(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportSummary>, AppError> {
    let rows = parse_csv(&body)?;
    let summary = state.importer.import_rows(rows).await?;
    Ok(Json(summary))
}

pub async fn get_sale(
    Path(row_key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<NetSalesRecord>, AppError> {
    let row = state
        .repo
        .get_row(&row_key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("sale {}", row_key)))?;

    Ok(Json(calculate_net_sales(&normalize_row(&row))))
}
