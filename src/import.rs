//! Import of raw sales rows from JSON payloads and CSV exports.

use crate::db::Repository;
use crate::normalize::{normalize_rows, Anomaly, RawRow};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("csv error: {0}")]
    Csv(String),
    #[error("row {0} is not a JSON object")]
    NotAnObject(usize),
    #[error("too many rows: limit is {limit}, got {got}")]
    TooManyRows { limit: usize, got: usize },
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub received: usize,
    pub inserted: usize,
    pub anomalies: Vec<Anomaly>,
}

/// Parse a CSV export: headers become field names, empty cells become null.
pub fn parse_csv(csv_bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_bytes);

    let headers = reader
        .headers()
        .map_err(|e| ImportError::Csv(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Csv(e.to_string()))?;
        let mut row = RawRow::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            let value = if cell.is_empty() {
                Value::Null
            } else {
                Value::String(cell.to_string())
            };
            row.insert(header.to_string(), value);
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Accept a JSON array of objects.
pub fn parse_json_rows(values: Vec<Value>) -> Result<Vec<RawRow>, ImportError> {
    values
        .into_iter()
        .enumerate()
        .map(|(idx, v)| match v {
            Value::Object(map) => Ok(map),
            _ => Err(ImportError::NotAnObject(idx)),
        })
        .collect()
}

/// Validates, stores and reports on batches of raw rows.
#[derive(Clone)]
pub struct Importer {
    repo: Arc<Repository>,
    max_rows: usize,
}

impl Importer {
    pub fn new(repo: Arc<Repository>, max_rows: usize) -> Self {
        Self { repo, max_rows }
    }

    pub async fn import_rows(&self, rows: Vec<RawRow>) -> Result<ImportSummary, ImportError> {
        if rows.len() > self.max_rows {
            return Err(ImportError::TooManyRows {
                limit: self.max_rows,
                got: rows.len(),
            });
        }

        let report = normalize_rows(&rows);
        let inserted = self.repo.insert_rows_batch(&rows).await?;

        info!(
            received = rows.len(),
            inserted,
            anomalies = report.anomalies.len(),
            "imported sales rows"
        );

        Ok(ImportSummary {
            received: rows.len(),
            inserted,
            anomalies: report.anomalies,
        })
    }
}
