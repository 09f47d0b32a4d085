//! Raw sales row store.
//!
//! Rows are kept exactly as received (JSON) and normalized on the way out,
//! so a change to the normalizer applies to historical data as well. A
//! few columns are lifted out of the payload for range/platform queries.

use crate::domain::{DateRange, Platform, SaleRecord, TimeMs};
use crate::normalize::{normalize_row, RawRow};
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::warn;

/// Stable key for a raw row.
///
/// Priority: platform + action + row id (if present) > hash of the
/// canonical JSON. Platforms report refunds and chargebacks under the
/// id of the original sale, so the action is part of the key.
pub fn compute_row_key(row: &RawRow) -> String {
    row_key_for(&normalize_row(row), row)
}

fn row_key_for(record: &SaleRecord, row: &RawRow) -> String {
    if let Some(id) = record.id.as_deref() {
        return format!(
            "id:{}:{}:{}",
            record.platform.as_str(),
            record.action_type.as_str(),
            id
        );
    }

    // serde_json maps are key-ordered, so the serialization is canonical.
    let canonical = serde_json::Value::Object(row.clone()).to_string();
    let hash = Sha256::digest(canonical.as_bytes());
    format!("hash:{}", hex::encode(&hash[..16]))
}

/// Repository for raw sales rows.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Insert rows idempotently in a single transaction.
    ///
    /// Returns the number of newly inserted rows (duplicates are skipped).
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn insert_rows_batch(&self, rows: &[RawRow]) -> Result<usize, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }

        let created_at = TimeMs::now().as_i64();
        let mut inserted = 0usize;
        let mut tx = self.pool.begin().await?;

        for row in rows {
            let record = normalize_row(row);
            let result = sqlx::query(
                r#"
                INSERT INTO raw_sales (row_key, platform, action_type, time_ms, payload, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(row_key) DO NOTHING
                "#,
            )
            .bind(row_key_for(&record, row))
            .bind(record.platform.as_str())
            .bind(record.action_type.as_str())
            .bind(record.transaction_date.map(|t| t.as_i64()))
            .bind(serde_json::Value::Object(row.clone()).to_string())
            .bind(created_at)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Load raw rows, newest first.
    ///
    /// A bounded range excludes undated rows. Rows whose payload no
    /// longer parses are skipped with a warning.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_rows(
        &self,
        range: Option<DateRange>,
        platform: Option<&Platform>,
    ) -> Result<Vec<RawRow>, sqlx::Error> {
        let from_ms = range.map(|r| r.from.as_i64());
        let to_ms = range.map(|r| r.to.as_i64());
        let platform = platform.map(|p| p.as_str().to_string());

        let rows = sqlx::query(
            r#"
            SELECT row_key, payload
            FROM raw_sales
            WHERE (? IS NULL OR time_ms >= ?)
              AND (? IS NULL OR time_ms <= ?)
              AND (? IS NULL OR platform = ?)
            ORDER BY time_ms DESC, row_key ASC
            "#,
        )
        .bind(from_ms)
        .bind(from_ms)
        .bind(to_ms)
        .bind(to_ms)
        .bind(platform.as_deref())
        .bind(platform.as_deref())
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let row_key: String = row.get("row_key");
            let payload: String = row.get("payload");
            match parse_payload(&payload) {
                Some(raw) => out.push(raw),
                None => warn!(row_key = %row_key, "skipping unreadable stored payload"),
            }
        }
        Ok(out)
    }

    /// Fetch a single raw row by key.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_row(&self, row_key: &str) -> Result<Option<RawRow>, sqlx::Error> {
        let row = sqlx::query("SELECT payload FROM raw_sales WHERE row_key = ?")
            .bind(row_key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|r| {
            let payload: String = r.get("payload");
            parse_payload(&payload)
        }))
    }

    /// Total number of stored rows.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count_rows(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM raw_sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

fn parse_payload(payload: &str) -> Option<RawRow> {
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        _ => None,
    }
}
