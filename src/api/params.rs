use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::AppState;
use crate::config::Config;
use crate::domain::{
    ActionType, AffiliateId, DatePreset, DateRange, FilterState, Platform, ProductId, SaleRecord,
    TimeMs,
};
use crate::error::AppError;
use crate::normalize::normalize_row;

/// Scope parameters shared by every read endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub preset: Option<String>,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
    pub platform: Option<String>,
    pub product_id: Option<String>,
    pub affiliate_id: Option<String>,
    pub action_type: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl FilterQuery {
    /// Explicit bounds win over a preset; with neither, the configured
    /// default preset applies. A single bound leaves the other side open.
    pub fn to_filter(&self, config: &Config, now: DateTime<Utc>) -> Result<FilterState, AppError> {
        let range = if self.from_ms.is_some() || self.to_ms.is_some() {
            Some(DateRange::new(
                TimeMs::new(self.from_ms.unwrap_or(i64::MIN)),
                TimeMs::new(self.to_ms.unwrap_or(i64::MAX)),
            )?)
        } else {
            let preset = match non_empty(&self.preset) {
                Some(p) => p.parse::<DatePreset>()?,
                None => config.default_preset,
            };
            preset.resolve(now, config.offset())
        };

        Ok(FilterState {
            range,
            platform: non_empty(&self.platform).map(Platform::parse),
            product_id: non_empty(&self.product_id).map(|s| ProductId::new(s.to_string())),
            affiliate_id: non_empty(&self.affiliate_id).map(|s| AffiliateId::new(s.to_string())),
            action_type: non_empty(&self.action_type).map(ActionType::parse),
        })
    }
}

/// Load stored rows for `filter`, normalized and fully filtered.
///
/// Range and platform are pushed down to SQLite; the remaining criteria
/// are applied on the normalized records.
pub async fn load_records(
    state: &AppState,
    filter: &FilterState,
) -> Result<Vec<SaleRecord>, AppError> {
    let rows = state
        .repo
        .query_rows(filter.range, filter.platform.as_ref())
        .await?;

    Ok(rows
        .iter()
        .map(normalize_row)
        .filter(|r| filter.matches(r))
        .collect())
}
