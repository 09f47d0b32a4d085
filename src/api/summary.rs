use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use super::params::{load_records, FilterQuery};
use super::AppState;
use crate::domain::DateRange;
use crate::engine::{AggregateMetrics, RateSummary};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    /// Resolved bounds; absent for all-time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
    pub record_count: usize,
    pub metrics: AggregateMetrics,
    pub rates: RateSummary,
}

pub async fn get_summary(
    Query(params): Query<FilterQuery>,
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, AppError> {
    let filter = params.to_filter(&state.config, Utc::now())?;
    let records = load_records(&state, &filter).await?;

    let metrics = AggregateMetrics::from_records(&records);
    let rates = RateSummary::from_metrics(&metrics);

    Ok(Json(SummaryResponse {
        range: filter.range,
        record_count: records.len(),
        metrics,
        rates,
    }))
}
