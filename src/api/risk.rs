//! Refund/chargeback exposure, overall and per platform.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use super::params::{load_records, FilterQuery};
use super::AppState;
use crate::engine::{build_aggregate, group_by, RateSummary};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResponse {
    pub overall: RateSummary,
    pub by_platform: Vec<PlatformRisk>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRisk {
    pub platform: String,
    #[serde(flatten)]
    pub rates: RateSummary,
}

pub async fn get_risk(
    Query(params): Query<FilterQuery>,
    State(state): State<AppState>,
) -> Result<Json<RiskResponse>, AppError> {
    let filter = params.to_filter(&state.config, Utc::now())?;
    let records = load_records(&state, &filter).await?;

    let overall = RateSummary::from_metrics(&build_aggregate(&records));

    let mut by_platform: Vec<PlatformRisk> =
        group_by(&records, |r| Some((r.platform.as_str().to_string(), None)))
            .into_iter()
            .map(|g| PlatformRisk {
                platform: g.key,
                rates: RateSummary::from_metrics(&g.metrics),
            })
            .collect();

    // Riskiest first.
    by_platform.sort_by(|a, b| {
        b.rates
            .chargeback_rate
            .cmp(&a.rates.chargeback_rate)
            .then_with(|| b.rates.refund_rate.cmp(&a.rates.refund_rate))
            .then_with(|| a.platform.cmp(&b.platform))
    });

    Ok(Json(RiskResponse {
        overall,
        by_platform,
    }))
}
