use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::params::{load_records, FilterQuery};
use super::AppState;
use crate::domain::SaleRecord;
use crate::engine::{group_by_affiliate, group_by_product, rank_groups, GroupMetrics, RankMetric};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankQuery {
    pub metric: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedGroup {
    pub rank: usize,
    #[serde(flatten)]
    pub group: GroupMetrics,
}

pub async fn get_affiliates(
    Query(filter): Query<FilterQuery>,
    Query(params): Query<RankQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RankedGroup>>, AppError> {
    ranked(&state, &filter, &params, group_by_affiliate).await
}

pub async fn get_products(
    Query(filter): Query<FilterQuery>,
    Query(params): Query<RankQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RankedGroup>>, AppError> {
    ranked(&state, &filter, &params, group_by_product).await
}

fn parse_metric(metric: Option<&str>) -> Result<RankMetric, AppError> {
    match metric.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(RankMetric::Revenue),
        Some(m) => m.parse::<RankMetric>().map_err(|_| {
            AppError::BadRequest(
                "metric must be one of: revenue, grossSales, netSales, profit, refunds, sales"
                    .to_string(),
            )
        }),
    }
}

async fn ranked(
    state: &AppState,
    filter: &FilterQuery,
    params: &RankQuery,
    group_fn: fn(&[SaleRecord]) -> Vec<GroupMetrics>,
) -> Result<Json<Vec<RankedGroup>>, AppError> {
    let metric = parse_metric(params.metric.as_deref())?;
    let filter = filter.to_filter(&state.config, Utc::now())?;
    let records = load_records(state, &filter).await?;

    let entries = rank_groups(group_fn(&records), metric)
        .into_iter()
        .take(params.limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(idx, group)| RankedGroup {
            rank: idx + 1,
            group,
        })
        .collect();

    Ok(Json(entries))
}
