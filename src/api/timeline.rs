use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::params::{load_records, FilterQuery};
use super::AppState;
use crate::engine::{group_by_time, Bucket, GroupMetrics};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    pub bucket: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResponse {
    pub bucket: &'static str,
    pub points: Vec<GroupMetrics>,
}

pub async fn get_timeline(
    Query(filter): Query<FilterQuery>,
    Query(params): Query<TimelineQuery>,
    State(state): State<AppState>,
) -> Result<Json<TimelineResponse>, AppError> {
    let bucket = match params.bucket.as_deref() {
        None | Some("") => Bucket::Day,
        Some(b) => b
            .parse::<Bucket>()
            .map_err(|_| AppError::BadRequest("bucket must be one of: day, hour".to_string()))?,
    };

    let filter = filter.to_filter(&state.config, Utc::now())?;
    let records = load_records(&state, &filter).await?;

    Ok(Json(TimelineResponse {
        bucket: match bucket {
            Bucket::Day => "day",
            Bucket::Hour => "hour",
        },
        points: group_by_time(&records, bucket, state.config.offset()),
    }))
}
