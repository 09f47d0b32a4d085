//! Dashboard scope selection: date presets, ranges and record filters.
//!
//! Filters decide which records enter a computation; the calculators
//! themselves never look at a `FilterState`.

use crate::domain::{ActionType, AffiliateId, Platform, ProductId, SaleRecord, TimeMs};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown date preset: {0}")]
    UnknownPreset(String),
    #[error("fromMs must be <= toMs")]
    InvertedRange,
}

/// Named date range relative to "now" in the configured time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePreset {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
    AllTime,
}

impl FromStr for DatePreset {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "today" => Ok(DatePreset::Today),
            "yesterday" => Ok(DatePreset::Yesterday),
            "last7days" | "7d" => Ok(DatePreset::Last7Days),
            "last30days" | "30d" => Ok(DatePreset::Last30Days),
            "thismonth" => Ok(DatePreset::ThisMonth),
            "lastmonth" => Ok(DatePreset::LastMonth),
            "alltime" | "all" => Ok(DatePreset::AllTime),
            _ => Err(FilterError::UnknownPreset(s.to_string())),
        }
    }
}

impl DatePreset {
    /// Resolve the preset to concrete bounds. `AllTime` yields `None`.
    pub fn resolve(&self, now: DateTime<Utc>, offset: FixedOffset) -> Option<DateRange> {
        let local_today = now.with_timezone(&offset).date_naive();
        let now_ms = TimeMs::from_datetime(now);

        let (from_day, to) = match self {
            DatePreset::AllTime => return None,
            DatePreset::Today => (local_today, now_ms),
            DatePreset::Yesterday => {
                let yesterday = local_today - Duration::days(1);
                (yesterday, end_of_day_before(local_today, offset))
            }
            DatePreset::Last7Days => (local_today - Duration::days(6), now_ms),
            DatePreset::Last30Days => (local_today - Duration::days(29), now_ms),
            DatePreset::ThisMonth => (first_of_month(local_today), now_ms),
            DatePreset::LastMonth => {
                let this_month = first_of_month(local_today);
                let last_month = first_of_month(this_month - Duration::days(1));
                (last_month, end_of_day_before(this_month, offset))
            }
        };

        Some(DateRange {
            from: start_of_day(from_day, offset),
            to,
        })
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn start_of_day(day: NaiveDate, offset: FixedOffset) -> TimeMs {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    match offset.from_local_datetime(&midnight).single() {
        Some(dt) => TimeMs::from_datetime(dt.with_timezone(&Utc)),
        None => TimeMs::from_datetime(Utc.from_utc_datetime(&midnight)),
    }
}

fn end_of_day_before(day: NaiveDate, offset: FixedOffset) -> TimeMs {
    TimeMs::new(start_of_day(day, offset).as_i64() - 1)
}

/// Inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from: TimeMs,
    pub to: TimeMs,
}

impl DateRange {
    pub fn new(from: TimeMs, to: TimeMs) -> Result<Self, FilterError> {
        if from > to {
            return Err(FilterError::InvertedRange);
        }
        Ok(DateRange { from, to })
    }

    pub fn contains(&self, t: TimeMs) -> bool {
        t >= self.from && t <= self.to
    }
}

/// User-selected scope for a dashboard view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub range: Option<DateRange>,
    pub platform: Option<Platform>,
    pub product_id: Option<ProductId>,
    pub affiliate_id: Option<AffiliateId>,
    pub action_type: Option<ActionType>,
}

impl FilterState {
    /// Records without a transaction date never match a bounded range.
    pub fn matches(&self, record: &SaleRecord) -> bool {
        if let Some(range) = &self.range {
            match record.transaction_date {
                Some(t) if range.contains(t) => {}
                _ => return false,
            }
        }
        if let Some(platform) = &self.platform {
            if &record.platform != platform {
                return false;
            }
        }
        if let Some(product) = &self.product_id {
            if record.product_id.as_ref() != Some(product) {
                return false;
            }
        }
        if let Some(affiliate) = &self.affiliate_id {
            if record.affiliate_id.as_ref() != Some(affiliate) {
                return false;
            }
        }
        if let Some(action) = &self.action_type {
            if &record.action_type != action {
                return false;
            }
        }
        true
    }
}
