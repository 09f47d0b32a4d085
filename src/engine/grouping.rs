//! Partitioned aggregates: per affiliate, per product, per day and per hour.

use crate::domain::{Decimal, SaleRecord, TimeMs};
use crate::engine::aggregate::AggregateMetrics;
use chrono::FixedOffset;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Key used for records that have no affiliate/product reference.
pub const UNASSIGNED_KEY: &str = "unassigned";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMetrics {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub metrics: AggregateMetrics,
}

/// Business metric used to rank groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMetric {
    Revenue,
    GrossSales,
    NetSales,
    Profit,
    RefundsCost,
    Sales,
}

impl FromStr for RankMetric {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revenue" => Ok(RankMetric::Revenue),
            "grosssales" => Ok(RankMetric::GrossSales),
            "netsales" => Ok(RankMetric::NetSales),
            "profit" => Ok(RankMetric::Profit),
            "refunds" | "refundscost" => Ok(RankMetric::RefundsCost),
            "sales" => Ok(RankMetric::Sales),
            _ => Err(()),
        }
    }
}

/// Time bucket granularity for timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Day,
    Hour,
}

impl FromStr for Bucket {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Bucket::Day),
            "hour" | "hourly" => Ok(Bucket::Hour),
            _ => Err(()),
        }
    }
}

impl Bucket {
    /// `YYYY-MM-DD` or `YYYY-MM-DD HH:00` in the given offset.
    pub fn key_for(&self, t: TimeMs, offset: FixedOffset) -> String {
        let local = t.to_datetime().with_timezone(&offset);
        match self {
            Bucket::Day => local.format("%Y-%m-%d").to_string(),
            Bucket::Hour => local.format("%Y-%m-%d %H:00").to_string(),
        }
    }
}

/// Partition records by `key_fn` and aggregate each partition.
///
/// Records for which `key_fn` returns `None` are skipped. Output is in
/// ascending key order.
pub fn group_by<F>(records: &[SaleRecord], key_fn: F) -> Vec<GroupMetrics>
where
    F: Fn(&SaleRecord) -> Option<(String, Option<String>)>,
{
    let mut partitions: BTreeMap<String, (Option<String>, Vec<&SaleRecord>)> = BTreeMap::new();

    for record in records {
        let Some((key, label)) = key_fn(record) else {
            continue;
        };
        let entry = partitions.entry(key).or_insert_with(|| (None, Vec::new()));
        if entry.0.is_none() {
            entry.0 = label;
        }
        entry.1.push(record);
    }

    partitions
        .into_iter()
        .map(|(key, (label, members))| GroupMetrics {
            key,
            label,
            metrics: AggregateMetrics::from_records(members),
        })
        .collect()
}

pub fn group_by_affiliate(records: &[SaleRecord]) -> Vec<GroupMetrics> {
    group_by(records, |r| {
        let key = r
            .affiliate_id
            .as_ref()
            .map(|a| a.as_str().to_string())
            .unwrap_or_else(|| UNASSIGNED_KEY.to_string());
        Some((key, r.affiliate_name.clone()))
    })
}

pub fn group_by_product(records: &[SaleRecord]) -> Vec<GroupMetrics> {
    group_by(records, |r| {
        let key = r
            .product_id
            .as_ref()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| UNASSIGNED_KEY.to_string());
        Some((key, r.product_name.clone()))
    })
}

/// Chronological buckets. Undated records are left out.
pub fn group_by_time(
    records: &[SaleRecord],
    bucket: Bucket,
    offset: FixedOffset,
) -> Vec<GroupMetrics> {
    group_by(records, |r| {
        r.transaction_date
            .map(|t| (bucket.key_for(t, offset), None))
    })
}

/// Sort groups by `metric`, highest first; ties broken by key ascending.
pub fn rank_groups(mut groups: Vec<GroupMetrics>, metric: RankMetric) -> Vec<GroupMetrics> {
    groups.sort_by(|a, b| {
        metric_value(&b.metrics, metric)
            .cmp(&metric_value(&a.metrics, metric))
            .then_with(|| a.key.cmp(&b.key))
    });
    groups
}

fn metric_value(m: &AggregateMetrics, metric: RankMetric) -> Decimal {
    match metric {
        RankMetric::Revenue => m.revenue,
        RankMetric::GrossSales => m.gross_sales,
        RankMetric::NetSales => m.net_sales,
        RankMetric::Profit => m.profit,
        RankMetric::RefundsCost => m.total_refunds_cost,
        RankMetric::Sales => Decimal::from_i64(m.counts.sales() as i64),
    }
}
