//! Pure computation engine for sales metrics.
//!
//! Normalized records flow through the refund and net-sales calculators
//! into aggregates, which feed the ratio and health calculators. Nothing
//! here performs I/O or mutates its input.

pub mod aggregate;
pub mod fees;
pub mod grouping;
pub mod net_sales;
pub mod ratios;
pub mod refund;

pub use aggregate::{build_aggregate, ActionCounts, AggregateMetrics};
pub use fees::{compute_fee_breakdown, FeeBreakdown};
pub use grouping::{
    group_by, group_by_affiliate, group_by_product, group_by_time, rank_groups, Bucket,
    GroupMetrics, RankMetric,
};
pub use net_sales::{annotate_net_sales, calculate_net_sales, net_sales_of, NetSalesRecord};
pub use ratios::{ChargebackRisk, HealthBand, RateSummary};
pub use refund::calculate_refund;
