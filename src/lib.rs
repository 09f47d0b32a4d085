pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod import;
pub mod normalize;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{ActionType, Decimal, FilterState, Platform, SaleRecord, TimeMs};
pub use engine::{
    build_aggregate, calculate_net_sales, calculate_refund, AggregateMetrics, NetSalesRecord,
    RateSummary,
};
pub use error::AppError;
pub use normalize::{normalize_row, normalize_rows, RawRow};
