//! Domain types for the sales metrics engine.
//!
//! This module provides:
//! - Lossless money handling via the Decimal wrapper
//! - Primitives: TimeMs, Platform, ActionType, AffiliateId, ProductId
//! - The canonical SaleRecord shape produced by the normalizer
//! - Dashboard scope selection (date presets and record filters)

pub mod decimal;
pub mod filter;
pub mod primitives;
pub mod sale;

pub use decimal::Decimal;
pub use filter::{DatePreset, DateRange, FilterError, FilterState};
pub use primitives::{ActionType, AffiliateId, Platform, ProductId, TimeMs};
pub use sale::SaleRecord;
