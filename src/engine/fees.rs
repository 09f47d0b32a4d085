//! Shared fee breakdown used by both the refund and net-sales paths.

use crate::domain::{Decimal, SaleRecord};
use serde::Serialize;

/// Deductions applied to a record's revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    /// `revenue × platform_tax`.
    pub platform_fee_percent: Decimal,
    /// Fixed per-transaction platform fee.
    pub platform_fee_fixed: Decimal,
    pub taxes: Decimal,
    /// Affiliate commission.
    pub commission: Decimal,
}

impl FeeBreakdown {
    /// `amount` minus every deduction.
    pub fn net_of(&self, amount: Decimal) -> Decimal {
        amount - self.commission - self.taxes - self.platform_fee_percent - self.platform_fee_fixed
    }
}

/// The percentage fee is taken on the signed revenue as stored.
pub fn compute_fee_breakdown(record: &SaleRecord) -> FeeBreakdown {
    FeeBreakdown {
        platform_fee_percent: record.revenue * record.platform_tax,
        platform_fee_fixed: record.platform_transaction_tax,
        taxes: record.taxes,
        commission: record.affiliate_commission,
    }
}
