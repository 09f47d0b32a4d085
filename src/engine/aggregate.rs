//! Aggregate metrics over a filtered set of records.

use crate::domain::{ActionType, Decimal, SaleRecord};
use crate::engine::fees::compute_fee_breakdown;
use crate::engine::refund::calculate_refund;
use serde::Serialize;

/// Share of gross sales held back from profit when computing cash flow.
pub fn cash_flow_allowance_rate() -> Decimal {
    Decimal::from_parts(10, 2)
}

/// Summary statistics for one scope (a date range, an affiliate, a product...).
///
/// Always recomputed from source records; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    /// Σrevenue over income actions.
    pub revenue: Decimal,
    pub platform_fees_percent: Decimal,
    pub platform_fees_fixed: Decimal,
    pub taxes: Decimal,
    pub gross_sales: Decimal,
    pub commission: Decimal,
    pub net_sales: Decimal,
    pub total_refunds_cost: Decimal,
    pub net_final: Decimal,
    /// COGS of front sales only; back-end sales carry no product cost.
    pub total_cogs: Decimal,
    pub profit: Decimal,
    pub aov: Decimal,
    pub allowance: Decimal,
    pub cash_flow: Decimal,
    pub counts: ActionCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCounts {
    pub front_sales: u64,
    pub back_sales: u64,
    pub rebills: u64,
    pub refunds: u64,
    /// Chargebacks, including those raised inside the refund window.
    pub chargebacks: u64,
    pub other: u64,
    pub total: u64,
}

impl ActionCounts {
    /// Completed sales: front sales, back sales and rebills.
    pub fn sales(&self) -> u64 {
        self.front_sales + self.back_sales + self.rebills
    }

    fn record(&mut self, action: &ActionType) {
        self.total += 1;
        if action.is_chargeback() {
            self.chargebacks += 1;
            return;
        }
        match action {
            ActionType::FrontSale => self.front_sales += 1,
            ActionType::BackSale => self.back_sales += 1,
            ActionType::Rebill => self.rebills += 1,
            ActionType::Refund => self.refunds += 1,
            _ => self.other += 1,
        }
    }
}

impl AggregateMetrics {
    /// Fold records into a summary. The input is only borrowed.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SaleRecord>,
    {
        let mut m = AggregateMetrics::default();
        let mut front_cogs = Decimal::zero();

        for record in records {
            m.counts.record(&record.action_type);

            if record.action_type.is_income() {
                let fees = compute_fee_breakdown(record);
                m.revenue += record.revenue;
                m.platform_fees_percent += fees.platform_fee_percent;
                m.platform_fees_fixed += fees.platform_fee_fixed;
                m.taxes += fees.taxes;
                m.commission += fees.commission;
                if record.action_type == ActionType::FrontSale {
                    front_cogs += record.cogs;
                }
            } else if record.action_type.is_refund_class() {
                m.total_refunds_cost += calculate_refund(record);
            }
        }

        m.gross_sales = m.revenue - m.platform_fees_percent - m.platform_fees_fixed - m.taxes;
        m.net_sales = m.gross_sales - m.commission;
        m.net_final = m.net_sales - m.total_refunds_cost;
        m.total_cogs = front_cogs;
        m.profit = m.net_final - m.total_cogs;
        m.aov = m
            .gross_sales
            .div_or_zero(Decimal::from_i64(m.counts.front_sales as i64));
        m.allowance = m.gross_sales * cash_flow_allowance_rate();
        m.cash_flow = m.profit - m.allowance;
        m
    }
}

pub fn build_aggregate(records: &[SaleRecord]) -> AggregateMetrics {
    AggregateMetrics::from_records(records)
}
