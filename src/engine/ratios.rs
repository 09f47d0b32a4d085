//! Percentage indicators and health/risk bands derived from aggregates.

use crate::domain::Decimal;
use crate::engine::aggregate::AggregateMetrics;
use serde::Serialize;

/// `refunds / sales × 100`, zero without sales.
pub fn refund_rate(refunds: u64, sales: u64) -> Decimal {
    Decimal::from_i64(refunds as i64).percent_of(Decimal::from_i64(sales as i64))
}

/// `chargebacks / sales × 100`, zero without sales.
pub fn chargeback_rate(chargebacks: u64, sales: u64) -> Decimal {
    Decimal::from_i64(chargebacks as i64).percent_of(Decimal::from_i64(sales as i64))
}

/// `max(0, 100 − refund_rate×2 − chargeback_rate×3)`.
///
/// A scope without sales scores 0, the worst case.
pub fn health_score(refund_rate: Decimal, chargeback_rate: Decimal, sales: u64) -> Decimal {
    if sales == 0 {
        return Decimal::zero();
    }
    let raw = Decimal::hundred()
        - refund_rate * Decimal::from_i64(2)
        - chargeback_rate * Decimal::from_i64(3);
    raw.max(Decimal::zero())
}

/// Return on the money put into the sales: `profit / (COGS + commission) × 100`.
pub fn roi(profit: Decimal, invested: Decimal) -> Decimal {
    profit.percent_of(invested)
}

/// Share of gross sales lost to refunds and chargebacks, in percent.
pub fn bleeding_rate(refunds_cost: Decimal, gross_sales: Decimal) -> Decimal {
    refunds_cost.percent_of(gross_sales)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargebackRisk {
    /// Below 1%.
    Safe,
    /// From 1% up to (not including) 2%.
    Warning,
    /// 2% and above.
    Critical,
}

impl ChargebackRisk {
    pub fn from_rate(rate: Decimal) -> Self {
        if rate < Decimal::from_i64(1) {
            ChargebackRisk::Safe
        } else if rate < Decimal::from_i64(2) {
            ChargebackRisk::Warning
        } else {
            ChargebackRisk::Critical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthBand {
    pub fn from_score(score: Decimal) -> Self {
        if score >= Decimal::from_i64(95) {
            HealthBand::Excellent
        } else if score >= Decimal::from_i64(85) {
            HealthBand::Good
        } else if score >= Decimal::from_i64(75) {
            HealthBand::Fair
        } else if score >= Decimal::from_i64(50) {
            HealthBand::Poor
        } else {
            HealthBand::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSummary {
    pub sales: u64,
    pub refunds: u64,
    pub chargebacks: u64,
    pub refund_rate: Decimal,
    pub chargeback_rate: Decimal,
    pub health_score: Decimal,
    pub health_band: HealthBand,
    pub chargeback_risk: ChargebackRisk,
    pub roi: Decimal,
    pub bleeding_rate: Decimal,
}

impl RateSummary {
    pub fn from_metrics(m: &AggregateMetrics) -> Self {
        let sales = m.counts.sales();
        let refunds = m.counts.refunds;
        let chargebacks = m.counts.chargebacks;

        let refund_rate = refund_rate(refunds, sales);
        let chargeback_rate = chargeback_rate(chargebacks, sales);
        let health_score = health_score(refund_rate, chargeback_rate, sales);

        RateSummary {
            sales,
            refunds,
            chargebacks,
            refund_rate,
            chargeback_rate,
            health_score,
            health_band: HealthBand::from_score(health_score),
            chargeback_risk: ChargebackRisk::from_rate(chargeback_rate),
            roi: roi(m.profit, m.total_cogs + m.commission),
            bleeding_rate: bleeding_rate(m.total_refunds_cost, m.gross_sales),
        }
    }
}
