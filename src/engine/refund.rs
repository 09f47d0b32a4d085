//! Refund cost calculator.

use crate::domain::{Decimal, Platform, SaleRecord};
use crate::engine::fees::compute_fee_breakdown;

/// Monetary cost of a refund or chargeback event.
///
/// - Zero for anything that is not refund-class.
/// - Zero when the stored refund amount equals the taxes (tax-only event).
/// - BuyGoods: `|revenue|` minus commission, taxes and platform fees.
/// - Every other platform: `|merchant_commission|`.
///
/// Results are not clamped: commission larger than revenue yields a
/// negative cost.
pub fn calculate_refund(record: &SaleRecord) -> Decimal {
    if !record.action_type.is_refund_class() {
        return Decimal::zero();
    }

    if record.refund_amount == Some(record.taxes) {
        return Decimal::zero();
    }

    match record.platform {
        Platform::Buygoods => compute_fee_breakdown(record).net_of(record.revenue.abs()),
        _ => record.merchant_commission.abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActionType;

    fn d(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    fn buygoods_refund() -> SaleRecord {
        SaleRecord::new(ActionType::Refund, Platform::Buygoods)
            .with_revenue(d("-100"))
            .with_affiliate_commission(d("30"))
            .with_taxes(d("5"))
            .with_platform_fees(d("0.1"), d("1"))
    }

    #[test]
    fn test_non_refund_actions_cost_nothing() {
        for action in [
            ActionType::FrontSale,
            ActionType::BackSale,
            ActionType::Rebill,
            ActionType::Other("neworder".to_string()),
        ] {
            let record = SaleRecord::new(action, Platform::Clickbank)
                .with_merchant_commission(d("-15"));
            assert_eq!(calculate_refund(&record), Decimal::zero());
        }
    }

    #[test]
    fn test_clickbank_uses_merchant_commission_magnitude() {
        let record =
            SaleRecord::new(ActionType::Refund, Platform::Clickbank).with_merchant_commission(d("-15"));
        assert_eq!(calculate_refund(&record), d("15"));
    }

    #[test]
    fn test_buygoods_formula() {
        // |−100| − 30 − 5 − (−100 × 0.1) − 1 = 74
        assert_eq!(calculate_refund(&buygoods_refund()), d("74"));
    }

    #[test]
    fn test_tax_only_refund_is_exempt() {
        let record = buygoods_refund().with_refund_amount(d("5"));
        assert_eq!(calculate_refund(&record), Decimal::zero());

        let chargeback = SaleRecord::new(ActionType::Chargeback, Platform::Digistore)
            .with_merchant_commission(d("40"))
            .with_taxes(d("3.5"))
            .with_refund_amount(d("3.5"));
        assert_eq!(calculate_refund(&chargeback), Decimal::zero());
    }

    #[test]
    fn test_refund_amount_different_from_taxes_is_charged() {
        let record = buygoods_refund().with_refund_amount(d("100"));
        assert_eq!(calculate_refund(&record), d("74"));
    }

    #[test]
    fn test_negative_cost_passes_through() {
        let record = SaleRecord::new(ActionType::ChargebackRefundTime, Platform::Buygoods)
            .with_revenue(d("20"))
            .with_affiliate_commission(d("50"));
        assert_eq!(calculate_refund(&record), d("-30"));
    }
}
