//! Per-transaction net sales.

use crate::domain::{Decimal, SaleRecord};
use crate::engine::fees::compute_fee_breakdown;
use crate::engine::refund::calculate_refund;
use serde::Serialize;

/// A record annotated with its net proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetSalesRecord {
    #[serde(flatten)]
    pub record: SaleRecord,
    pub net_sales: Decimal,
}

/// Net proceeds of one record: the negated refund cost for refund-class
/// events, otherwise revenue net of commission, taxes and platform fees.
pub fn net_sales_of(record: &SaleRecord) -> Decimal {
    if record.action_type.is_refund_class() {
        -calculate_refund(record)
    } else {
        compute_fee_breakdown(record).net_of(record.revenue)
    }
}

pub fn calculate_net_sales(record: &SaleRecord) -> NetSalesRecord {
    NetSalesRecord {
        net_sales: net_sales_of(record),
        record: record.clone(),
    }
}

pub fn annotate_net_sales(records: &[SaleRecord]) -> Vec<NetSalesRecord> {
    records.iter().map(calculate_net_sales).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActionType, Platform};

    fn d(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    #[test]
    fn test_sale_net_of_fees() {
        let record = SaleRecord::new(ActionType::FrontSale, Platform::Buygoods)
            .with_revenue(d("100"))
            .with_platform_fees(d("0.05"), d("1"))
            .with_taxes(d("2"))
            .with_affiliate_commission(d("10"));
        assert_eq!(calculate_net_sales(&record).net_sales, d("82"));
    }

    #[test]
    fn test_refund_is_negated_cost() {
        let record =
            SaleRecord::new(ActionType::Refund, Platform::Clickbank).with_merchant_commission(d("-15"));
        assert_eq!(calculate_net_sales(&record).net_sales, d("-15"));
    }

    #[test]
    fn test_unknown_action_uses_sale_formula() {
        let record = SaleRecord::new(ActionType::Other("bonus".to_string()), Platform::Cartpanda)
            .with_revenue(d("10"))
            .with_taxes(d("1"));
        assert_eq!(net_sales_of(&record), d("9"));
    }

    #[test]
    fn test_annotation_flattens_record() {
        let record = SaleRecord::new(ActionType::Rebill, Platform::Digistore).with_revenue(d("30"));
        let annotated = annotate_net_sales(std::slice::from_ref(&record));
        assert_eq!(annotated[0].record, record);

        let json = serde_json::to_value(&annotated[0]).unwrap();
        assert_eq!(json["action_type"], "rebill");
        assert_eq!(json["net_sales"].as_f64(), Some(30.0));
    }
}
