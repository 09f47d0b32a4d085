//! Canonical sale record produced by the normalizer.

use crate::domain::{ActionType, AffiliateId, Decimal, Platform, ProductId, TimeMs};
use serde::{Deserialize, Serialize};

/// One sale, refund, chargeback or rebill event.
///
/// Monetary fields are raw magnitudes; the direction of money is decided
/// by `action_type`, never by the sign of the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: Option<String>,
    pub external_id: Option<String>,
    pub action_type: ActionType,
    pub platform: Platform,
    /// Gross amount charged to the customer.
    pub revenue: Decimal,
    pub net_amount: Decimal,
    pub taxes: Decimal,
    /// Percentage fee charged by the platform, as a fraction of revenue (0.05 = 5%).
    pub platform_tax: Decimal,
    /// Fixed per-transaction fee charged by the platform.
    pub platform_transaction_tax: Decimal,
    pub affiliate_commission: Decimal,
    pub merchant_commission: Decimal,
    pub cogs: Decimal,
    /// Amount reported as refunded. `None` when the source row has no value.
    pub refund_amount: Option<Decimal>,
    pub product_id: Option<ProductId>,
    pub product_name: Option<String>,
    pub customer_id: Option<String>,
    pub affiliate_id: Option<AffiliateId>,
    pub affiliate_name: Option<String>,
    pub transaction_date: Option<TimeMs>,
}

impl SaleRecord {
    /// Start a record with the given classification and platform, everything else zeroed.
    pub fn new(action_type: ActionType, platform: Platform) -> Self {
        SaleRecord {
            action_type,
            platform,
            ..SaleRecord::default()
        }
    }

    pub fn with_revenue(mut self, revenue: Decimal) -> Self {
        self.revenue = revenue;
        self
    }

    pub fn with_taxes(mut self, taxes: Decimal) -> Self {
        self.taxes = taxes;
        self
    }

    pub fn with_platform_fees(mut self, percent: Decimal, fixed: Decimal) -> Self {
        self.platform_tax = percent;
        self.platform_transaction_tax = fixed;
        self
    }

    pub fn with_affiliate_commission(mut self, commission: Decimal) -> Self {
        self.affiliate_commission = commission;
        self
    }

    pub fn with_merchant_commission(mut self, commission: Decimal) -> Self {
        self.merchant_commission = commission;
        self
    }

    pub fn with_cogs(mut self, cogs: Decimal) -> Self {
        self.cogs = cogs;
        self
    }

    pub fn with_refund_amount(mut self, amount: Decimal) -> Self {
        self.refund_amount = Some(amount);
        self
    }

    pub fn with_affiliate(mut self, id: &str) -> Self {
        self.affiliate_id = Some(AffiliateId::new(id.to_string()));
        self
    }

    pub fn with_product(mut self, id: &str) -> Self {
        self.product_id = Some(ProductId::new(id.to_string()));
        self
    }

    pub fn at(mut self, time: TimeMs) -> Self {
        self.transaction_date = Some(time);
        self
    }
}
