//! Record normalizer: raw database rows to canonical `SaleRecord`s.
//!
//! Rows come from different platform exports and table generations, so
//! every field is looked up under a list of aliases. Normalization never
//! fails: unreadable numbers become zero and unreadable dates become
//! `None`. `normalize_rows` additionally reports what it had to paper over.

pub mod coerce;

use crate::domain::{ActionType, AffiliateId, Platform, ProductId, SaleRecord};
use coerce::{coerce_bool, coerce_decimal, coerce_string, coerce_timestamp, Coerced};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// A raw row as returned by the database or an import file.
pub type RawRow = Map<String, Value>;

const ID: &[&str] = &["id", "transaction_id"];
const EXTERNAL_ID: &[&str] = &["external_id", "externalId", "order_id"];
const ACTION_TYPE: &[&str] = &["action_type", "actionType", "type", "event_type"];
const UPSELL: &[&str] = &["upsell", "is_upsell", "isUpsell"];
const PLATFORM: &[&str] = &["platform", "source"];
const REVENUE: &[&str] = &["revenue", "gross_amount", "grossAmount", "amount"];
const NET_AMOUNT: &[&str] = &["net_amount", "netAmount"];
const TAXES: &[&str] = &["taxes", "tax"];
const PLATFORM_TAX: &[&str] = &["platform_tax", "platform_tax_percent", "platformTax"];
const PLATFORM_TRANSACTION_TAX: &[&str] = &[
    "platform_transaction_tax",
    "platform_fee_fixed",
    "platformTransactionTax",
];
const AFFILIATE_COMMISSION: &[&str] = &[
    "aff_commission",
    "affiliate_commission",
    "affiliateCommission",
    "commission",
];
const MERCHANT_COMMISSION: &[&str] = &["merchant_commission", "merchantCommission"];
const COGS: &[&str] = &["cogs", "product_cost"];
const REFUND_AMOUNT: &[&str] = &["refund_amount", "refundAmount"];
const PRODUCT_ID: &[&str] = &["product_id", "productId"];
const PRODUCT_NAME: &[&str] = &["product_name", "productName"];
const CUSTOMER_ID: &[&str] = &["customer_id", "customerId"];
const AFFILIATE_ID: &[&str] = &["affiliate_id", "affiliateId", "aff_id"];
const AFFILIATE_NAME: &[&str] = &["affiliate_name", "affiliateName"];
const TRANSACTION_DATE: &[&str] = &[
    "transaction_date",
    "occurredAt",
    "occurred_at",
    "created_at",
    "date",
];

/// Raw action values that mean "a new order"; the upsell flag decides front vs back.
const NEW_ORDER: &[&str] = &["neworder", "new_order", "order", "sale"];

/// What the normalizer had to coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    MalformedNumber,
    MalformedTimestamp,
    MissingActionType,
    UnknownActionType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub row_index: usize,
    pub field: &'static str,
    pub kind: AnomalyKind,
    /// The offending cell, rendered as JSON.
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub records: Vec<SaleRecord>,
    pub anomalies: Vec<Anomaly>,
}

/// Normalize a single row, discarding anomaly details.
pub fn normalize_row(row: &RawRow) -> SaleRecord {
    let mut sink = Vec::new();
    RowReader::new(row, 0, &mut sink).read()
}

/// Normalize a batch, collecting anomalies alongside the records.
pub fn normalize_rows(rows: &[RawRow]) -> NormalizeReport {
    let mut report = NormalizeReport {
        records: Vec::with_capacity(rows.len()),
        anomalies: Vec::new(),
    };

    for (idx, row) in rows.iter().enumerate() {
        let record = RowReader::new(row, idx, &mut report.anomalies).read();
        report.records.push(record);
    }

    if !report.anomalies.is_empty() {
        debug!(
            rows = rows.len(),
            anomalies = report.anomalies.len(),
            "normalized rows with anomalies"
        );
    }

    report
}

struct RowReader<'a> {
    row: &'a RawRow,
    row_index: usize,
    anomalies: &'a mut Vec<Anomaly>,
}

impl<'a> RowReader<'a> {
    fn new(row: &'a RawRow, row_index: usize, anomalies: &'a mut Vec<Anomaly>) -> Self {
        Self {
            row,
            row_index,
            anomalies,
        }
    }

    fn read(mut self) -> SaleRecord {
        let action_type = self.action_type();
        let platform = self
            .string(PLATFORM)
            .map(|s| Platform::parse(&s))
            .unwrap_or_default();

        SaleRecord {
            id: self.string(ID),
            external_id: self.string(EXTERNAL_ID),
            action_type,
            platform,
            revenue: self.decimal(REVENUE).or_zero(),
            net_amount: self.decimal(NET_AMOUNT).or_zero(),
            taxes: self.decimal(TAXES).or_zero(),
            platform_tax: self.decimal(PLATFORM_TAX).or_zero(),
            platform_transaction_tax: self.decimal(PLATFORM_TRANSACTION_TAX).or_zero(),
            affiliate_commission: self.decimal(AFFILIATE_COMMISSION).or_zero(),
            merchant_commission: self.decimal(MERCHANT_COMMISSION).or_zero(),
            cogs: self.decimal(COGS).or_zero(),
            refund_amount: match self.decimal(REFUND_AMOUNT) {
                Coerced::Missing => None,
                other => Some(other.or_zero()),
            },
            product_id: self
                .string(PRODUCT_ID)
                .or_else(|| self.nested_string("product", "id"))
                .map(ProductId::new),
            product_name: self
                .string(PRODUCT_NAME)
                .or_else(|| self.nested_string("product", "name")),
            customer_id: self
                .string(CUSTOMER_ID)
                .or_else(|| self.nested_string("customer", "id")),
            affiliate_id: self
                .string(AFFILIATE_ID)
                .or_else(|| self.nested_string("affiliate", "id"))
                .map(AffiliateId::new),
            affiliate_name: self
                .string(AFFILIATE_NAME)
                .or_else(|| self.nested_string("affiliate", "name")),
            transaction_date: self.timestamp(TRANSACTION_DATE),
        }
    }

    /// First alias present with a non-null value.
    fn lookup(&self, aliases: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        aliases.iter().find_map(|key| match self.row.get(*key) {
            Some(Value::Null) | None => None,
            Some(v) => Some((*key, v)),
        })
    }

    fn string(&self, aliases: &[&'static str]) -> Option<String> {
        self.lookup(aliases).and_then(|(_, v)| coerce_string(Some(v)))
    }

    fn nested_string(&self, object: &str, key: &str) -> Option<String> {
        self.row
            .get(object)
            .and_then(Value::as_object)
            .and_then(|o| coerce_string(o.get(key)))
    }

    fn decimal(&mut self, aliases: &[&'static str]) -> Coerced {
        let Some((field, value)) = self.lookup(aliases) else {
            return Coerced::Missing;
        };
        let coerced = coerce_decimal(Some(value));
        if coerced == Coerced::Malformed {
            self.flag(field, AnomalyKind::MalformedNumber, value);
        }
        coerced
    }

    fn timestamp(&mut self, aliases: &[&'static str]) -> Option<crate::domain::TimeMs> {
        let (field, value) = self.lookup(aliases)?;
        match coerce_timestamp(Some(value)) {
            Ok(t) => t,
            Err(()) => {
                self.flag(field, AnomalyKind::MalformedTimestamp, value);
                None
            }
        }
    }

    fn action_type(&mut self) -> ActionType {
        let Some((field, value)) = self.lookup(ACTION_TYPE) else {
            self.flag(ACTION_TYPE[0], AnomalyKind::MissingActionType, &Value::Null);
            return ActionType::default();
        };
        let Some(raw) = coerce_string(Some(value)) else {
            self.flag(field, AnomalyKind::MissingActionType, value);
            return ActionType::default();
        };

        let lowered = raw.to_ascii_lowercase();
        if NEW_ORDER.contains(&lowered.as_str()) {
            let upsell = self.lookup(UPSELL).map(|(_, v)| coerce_bool(Some(v)));
            return if upsell.unwrap_or(false) {
                ActionType::BackSale
            } else {
                ActionType::FrontSale
            };
        }

        let parsed = ActionType::parse(&raw);
        if let ActionType::Other(_) = parsed {
            self.flag(field, AnomalyKind::UnknownActionType, value);
        }
        parsed
    }

    fn flag(&mut self, field: &'static str, kind: AnomalyKind, value: &Value) {
        self.anomalies.push(Anomaly {
            row_index: self.row_index,
            field,
            kind,
            raw: value.to_string(),
        });
    }
}
