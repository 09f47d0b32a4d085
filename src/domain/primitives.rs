//! Domain primitives: TimeMs, Platform, ActionType and the foreign-key ids.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn now() -> Self {
        TimeMs(Utc::now().timestamp_millis())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        TimeMs(dt.timestamp_millis())
    }

    /// Convert back to a UTC datetime; out-of-range values clamp to the epoch.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Affiliate network / checkout platform a sale came from.
///
/// Parsed case-insensitively; unknown platforms are kept verbatim
/// (lowercased) so they still group and filter consistently.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Buygoods,
    Clickbank,
    Cartpanda,
    Digistore,
    Other(String),
}

impl Platform {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "buygoods" => Platform::Buygoods,
            "clickbank" => Platform::Clickbank,
            "cartpanda" => Platform::Cartpanda,
            "digistore" | "digistore24" => Platform::Digistore,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Platform::Buygoods => "buygoods",
            Platform::Clickbank => "clickbank",
            Platform::Cartpanda => "cartpanda",
            Platform::Digistore => "digistore",
            Platform::Other(s) => s.as_str(),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Other(String::new())
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        Platform::parse(&value)
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a sales event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    FrontSale,
    BackSale,
    Rebill,
    Refund,
    Chargeback,
    /// Chargeback raised inside the refund window.
    ChargebackRefundTime,
    Other(String),
}

impl ActionType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "front_sale" | "frontsale" | "front" => ActionType::FrontSale,
            "back_sale" | "backsale" | "upsell" => ActionType::BackSale,
            "rebill" | "recurring" => ActionType::Rebill,
            "refund" => ActionType::Refund,
            "chargeback" => ActionType::Chargeback,
            "chargebackrefundtime" | "chargeback_refund_time" => ActionType::ChargebackRefundTime,
            other => ActionType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionType::FrontSale => "front_sale",
            ActionType::BackSale => "back_sale",
            ActionType::Rebill => "rebill",
            ActionType::Refund => "refund",
            ActionType::Chargeback => "chargeback",
            ActionType::ChargebackRefundTime => "chargebackrefundtime",
            ActionType::Other(s) => s.as_str(),
        }
    }

    /// Sales that bring money in: front sales, back sales and rebills.
    pub fn is_income(&self) -> bool {
        matches!(
            self,
            ActionType::FrontSale | ActionType::BackSale | ActionType::Rebill
        )
    }

    /// Events whose cost is computed by the refund calculator.
    pub fn is_refund_class(&self) -> bool {
        matches!(
            self,
            ActionType::Refund | ActionType::Chargeback | ActionType::ChargebackRefundTime
        )
    }

    pub fn is_chargeback(&self) -> bool {
        matches!(
            self,
            ActionType::Chargeback | ActionType::ChargebackRefundTime
        )
    }
}

impl Default for ActionType {
    fn default() -> Self {
        ActionType::Other(String::new())
    }
}

impl From<String> for ActionType {
    fn from(value: String) -> Self {
        ActionType::parse(&value)
    }
}

impl From<ActionType> for String {
    fn from(value: ActionType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Affiliate foreign key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AffiliateId(pub String);

impl AffiliateId {
    pub fn new(id: String) -> Self {
        AffiliateId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AffiliateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Product foreign key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(id: String) -> Self {
        ProductId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse_case_insensitive() {
        assert_eq!(Platform::parse("BUYGOODS"), Platform::Buygoods);
        assert_eq!(Platform::parse(" ClickBank "), Platform::Clickbank);
        assert_eq!(Platform::parse("Digistore24"), Platform::Digistore);
        assert_eq!(
            Platform::parse("Stripe"),
            Platform::Other("stripe".to_string())
        );
    }

    #[test]
    fn test_platform_serializes_lowercase() {
        let json = serde_json::to_string(&Platform::Cartpanda).unwrap();
        assert_eq!(json, "\"cartpanda\"");
        let parsed: Platform = serde_json::from_str("\"CARTPANDA\"").unwrap();
        assert_eq!(parsed, Platform::Cartpanda);
    }

    #[test]
    fn test_action_type_classes() {
        assert!(ActionType::FrontSale.is_income());
        assert!(ActionType::Rebill.is_income());
        assert!(!ActionType::Refund.is_income());
        assert!(ActionType::ChargebackRefundTime.is_refund_class());
        assert!(ActionType::ChargebackRefundTime.is_chargeback());
        assert!(!ActionType::Refund.is_chargeback());
        assert!(!ActionType::Other("neworder".to_string()).is_refund_class());
    }

    #[test]
    fn test_action_type_roundtrips_through_string() {
        for s in [
            "front_sale",
            "back_sale",
            "rebill",
            "refund",
            "chargeback",
            "chargebackrefundtime",
        ] {
            assert_eq!(ActionType::parse(s).as_str(), s);
        }
    }

    #[test]
    fn test_timems_datetime_conversion() {
        let t = TimeMs::new(1_700_000_000_000);
        assert_eq!(TimeMs::from_datetime(t.to_datetime()), t);
    }
}
