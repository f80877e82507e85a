use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Order payload sent with a parcel creation request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderData {
    /// Recipient name
    pub customer_name: String,
    /// Recipient phone number
    pub customer_phone: String,
    /// Delivery address
    pub address: String,
    /// Destination region
    pub wilaya: String,
    /// Destination commune
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commune: Option<String>,
    /// Amount to collect on delivery
    #[serde(default)]
    pub amount: f64,
    /// Free-form product description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<String>,
    /// Carrier-specific fields passed through as-is
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Parcel data returned by create, get and list
///
/// Only the fields every carrier returns are typed; the rest is kept in
/// `extra` untouched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ParcelResponse {
    /// Whether the carrier accepted the request
    #[serde(default)]
    pub success: bool,
    /// Tracking id of the parcel, absent for list responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    /// Carrier status label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Everything else the carrier sent
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Rate lookup and comparison results, untyped
pub type RateResponse = Value;

/// Region listing, untyped
pub type RegionList = Value;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Test parcel response keeps unknown carrier fields
    #[test]
    fn test_parcel_response_with_extra_fields() {
        let parcel: ParcelResponse = serde_json::from_value(json!({
            "success": true,
            "tracking_id": "YAL-123",
            "status": "in_transit",
            "label_url": "https://example.test/label.pdf",
            "fees": 450
        }))
        .unwrap();

        assert!(parcel.success);
        assert_eq!(parcel.tracking_id.as_deref(), Some("YAL-123"));
        assert_eq!(parcel.status.as_deref(), Some("in_transit"));
        assert_eq!(parcel.extra.get("fees"), Some(&json!(450)));
        assert!(parcel.extra.contains_key("label_url"));
    }

    /// Test order serialization omits unset optional fields
    #[test]
    fn test_order_without_optional_fields() {
        let order = OrderData {
            customer_name: "Amina".to_string(),
            customer_phone: "0550000000".to_string(),
            address: "12 rue Didouche Mourad".to_string(),
            wilaya: "Alger".to_string(),
            commune: None,
            amount: 2500.0,
            products: None,
            extra: HashMap::new(),
        };

        let json_str = serde_json::to_string(&order).unwrap();
        assert!(!json_str.contains("commune"));
        assert!(!json_str.contains("products"));
        assert!(json_str.contains("\"wilaya\":\"Alger\""));
    }
}
