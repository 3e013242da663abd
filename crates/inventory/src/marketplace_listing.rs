//! Per-variant asks on the two marketplaces, in each marketplace's own shape.
//!
//! StockX payloads are camelCase with dollar strings; GOAT payloads are
//! snake_case with cent strings. Opaque sub-documents the dashboard never
//! reads (orders, shipments, authentication) are kept as raw JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solestock_core::VariantId;

use crate::market::Marketplace;
use crate::parse::{cents_to_dollars, dollars};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXAsk {
    pub ask_id: String,
    pub ask_created_at: DateTime<Utc>,
    pub ask_updated_at: DateTime<Utc>,
    pub ask_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXProduct {
    pub product_id: String,
    pub product_name: String,
    pub style_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXVariant {
    pub variant_id: VariantId,
    #[serde(default)]
    pub variant_name: String,
    #[serde(default)]
    pub variant_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXBatch {
    pub batch_id: String,
    pub task_id: String,
}

/// One StockX ask for a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXListing {
    pub listing_id: String,
    pub amount: String,
    pub currency_code: String,
    pub status: String,
    pub inventory_type: String,
    pub ask: StockXAsk,
    pub product: StockXProduct,
    pub variant: StockXVariant,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<StockXBatch>,
    #[serde(default)]
    pub order: Option<serde_json::Value>,
    #[serde(default)]
    pub authentication_details: Option<serde_json::Value>,
    #[serde(default)]
    pub initiated_shipments: Option<serde_json::Value>,
}

impl StockXListing {
    /// Ask amount in dollars.
    pub fn price(&self) -> Option<f64> {
        dollars(&self.amount)
    }

    pub fn size_label(&self) -> String {
        format!("US {}", self.variant.variant_value)
    }

    pub fn is_for_variant(&self, variant_id: &VariantId) -> bool {
        &self.variant.variant_id == variant_id
    }

    pub fn is_ask_expired(&self, now: DateTime<Utc>) -> bool {
        self.ask.ask_expires_at <= now
    }
}

/// One GOAT listing. GOAT lists by size, not by variant id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoatListing {
    pub id: String,
    pub catalog_id: String,
    pub condition: String,
    pub packaging_condition: String,
    pub size: f64,
    pub size_unit: String,
    pub sku: String,
    #[serde(default)]
    pub consigned: bool,
    pub status: String,
    pub price_cents: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub activated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub defects: Vec<String>,
    #[serde(default)]
    pub additional_defects: String,
}

impl GoatListing {
    /// Listing price in dollars.
    pub fn price(&self) -> Option<f64> {
        cents_to_dollars(&self.price_cents)
    }

    /// `"9.5 US"` from `size: 9.5, size_unit: "SIZE_UNIT_US"`.
    pub fn size_label(&self) -> String {
        let unit = self.size_unit.trim_start_matches("SIZE_UNIT_");
        format!("{} {unit}", self.size)
    }

    /// `"ACTIVE"` from `"LISTING_STATUS_ACTIVE"`.
    pub fn status_label(&self) -> &str {
        self.status.trim_start_matches("LISTING_STATUS_")
    }

    pub fn condition_label(&self) -> &str {
        match self.condition.as_str() {
            "CONDITION_NEW" => "New",
            "CONDITION_USED" => "Used",
            "CONDITION_NEW_WITH_DEFECTS" => "New w/ Defects",
            other => other,
        }
    }

    pub fn is_size(&self, size: f64) -> bool {
        (self.size - size).abs() < f64::EPSILON
    }
}

/// Everything listed for one variant, per marketplace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariantListings {
    pub stockx: Vec<StockXListing>,
    pub goat: Vec<GoatListing>,
}

impl VariantListings {
    pub fn len(&self) -> usize {
        self.stockx.len() + self.goat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A listing to create on one marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", content = "listing", rename_all = "lowercase")]
pub enum NewListing {
    StockX(StockXListing),
    Goat(GoatListing),
}

impl NewListing {
    pub fn marketplace(&self) -> Marketplace {
        match self {
            NewListing::StockX(_) => Marketplace::StockX,
            NewListing::Goat(_) => Marketplace::Goat,
        }
    }

    pub fn listing_id(&self) -> &str {
        match self {
            NewListing::StockX(l) => &l.listing_id,
            NewListing::Goat(l) => &l.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOCKX: &str = r#"{
        "amount": "150",
        "ask": {
            "askId": "ask123",
            "askCreatedAt": "2025-01-01T10:00:00Z",
            "askUpdatedAt": "2025-01-01T10:00:00Z",
            "askExpiresAt": "2025-01-31T10:00:00Z"
        },
        "order": null,
        "product": {
            "productId": "prod123",
            "productName": "Nike Air Max 1 SC Dark Stucco",
            "styleId": "NK12345-001"
        },
        "variant": { "variantId": "var123", "variantName": "US 9", "variantValue": "9" },
        "currencyCode": "USD",
        "listingId": "list123",
        "status": "ACTIVE",
        "inventoryType": "STANDARD",
        "createdAt": "2025-01-01T10:00:00Z",
        "updatedAt": "2025-01-01T10:00:00Z",
        "authenticationDetails": null,
        "batch": { "batchId": "batch123", "taskId": "task123" },
        "initiatedShipments": null
    }"#;

    const GOAT: &str = r#"{
        "id": "g123",
        "catalog_id": "cat123",
        "condition": "CONDITION_NEW_WITH_DEFECTS",
        "packaging_condition": "PACKAGING_CONDITION_GOOD_CONDITION",
        "size": 9.5,
        "size_unit": "SIZE_UNIT_US",
        "sku": "TB00073-009",
        "consigned": false,
        "created_at": "2025-01-01T10:00:00Z",
        "updated_at": "2025-01-02T10:00:00Z",
        "status": "LISTING_STATUS_ACTIVE",
        "price_cents": "15000",
        "activated_at": "2025-01-01T10:05:00Z",
        "defects": ["scuffed box"],
        "additional_defects": ""
    }"#;

    fn at(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn stockx_listing_reads_its_payload() {
        let listing: StockXListing = serde_json::from_str(STOCKX).unwrap();
        assert_eq!(listing.price(), Some(150.0));
        assert_eq!(listing.size_label(), "US 9");
        assert!(listing.is_for_variant(&VariantId::new("var123")));
        assert!(!listing.is_for_variant(&VariantId::new("var124")));
        assert!(listing.order.is_none());
        assert_eq!(listing.batch.as_ref().unwrap().task_id, "task123");

        assert!(!listing.is_ask_expired(at("2025-01-15T00:00:00Z")));
        assert!(listing.is_ask_expired(at("2025-01-31T10:00:00Z")));
    }

    #[test]
    fn goat_listing_labels() {
        let listing: GoatListing = serde_json::from_str(GOAT).unwrap();
        assert_eq!(listing.price(), Some(150.0));
        assert_eq!(listing.size_label(), "9.5 US");
        assert_eq!(listing.status_label(), "ACTIVE");
        assert_eq!(listing.condition_label(), "New w/ Defects");
        assert!(listing.is_size(9.5));
        assert!(!listing.is_size(9.0));
    }

    #[test]
    fn unknown_condition_is_shown_raw() {
        let mut listing: GoatListing = serde_json::from_str(GOAT).unwrap();
        listing.condition = "CONDITION_VINTAGE".to_string();
        assert_eq!(listing.condition_label(), "CONDITION_VINTAGE");
        listing.condition = "CONDITION_USED".to_string();
        assert_eq!(listing.condition_label(), "Used");
    }

    #[test]
    fn new_listing_is_tagged_by_platform() {
        let goat: GoatListing = serde_json::from_str(GOAT).unwrap();
        let new = NewListing::Goat(goat);
        assert_eq!(new.marketplace(), Marketplace::Goat);
        assert_eq!(new.listing_id(), "g123");

        let json = serde_json::to_value(&new).unwrap();
        assert_eq!(json["platform"], "goat");
        assert_eq!(json["listing"]["price_cents"], "15000");
    }
}
