use serde::{Deserialize, Serialize};

use solestock_core::{Entity, RecordId, VariantId};

/// StockX cross-reference for an inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXRef {
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

/// GOAT cross-reference for an inventory record.
///
/// GOAT's own payloads are snake_case, but the dashboard stores these under
/// camelCase keys like everything else on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoatRef {
    pub sku: String,
    #[serde(default, rename = "size_unit", skip_serializing_if = "Option::is_none")]
    pub size_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeConversion {
    pub size: String,
    #[serde(rename = "type")]
    pub system: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeChart {
    pub default_conversion: SizeConversion,
    #[serde(default)]
    pub available_conversions: Vec<SizeConversion>,
}

/// One size of a product, with its own stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub variant_id: VariantId,
    #[serde(default)]
    pub variant_name: String,
    #[serde(default)]
    pub variant_value: String,
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_chart: Option<SizeChart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.variant_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductAttributes {
    pub color: Option<String>,
    pub gender: Option<String>,
    pub release_date: Option<String>,
    pub retail_price: Option<u32>,
    pub season: Option<String>,
    pub colorway: Option<String>,
    pub category: Option<String>,
}

/// A row of the inventory table.
///
/// `quantity` is the warehouse count for the row and is not derived from
/// `variations`; see [`InventoryRecord::variant_quantity_total`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: RecordId,
    pub image: String,
    pub name: String,
    pub style_id: String,
    pub size: String,
    pub quantity: u32,
    pub date_added: String,
    pub warehouse_location: String,
    pub cost: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_listed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_lowest_ask: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expired: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stockx: Option<StockXRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goat: Option<GoatRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_attributes: Option<ProductAttributes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<Variant>,
}

impl InventoryRecord {
    pub fn variant(&self, variant_id: &VariantId) -> Option<&Variant> {
        self.variations.iter().find(|v| &v.variant_id == variant_id)
    }

    pub fn variant_mut(&mut self, variant_id: &VariantId) -> Option<&mut Variant> {
        self.variations.iter_mut().find(|v| &v.variant_id == variant_id)
    }

    /// Sum of the per-variant counts (variants without a count add nothing).
    ///
    /// Reporting only: the parent `quantity` is never reconciled against it.
    pub fn variant_quantity_total(&self) -> u64 {
        self.variations
            .iter()
            .map(|v| u64::from(v.quantity.unwrap_or(0)))
            .sum()
    }
}

impl Entity for InventoryRecord {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A row of the listings table: one ask for one size of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: RecordId,
    pub image: String,
    pub name: String,
    pub style_id: String,
    pub size: String,
    pub cost: f64,
    /// Our current ask.
    pub your_ask: f64,
    /// Listed/available pair such as `"12/5"`, or a plain count.
    pub qty: String,
    pub highest_bid: Option<f64>,
    pub lowest_ask: Option<f64>,
    pub spread: i64,
    pub roi: String,
    pub days_listed: u32,
    pub last_update: String,
    pub is_expired: bool,
}

impl Entity for ListingRecord {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
