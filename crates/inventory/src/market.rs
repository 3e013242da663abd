//! Marketplace market data as the two marketplaces deliver it, plus a common
//! dollar-denominated snapshot for the detail panel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parse::{cents_to_dollars, dollars, shoe_size};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    StockX,
    Goat,
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Marketplace::StockX => "StockX",
            Marketplace::Goat => "GOAT",
        })
    }
}

/// StockX market data for one variant. Amounts are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXMarketData {
    pub product_id: String,
    pub variant_id: String,
    pub currency_code: String,
    pub highest_bid_amount: Option<String>,
    pub lowest_ask_amount: Option<String>,
    #[serde(default)]
    pub flex_lowest_ask_amount: Option<String>,
}

/// GOAT price points, integer cents as strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoatAvailability {
    pub lowest_listing_price_cents: Option<String>,
    pub highest_offer_price_cents: Option<String>,
    pub last_sold_listing_price_cents: Option<String>,
    pub global_indicator_price_cents: Option<String>,
}

/// GOAT market data for one size/condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoatMarketData {
    pub size: f64,
    pub product_condition: String,
    pub packaging_condition: String,
    pub availability: GoatAvailability,
}

/// Market prices in dollars. Missing or unparsable amounts are `None`.
///
/// `flex_lowest_ask` is StockX only; `last_sale` and `global_indicator` are
/// GOAT only.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub marketplace: Marketplace,
    pub highest_bid: Option<f64>,
    pub lowest_ask: Option<f64>,
    pub flex_lowest_ask: Option<f64>,
    pub last_sale: Option<f64>,
    pub global_indicator: Option<f64>,
}

impl MarketSnapshot {
    /// Lowest ask minus highest bid, when both exist.
    pub fn bid_ask_gap(&self) -> Option<f64> {
        Some(self.lowest_ask? - self.highest_bid?)
    }
}

impl From<&StockXMarketData> for MarketSnapshot {
    fn from(data: &StockXMarketData) -> Self {
        let parse = |v: &Option<String>| v.as_deref().and_then(dollars);
        Self {
            marketplace: Marketplace::StockX,
            highest_bid: parse(&data.highest_bid_amount),
            lowest_ask: parse(&data.lowest_ask_amount),
            flex_lowest_ask: parse(&data.flex_lowest_ask_amount),
            last_sale: None,
            global_indicator: None,
        }
    }
}

impl From<&GoatMarketData> for MarketSnapshot {
    fn from(data: &GoatMarketData) -> Self {
        let parse = |v: &Option<String>| v.as_deref().and_then(cents_to_dollars);
        let a = &data.availability;
        Self {
            marketplace: Marketplace::Goat,
            highest_bid: parse(&a.highest_offer_price_cents),
            lowest_ask: parse(&a.lowest_listing_price_cents),
            flex_lowest_ask: None,
            last_sale: parse(&a.last_sold_listing_price_cents),
            global_indicator: parse(&a.global_indicator_price_cents),
        }
    }
}

/// Pick the GOAT row for a size such as `"9"`, `"9.5"` or `"US 9.5"`.
pub fn goat_snapshot_for_size(rows: &[GoatMarketData], size: &str) -> Option<MarketSnapshot> {
    let wanted = shoe_size(size)?;
    rows.iter()
        .find(|r| (r.size - wanted).abs() < f64::EPSILON)
        .map(MarketSnapshot::from)
}
