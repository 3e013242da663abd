//! Sample records bundled with the binary so it runs without any files.

use solestock_infra::{InMemoryRecordSource, SourceError, parse_records};
use solestock_inventory::{GoatListing, InventoryRecord, ListingRecord, StockXListing};

const INVENTORY_JSON: &str = include_str!("../data/inventory.json");
const LISTINGS_JSON: &str = include_str!("../data/listings.json");
const STOCKX_LISTINGS_JSON: &str = include_str!("../data/stockx_listings.json");
const GOAT_LISTINGS_JSON: &str = include_str!("../data/goat_listings.json");

pub fn sample_inventory() -> Result<Vec<InventoryRecord>, SourceError> {
    parse_records("bundled inventory.json", INVENTORY_JSON)
}

pub fn sample_listings() -> Result<Vec<ListingRecord>, SourceError> {
    parse_records("bundled listings.json", LISTINGS_JSON)
}

pub fn sample_stockx_listings() -> Result<Vec<StockXListing>, SourceError> {
    parse_records("bundled stockx_listings.json", STOCKX_LISTINGS_JSON)
}

pub fn sample_goat_listings() -> Result<Vec<GoatListing>, SourceError> {
    parse_records("bundled goat_listings.json", GOAT_LISTINGS_JSON)
}

pub fn sample_source() -> Result<InMemoryRecordSource, SourceError> {
    let source = InMemoryRecordSource::new(sample_inventory()?, sample_listings()?)
        .with_marketplace_listings(sample_stockx_listings()?, sample_goat_listings()?);
    Ok(source)
}
