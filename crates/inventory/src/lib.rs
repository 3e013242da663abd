//! Inventory and listing domain module.
//!
//! Pure, deterministic view logic over in-memory records: text search,
//! structured filters, per-product grouping for the listing table, the
//! per-variant quantity control and the marketplace payload shapes. No IO,
//! no storage.

pub mod filter;
pub mod grouping;
pub mod market;
pub mod marketplace_listing;
pub mod parse;
pub mod quantity;
pub mod record;

pub use filter::{
    FilterCriteria, Filterable, LowestAskFilter, Searchable, ThresholdType, apply_criteria,
    filter_by_text, filter_records,
};
pub use grouping::{
    GroupedView, ListingView, MISSING_VALUE, ProductGroup, ValueRange, ViewMode, group_by_product,
};
pub use market::{
    GoatAvailability, GoatMarketData, MarketSnapshot, Marketplace, StockXMarketData,
    goat_snapshot_for_size,
};
pub use marketplace_listing::{
    GoatListing, NewListing, StockXAsk, StockXBatch, StockXListing, StockXProduct, StockXVariant,
    VariantListings,
};
pub use parse::shoe_size;
pub use quantity::{QUANTITY_FLOOR, QuantityControl, parse_quantity_input};
pub use record::{
    GoatRef, InventoryRecord, ListingRecord, ProductAttributes, SizeChart, SizeConversion,
    StockXRef, Variant,
};
