//! Record sources: where inventory, listing and marketplace rows come from.
//!
//! Reads are always "give me the whole list"; the catalog narrows them. The
//! writes are a variant's quantity and a new marketplace listing.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use thiserror::Error;

use solestock_core::{DomainError, RecordId, VariantId};
use solestock_inventory::{GoatListing, InventoryRecord, ListingRecord, NewListing, StockXListing};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse records from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record source lock poisoned")]
    Poisoned,
}

pub trait RecordSource: Send + Sync {
    fn inventory(&self) -> Result<Vec<InventoryRecord>, SourceError>;

    fn listings(&self) -> Result<Vec<ListingRecord>, SourceError>;

    fn stockx_listings(&self) -> Result<Vec<StockXListing>, SourceError>;

    fn goat_listings(&self) -> Result<Vec<GoatListing>, SourceError>;

    /// Persist one variant's quantity. The parent record's own `quantity` is
    /// left as is.
    fn set_variant_quantity(
        &self,
        item_id: &RecordId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<(), SourceError>;

    /// Add a listing on its marketplace. Listing ids are unique per
    /// marketplace.
    fn create_listing(&self, listing: NewListing) -> Result<(), SourceError>;
}

impl<S> RecordSource for Arc<S>
where
    S: RecordSource + ?Sized,
{
    fn inventory(&self) -> Result<Vec<InventoryRecord>, SourceError> {
        (**self).inventory()
    }

    fn listings(&self) -> Result<Vec<ListingRecord>, SourceError> {
        (**self).listings()
    }

    fn stockx_listings(&self) -> Result<Vec<StockXListing>, SourceError> {
        (**self).stockx_listings()
    }

    fn goat_listings(&self) -> Result<Vec<GoatListing>, SourceError> {
        (**self).goat_listings()
    }

    fn set_variant_quantity(
        &self,
        item_id: &RecordId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<(), SourceError> {
        (**self).set_variant_quantity(item_id, variant_id, quantity)
    }

    fn create_listing(&self, listing: NewListing) -> Result<(), SourceError> {
        (**self).create_listing(listing)
    }
}

/// Parse a JSON array of records.
pub fn parse_records<T: DeserializeOwned>(
    origin: &str,
    json: &str,
) -> Result<Vec<T>, SourceError> {
    serde_json::from_str(json).map_err(|source| SourceError::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Read and parse a JSON array of records from disk.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SourceError> {
    let json = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&path.display().to_string(), &json)
}

/// In-memory source for the dashboard and tests.
#[derive(Debug, Default)]
pub struct InMemoryRecordSource {
    inventory: RwLock<Vec<InventoryRecord>>,
    listings: RwLock<Vec<ListingRecord>>,
    stockx_listings: RwLock<Vec<StockXListing>>,
    goat_listings: RwLock<Vec<GoatListing>>,
}

impl InMemoryRecordSource {
    pub fn new(inventory: Vec<InventoryRecord>, listings: Vec<ListingRecord>) -> Self {
        Self {
            inventory: RwLock::new(inventory),
            listings: RwLock::new(listings),
            stockx_listings: RwLock::default(),
            goat_listings: RwLock::default(),
        }
    }

    /// Seed the marketplace asks.
    pub fn with_marketplace_listings(
        self,
        stockx: Vec<StockXListing>,
        goat: Vec<GoatListing>,
    ) -> Self {
        Self {
            stockx_listings: RwLock::new(stockx),
            goat_listings: RwLock::new(goat),
            ..self
        }
    }

    /// Replace the inventory rows (e.g. after an upload).
    pub fn replace_inventory(&self, records: Vec<InventoryRecord>) -> Result<(), SourceError> {
        let mut guard = self.inventory.write().map_err(|_| SourceError::Poisoned)?;
        *guard = records;
        Ok(())
    }

    pub fn replace_listings(&self, records: Vec<ListingRecord>) -> Result<(), SourceError> {
        let mut guard = self.listings.write().map_err(|_| SourceError::Poisoned)?;
        *guard = records;
        Ok(())
    }
}

impl RecordSource for InMemoryRecordSource {
    fn inventory(&self) -> Result<Vec<InventoryRecord>, SourceError> {
        let guard = self.inventory.read().map_err(|_| SourceError::Poisoned)?;
        Ok(guard.clone())
    }

    fn listings(&self) -> Result<Vec<ListingRecord>, SourceError> {
        let guard = self.listings.read().map_err(|_| SourceError::Poisoned)?;
        Ok(guard.clone())
    }

    fn stockx_listings(&self) -> Result<Vec<StockXListing>, SourceError> {
        let guard = self.stockx_listings.read().map_err(|_| SourceError::Poisoned)?;
        Ok(guard.clone())
    }

    fn goat_listings(&self) -> Result<Vec<GoatListing>, SourceError> {
        let guard = self.goat_listings.read().map_err(|_| SourceError::Poisoned)?;
        Ok(guard.clone())
    }

    fn set_variant_quantity(
        &self,
        item_id: &RecordId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<(), SourceError> {
        let mut guard = self.inventory.write().map_err(|_| SourceError::Poisoned)?;
        let item = guard
            .iter_mut()
            .find(|r| &r.id == item_id)
            .ok_or_else(|| DomainError::not_found(format!("inventory item {item_id}")))?;
        let variant = item.variant_mut(variant_id).ok_or_else(|| {
            DomainError::not_found(format!("variant {variant_id} of item {item_id}"))
        })?;
        variant.quantity = Some(quantity);
        Ok(())
    }

    fn create_listing(&self, listing: NewListing) -> Result<(), SourceError> {
        let duplicate = || {
            DomainError::validation(format!(
                "{} listing {} already exists",
                listing.marketplace(),
                listing.listing_id()
            ))
        };
        match &listing {
            NewListing::StockX(new) => {
                let mut guard = self.stockx_listings.write().map_err(|_| SourceError::Poisoned)?;
                if guard.iter().any(|l| l.listing_id == new.listing_id) {
                    return Err(duplicate().into());
                }
                guard.push(new.clone());
            }
            NewListing::Goat(new) => {
                let mut guard = self.goat_listings.write().map_err(|_| SourceError::Poisoned)?;
                if guard.iter().any(|l| l.id == new.id) {
                    return Err(duplicate().into());
                }
                guard.push(new.clone());
            }
        }
        Ok(())
    }
}
