//! Catalog service: record source + query caches + notifications.
//!
//! This is what the table views call. Reads go through the caches. A variant
//! quantity write patches the caches optimistically, writes to the source,
//! rolls back on failure and always invalidates afterwards. Creating a
//! marketplace listing always invalidates that marketplace's listings.

use chrono::{DateTime, Utc};
use thiserror::Error;

use solestock_core::{DomainError, RecordId, VariantId};
use solestock_events::{EventBus, Notification, QuantityChange};
use solestock_inventory::{
    FilterCriteria, GoatListing, InventoryRecord, ListingRecord, ListingView, MarketSnapshot,
    Marketplace, NewListing, StockXListing, Variant, VariantListings, ViewMode, filter_records,
    shoe_size,
};

use crate::config::CacheSettings;
use crate::query_cache::{QueryCache, QueryKey, QueryScope};
use crate::source::{RecordSource, SourceError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

pub struct CatalogService<S, B>
where
    S: RecordSource,
    B: EventBus<Notification>,
{
    source: S,
    bus: B,
    inventory_lists: QueryCache<Vec<InventoryRecord>>,
    inventory_details: QueryCache<InventoryRecord>,
    listing_lists: QueryCache<Vec<ListingRecord>>,
    market_data: QueryCache<MarketSnapshot>,
    stockx_listings: QueryCache<Vec<StockXListing>>,
    goat_listings: QueryCache<Vec<GoatListing>>,
}

impl<S, B> CatalogService<S, B>
where
    S: RecordSource,
    B: EventBus<Notification>,
{
    pub fn new(source: S, bus: B, cache: CacheSettings) -> Self {
        Self {
            source,
            bus,
            inventory_lists: QueryCache::new(cache.list_stale_after),
            inventory_details: QueryCache::new(cache.list_stale_after),
            listing_lists: QueryCache::new(cache.list_stale_after),
            market_data: QueryCache::new(cache.market_stale_after),
            stockx_listings: QueryCache::new(cache.list_stale_after),
            goat_listings: QueryCache::new(cache.list_stale_after),
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Visible inventory rows for a search and optional criteria.
    pub fn inventory(
        &self,
        query: &str,
        criteria: Option<&FilterCriteria>,
        now: DateTime<Utc>,
    ) -> Result<Vec<InventoryRecord>, CatalogError> {
        let key = QueryKey::inventory_list(query, criteria);
        let rows = self.inventory_lists.get_or_fetch(key, now, || {
            let all = self.source.inventory()?;
            Ok::<_, CatalogError>(filter_records(&all, query, criteria))
        })?;
        Ok(rows)
    }

    /// One inventory record by id.
    pub fn inventory_item(
        &self,
        id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<InventoryRecord, CatalogError> {
        let key = QueryKey::inventory_detail(id);
        self.inventory_details.get_or_fetch(key, now, || -> Result<_, CatalogError> {
            self.source
                .inventory()?
                .into_iter()
                .find(|r| &r.id == id)
                .ok_or_else(|| {
                    DomainError::not_found(format!("inventory item {id}")).into()
                })
        })
    }

    /// The listing table: filtered rows, grouped when asked.
    ///
    /// Only the filtered rows are cached; groups are rebuilt on every call.
    pub fn listings(
        &self,
        query: &str,
        criteria: Option<&FilterCriteria>,
        mode: ViewMode,
        now: DateTime<Utc>,
    ) -> Result<ListingView, CatalogError> {
        let key = QueryKey::listing_list(query, criteria);
        let rows = self.listing_lists.get_or_fetch(key, now, || {
            let all = self.source.listings()?;
            Ok::<_, CatalogError>(filter_records(&all, query, criteria))
        })?;
        Ok(ListingView::build(rows, mode))
    }

    /// Market prices for one variant, fetched from the marketplace on a miss.
    ///
    /// Market entries go stale faster than lists.
    pub fn market_snapshot<E, F>(
        &self,
        marketplace: Marketplace,
        variant_id: &VariantId,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<MarketSnapshot, E>
    where
        F: FnOnce() -> Result<MarketSnapshot, E>,
    {
        let key = QueryKey::market_data(marketplace, variant_id);
        self.market_data.get_or_fetch(key, now, fetch)
    }

    /// StockX asks for one variant. A blank variant id asks for nothing.
    pub fn stockx_listings(
        &self,
        variant_id: &VariantId,
        now: DateTime<Utc>,
    ) -> Result<Vec<StockXListing>, CatalogError> {
        if variant_id.as_str().trim().is_empty() {
            return Ok(Vec::new());
        }
        let key = QueryKey::stockx_listings(variant_id);
        self.stockx_listings.get_or_fetch(key, now, || {
            let all = self.source.stockx_listings()?;
            let rows = all.into_iter().filter(|l| l.is_for_variant(variant_id));
            Ok::<_, CatalogError>(rows.collect())
        })
    }

    /// GOAT listings for a size label such as `"9.5"` or `"US M 9.5"`.
    ///
    /// A blank or non-numeric size asks for nothing.
    pub fn goat_listings(
        &self,
        size: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<GoatListing>, CatalogError> {
        let Some(wanted) = shoe_size(size) else {
            return Ok(Vec::new());
        };
        let key = QueryKey::goat_listings(size);
        self.goat_listings.get_or_fetch(key, now, || {
            let all = self.source.goat_listings()?;
            let rows = all.into_iter().filter(|l| l.is_size(wanted));
            Ok::<_, CatalogError>(rows.collect())
        })
    }

    /// Both marketplaces' listings for one variant: StockX by variant id,
    /// GOAT by size.
    pub fn variant_listings(
        &self,
        variant: &Variant,
        now: DateTime<Utc>,
    ) -> Result<VariantListings, CatalogError> {
        Ok(VariantListings {
            stockx: self.stockx_listings(&variant.variant_id, now)?,
            goat: self.goat_listings(&variant.size, now)?,
        })
    }

    /// Create a listing on its marketplace.
    ///
    /// That marketplace's cached listings are dropped whether or not the
    /// write succeeds.
    pub fn create_listing(
        &self,
        listing: NewListing,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        let marketplace = listing.marketplace();
        let listing_id = listing.listing_id().to_string();

        let result = self.source.create_listing(listing);
        match &result {
            Ok(()) => tracing::info!(%marketplace, %listing_id, "listing created"),
            Err(err) => {
                tracing::warn!(%marketplace, %listing_id, "listing create failed: {err}")
            }
        }

        self.invalidate_marketplace_listings(marketplace, now);
        result.map_err(CatalogError::from)
    }

    /// Set one variant's quantity.
    ///
    /// Quantities below 1 are rejected. The parent record's `quantity` is not
    /// recomputed from its variants.
    pub fn update_variant_quantity(
        &self,
        item_id: &RecordId,
        variant_id: &VariantId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<QuantityChange, CatalogError> {
        if quantity < 1 {
            let err = DomainError::validation("quantity must be at least 1");
            return Err(err.into());
        }

        let lists_before = self.inventory_lists.snapshot(QueryScope::InventoryLists);
        let details_before = self.inventory_details.snapshot(QueryScope::InventoryDetails);

        let patch = |record: &mut InventoryRecord| {
            if &record.id == item_id {
                if let Some(v) = record.variant_mut(variant_id) {
                    v.quantity = Some(quantity);
                }
            }
        };
        self.inventory_lists.update_scope(QueryScope::InventoryLists, |rows| {
            rows.iter_mut().for_each(patch)
        });
        self.inventory_details
            .update(&QueryKey::inventory_detail(item_id), patch);

        let result = self.source.set_variant_quantity(item_id, variant_id, quantity);

        let outcome = match result {
            Ok(()) => {
                let change = QuantityChange {
                    variant_id: variant_id.clone(),
                    quantity,
                };
                tracing::info!(%item_id, %variant_id, quantity, "variant quantity saved");
                let saved = Notification::quantity_saved(item_id.clone(), change.clone(), now);
                self.notify(saved);
                Ok(change)
            }
            Err(err) => {
                tracing::warn!(%item_id, %variant_id, "variant quantity write failed: {err}");
                self.inventory_lists.restore(lists_before);
                self.inventory_details.restore(details_before);
                self.notify(Notification::quantity_failed(
                    item_id.clone(),
                    variant_id.clone(),
                    err.to_string(),
                    now,
                ));
                Err(err.into())
            }
        };

        self.invalidate_inventory(Some(item_id), now);
        outcome
    }

    /// Drop cached inventory lists (and one item's detail, if given).
    pub fn invalidate_inventory(&self, item_id: Option<&RecordId>, now: DateTime<Utc>) {
        let lists = self.inventory_lists.invalidate_scope(QueryScope::InventoryLists);
        let detail = item_id.is_some_and(|id| {
            let key = QueryKey::inventory_detail(id);
            self.inventory_details.invalidate(&key)
        });
        tracing::info!(lists, detail, "inventory cache invalidated");
        let scope = QueryScope::InventoryLists;
        self.notify(Notification::cache_invalidated(scope.as_str(), now));
    }

    pub fn invalidate_listings(&self, now: DateTime<Utc>) {
        let scope = QueryScope::ListingLists;
        let lists = self.listing_lists.invalidate_scope(scope);
        tracing::info!(lists, "listing cache invalidated");
        self.notify(Notification::cache_invalidated(scope.as_str(), now));
    }

    pub fn invalidate_market_data(&self, now: DateTime<Utc>) {
        let scope = QueryScope::MarketData;
        let entries = self.market_data.invalidate_scope(scope);
        tracing::info!(entries, "market data cache invalidated");
        self.notify(Notification::cache_invalidated(scope.as_str(), now));
    }

    pub fn invalidate_marketplace_listings(&self, marketplace: Marketplace, now: DateTime<Utc>) {
        let (scope, entries) = match marketplace {
            Marketplace::StockX => {
                let scope = QueryScope::StockXListings;
                (scope, self.stockx_listings.invalidate_scope(scope))
            }
            Marketplace::Goat => {
                let scope = QueryScope::GoatListings;
                (scope, self.goat_listings.invalidate_scope(scope))
            }
        };
        tracing::info!(%marketplace, entries, "marketplace listing cache invalidated");
        self.notify(Notification::cache_invalidated(scope.as_str(), now));
    }

    fn notify(&self, notification: Notification) {
        if let Err(err) = self.bus.publish(notification) {
            tracing::warn!("failed to publish notification: {err}");
        }
    }
}
