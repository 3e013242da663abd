//! View session: the state behind the inventory and listing pages.
//!
//! Every setter recomputes the visible rows from the catalog. Rebuilding the
//! grouped view starts with every group collapsed, so it is only rebuilt when
//! the listing rows or the view mode can have changed.

use chrono::{DateTime, Utc};

use solestock_core::{DomainError, RecordId, VariantId};
use solestock_events::{EventBus, Notification, QuantityChange};
use solestock_infra::{CatalogError, CatalogService, RecordSource};
use solestock_inventory::{
    FilterCriteria, InventoryRecord, ListingView, QUANTITY_FLOOR, QuantityControl,
    VariantListings, ViewMode,
};

pub struct DashboardSession<S, B>
where
    S: RecordSource,
    B: EventBus<Notification> + Clone,
{
    catalog: CatalogService<S, B>,
    query: String,
    criteria: Option<FilterCriteria>,
    mode: ViewMode,
    inventory: Vec<InventoryRecord>,
    listings: ListingView,
}

impl<S, B> DashboardSession<S, B>
where
    S: RecordSource,
    B: EventBus<Notification> + Clone,
{
    pub fn new(
        catalog: CatalogService<S, B>,
        query: impl Into<String>,
        mode: ViewMode,
        now: DateTime<Utc>,
    ) -> Result<Self, CatalogError> {
        let mut session = Self {
            catalog,
            query: query.into(),
            criteria: None,
            mode,
            inventory: Vec::new(),
            listings: ListingView::Simple(Vec::new()),
        };
        session.refresh(now)?;
        Ok(session)
    }

    pub fn catalog(&self) -> &CatalogService<S, B> {
        &self.catalog
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn criteria(&self) -> Option<&FilterCriteria> {
        self.criteria.as_ref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    pub fn inventory(&self) -> &[InventoryRecord] {
        &self.inventory
    }

    pub fn listings(&self) -> &ListingView {
        &self.listings
    }

    pub fn set_query(
        &mut self,
        query: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        self.query = query.into();
        self.refresh(now)
    }

    pub fn apply_filters(
        &mut self,
        criteria: FilterCriteria,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        self.criteria = Some(criteria);
        self.refresh(now)
    }

    pub fn clear_filters(&mut self, now: DateTime<Utc>) -> Result<(), CatalogError> {
        self.criteria = None;
        self.refresh(now)
    }

    pub fn set_view_mode(
        &mut self,
        mode: ViewMode,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        self.mode = mode;
        self.refresh(now)
    }

    /// Expand or collapse a product group. `None` in simple mode or for an
    /// unknown group.
    pub fn toggle_group(&mut self, key: &str) -> Option<bool> {
        match &mut self.listings {
            ListingView::Grouped(view) => view.toggle(key),
            ListingView::Simple(_) => None,
        }
    }

    /// Re-read both tables through the catalog.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Result<(), CatalogError> {
        self.refresh_inventory(now)?;
        self.listings = self.catalog.listings(&self.query, self.criteria.as_ref(), self.mode, now)?;
        tracing::debug!(
            query = %self.query,
            inventory = self.inventory.len(),
            listings = self.listings.row_count(),
            "dashboard refreshed"
        );
        Ok(())
    }

    /// Re-read the inventory table only. The listing view and its expansion
    /// state are left alone.
    pub fn refresh_inventory(&mut self, now: DateTime<Utc>) -> Result<(), CatalogError> {
        self.inventory = self.catalog.inventory(&self.query, self.criteria.as_ref(), now)?;
        Ok(())
    }

    /// A stepper for one variant, starting at its stored quantity.
    ///
    /// Variants without a stored count start at the floor.
    pub fn quantity_control(
        &self,
        item_id: &RecordId,
        variant_id: &VariantId,
        now: DateTime<Utc>,
    ) -> Result<QuantityControl<B>, CatalogError> {
        let item = self.catalog.inventory_item(item_id, now)?;
        let variant = item.variant(variant_id).ok_or_else(|| {
            DomainError::not_found(format!("variant {variant_id} of item {item_id}"))
        })?;
        let initial = variant.quantity.unwrap_or(QUANTITY_FLOOR);
        let control = QuantityControl::new(variant_id.clone(), initial, self.catalog.bus().clone());
        Ok(control.for_item(item_id.clone()))
    }

    /// StockX and GOAT asks for one variant of an item.
    pub fn variant_listings(
        &self,
        item_id: &RecordId,
        variant_id: &VariantId,
        now: DateTime<Utc>,
    ) -> Result<VariantListings, CatalogError> {
        let item = self.catalog.inventory_item(item_id, now)?;
        let variant = item.variant(variant_id).ok_or_else(|| {
            DomainError::not_found(format!("variant {variant_id} of item {item_id}"))
        })?;
        self.catalog.variant_listings(variant, now)
    }

    /// Persist a change produced by a [`QuantityControl`].
    ///
    /// Variant quantities only show in the inventory table, so the listing
    /// view (and which groups are open) survives the save.
    pub fn save_quantity(
        &mut self,
        item_id: &RecordId,
        change: &QuantityChange,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        self.catalog
            .update_variant_quantity(item_id, &change.variant_id, change.quantity, now)?;
        self.refresh_inventory(now)
    }
}
