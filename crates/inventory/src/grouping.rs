//! Grouped listing view: size-level listings folded into one row per product.
//!
//! Groups are rebuilt wholesale from the filtered listings whenever the
//! filter or view mode changes. Expansion state is keyed by the product name
//! and is cleared on every rebuild.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use solestock_core::DomainError;

use crate::parse::{format_percent, format_price, listed_quantity, roi_percent};
use crate::record::ListingRecord;

/// Rendered in place of a value that does not exist (e.g. no member has a
/// market lowest ask).
pub const MISSING_VALUE: &str = "—";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Simple,
    Grouped,
}

impl FromStr for ViewMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(ViewMode::Simple),
            "grouped" => Ok(ViewMode::Grouped),
            other => {
                let message = format!("unknown view mode: {other}");
                Err(DomainError::validation(message))
            }
        }
    }
}

/// Inclusive `[min, max]` over a set of values.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn single(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    fn include(self, value: f64) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    /// Fold values into a range; `None` for an empty input.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Self::single(v)),
            Some(r) => Some(r.include(v)),
        })
    }

    fn label(&self, fmt: impl Fn(f64) -> String) -> String {
        if self.min == self.max {
            fmt(self.min)
        } else {
            format!("{} - {}", fmt(self.min), fmt(self.max))
        }
    }
}

/// One product row of the grouped view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductGroup {
    key: String,
    image: String,
    style_id: String,
    members: Vec<ListingRecord>,
    total_qty: i64,
    price_range: ValueRange,
    highest_bid: f64,
    lowest_ask: Option<f64>,
    roi_range: Option<ValueRange>,
}

impl ProductGroup {
    /// Build a group from its members (non-empty, source order).
    fn from_members(key: String, members: Vec<ListingRecord>) -> Option<Self> {
        let first = members.first()?;
        let image = first.image.clone();
        let style_id = first.style_id.clone();

        // Quantities are free text; a huge one saturates instead of overflowing.
        let total_qty = members
            .iter()
            .map(|m| listed_quantity(&m.qty))
            .fold(0_i64, i64::saturating_add);
        let price_range = ValueRange::from_values(members.iter().map(|m| m.your_ask))?;
        let highest_bid = members
            .iter()
            .map(|m| m.highest_bid.unwrap_or(0.0))
            .fold(0.0_f64, f64::max);
        let lowest_ask = members
            .iter()
            .filter_map(|m| m.lowest_ask)
            .reduce(f64::min);
        let roi_range = ValueRange::from_values(members.iter().filter_map(|m| roi_percent(&m.roi)));

        Some(Self {
            key,
            image,
            style_id,
            members,
            total_qty,
            price_range,
            highest_bid,
            lowest_ask,
            roi_range,
        })
    }

    /// Grouping key (the product name).
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    pub fn members(&self) -> &[ListingRecord] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Sum of listed quantities (the part of `qty` before `/`).
    pub fn total_qty(&self) -> i64 {
        self.total_qty
    }

    /// Range of our asks across members.
    pub fn price_range(&self) -> ValueRange {
        self.price_range
    }

    /// Highest bid across members; members without a bid count as 0.
    pub fn highest_bid(&self) -> f64 {
        self.highest_bid
    }

    /// Lowest market ask across members that have one.
    pub fn lowest_ask(&self) -> Option<f64> {
        self.lowest_ask
    }

    /// ROI range over members whose ROI parses.
    pub fn roi_range(&self) -> Option<ValueRange> {
        self.roi_range
    }

    pub fn price_range_label(&self) -> String {
        self.price_range.label(format_price)
    }

    pub fn highest_bid_label(&self) -> String {
        format_price(self.highest_bid)
    }

    /// `$116`, or [`MISSING_VALUE`] when no member has a market ask.
    pub fn lowest_ask_label(&self) -> String {
        match self.lowest_ask {
            Some(v) => format_price(v),
            None => MISSING_VALUE.to_string(),
        }
    }

    pub fn roi_range_label(&self) -> String {
        match &self.roi_range {
            Some(r) => r.label(format_percent),
            None => MISSING_VALUE.to_string(),
        }
    }
}

/// Partition listings by exact `name`, keeping first-seen group order and
/// source order within each group.
pub fn group_by_product(listings: &[ListingRecord]) -> Vec<ProductGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<ListingRecord>> = HashMap::new();

    for listing in listings {
        let bucket = buckets.entry(listing.name.clone()).or_insert_with(|| {
            order.push(listing.name.clone());
            Vec::new()
        });
        bucket.push(listing.clone());
    }

    let groups: Vec<ProductGroup> = order
        .into_iter()
        .filter_map(|key| {
            let members = buckets.remove(&key)?;
            ProductGroup::from_members(key, members)
        })
        .collect();

    tracing::debug!(
        listings = listings.len(),
        groups = groups.len(),
        "grouped listings"
    );
    groups
}

/// Groups plus which of them are expanded.
#[derive(Debug, Clone, Default)]
pub struct GroupedView {
    groups: Vec<ProductGroup>,
    expanded: HashSet<String>,
}

impl GroupedView {
    pub fn build(listings: &[ListingRecord]) -> Self {
        Self {
            groups: group_by_product(listings),
            expanded: HashSet::new(),
        }
    }

    /// Replace the groups from a new filtered set. Every group starts
    /// collapsed again.
    pub fn rebuild(&mut self, listings: &[ListingRecord]) {
        self.groups = group_by_product(listings);
        self.expanded.clear();
    }

    pub fn groups(&self) -> &[ProductGroup] {
        &self.groups
    }

    pub fn group(&self, key: &str) -> Option<&ProductGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    /// Flip one group's expansion. Returns the new state, or `None` when no
    /// group has that key.
    pub fn toggle(&mut self, key: &str) -> Option<bool> {
        self.group(key)?;
        if self.expanded.remove(key) {
            Some(false)
        } else {
            self.expanded.insert(key.to_string());
            Some(true)
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Members to render under the group row; `None` while collapsed.
    pub fn visible_members(&self, key: &str) -> Option<&[ListingRecord]> {
        if !self.is_expanded(key) {
            return None;
        }
        self.group(key).map(ProductGroup::members)
    }

    /// Rows in display order with their expansion flag.
    pub fn rows(&self) -> impl Iterator<Item = (&ProductGroup, bool)> + '_ {
        self.groups
            .iter()
            .map(|g| (g, self.expanded.contains(&g.key)))
    }
}

/// What the listing table renders.
#[derive(Debug, Clone)]
pub enum ListingView {
    Simple(Vec<ListingRecord>),
    Grouped(GroupedView),
}

impl ListingView {
    pub fn build(listings: Vec<ListingRecord>, mode: ViewMode) -> Self {
        match mode {
            ViewMode::Simple => ListingView::Simple(listings),
            ViewMode::Grouped => ListingView::Grouped(GroupedView::build(&listings)),
        }
    }

    pub fn mode(&self) -> ViewMode {
        match self {
            ListingView::Simple(_) => ViewMode::Simple,
            ListingView::Grouped(_) => ViewMode::Grouped,
        }
    }

    /// Number of top-level rows.
    pub fn row_count(&self) -> usize {
        match self {
            ListingView::Simple(rows) => rows.len(),
            ListingView::Grouped(view) => view.groups().len(),
        }
    }
}
