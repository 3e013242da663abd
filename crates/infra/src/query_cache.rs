//! Explicit query-result cache.
//!
//! Results are keyed by a canonical descriptor of the request instead of an
//! ad-hoc string, and every invalidation is an explicit call. Entries are
//! disposable: a miss just means "go back to the source".

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use solestock_core::{RecordId, VariantId};
use solestock_inventory::{FilterCriteria, Marketplace};

/// Families of keys that are invalidated together.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QueryScope {
    InventoryLists,
    InventoryDetails,
    ListingLists,
    MarketData,
    StockXListings,
    GoatListings,
}

impl QueryScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryScope::InventoryLists => "inventory.lists",
            QueryScope::InventoryDetails => "inventory.details",
            QueryScope::ListingLists => "listings.lists",
            QueryScope::MarketData => "market_data",
            QueryScope::StockXListings => "listings.stockx",
            QueryScope::GoatListings => "listings.goat",
        }
    }
}

/// Canonical request descriptor.
///
/// Criteria are stored in canonical JSON form; criteria that filter nothing
/// normalize to the same key as no criteria at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    InventoryList {
        search: String,
        criteria: Option<String>,
    },
    InventoryDetail(RecordId),
    ListingList {
        search: String,
        criteria: Option<String>,
    },
    MarketData {
        marketplace: Marketplace,
        variant_id: VariantId,
    },
    StockXListings {
        variant_id: VariantId,
    },
    /// GOAT lists by size; the size label is kept as given, trimmed.
    GoatListings {
        size: String,
    },
}

fn canonical_criteria(criteria: Option<&FilterCriteria>) -> Option<String> {
    criteria
        .filter(|c| !c.is_noop())
        .and_then(|c| serde_json::to_string(c).ok())
}

impl QueryKey {
    pub fn inventory_list(search: &str, criteria: Option<&FilterCriteria>) -> Self {
        QueryKey::InventoryList {
            search: search.to_string(),
            criteria: canonical_criteria(criteria),
        }
    }

    pub fn inventory_detail(id: &RecordId) -> Self {
        QueryKey::InventoryDetail(id.clone())
    }

    /// Both view modes share one key: grouping happens after the cache.
    pub fn listing_list(search: &str, criteria: Option<&FilterCriteria>) -> Self {
        QueryKey::ListingList {
            search: search.to_string(),
            criteria: canonical_criteria(criteria),
        }
    }

    pub fn market_data(marketplace: Marketplace, variant_id: &VariantId) -> Self {
        QueryKey::MarketData {
            marketplace,
            variant_id: variant_id.clone(),
        }
    }

    pub fn stockx_listings(variant_id: &VariantId) -> Self {
        QueryKey::StockXListings {
            variant_id: variant_id.clone(),
        }
    }

    pub fn goat_listings(size: &str) -> Self {
        QueryKey::GoatListings {
            size: size.trim().to_string(),
        }
    }

    pub fn scope(&self) -> QueryScope {
        match self {
            QueryKey::InventoryList { .. } => QueryScope::InventoryLists,
            QueryKey::InventoryDetail(_) => QueryScope::InventoryDetails,
            QueryKey::ListingList { .. } => QueryScope::ListingLists,
            QueryKey::MarketData { .. } => QueryScope::MarketData,
            QueryKey::StockXListings { .. } => QueryScope::StockXListings,
            QueryKey::GoatListings { .. } => QueryScope::GoatListings,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    fetched_at: DateTime<Utc>,
}

/// Saved entries of one scope, for rolling back an optimistic update.
#[derive(Debug, Clone)]
pub struct CacheSnapshot<V> {
    scope: QueryScope,
    entries: Vec<(QueryKey, CacheEntry<V>)>,
}

/// Thread-safe cache of query results with a single freshness window.
#[derive(Debug)]
pub struct QueryCache<V> {
    stale_after: Duration,
    entries: RwLock<HashMap<QueryKey, CacheEntry<V>>>,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Fresh value for `key` as of `now`, if any.
    pub fn get(&self, key: &QueryKey, now: DateTime<Utc>) -> Option<V> {
        let map = self.entries.read().ok()?;
        let entry = map.get(key)?;
        if now.signed_duration_since(entry.fetched_at) > self.stale_after {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: QueryKey, value: V, now: DateTime<Utc>) {
        if let Ok(mut map) = self.entries.write() {
            map.insert(
                key,
                CacheEntry {
                    value,
                    fetched_at: now,
                },
            );
        }
    }

    /// Return the fresh cached value, or run `fetch` and cache its result.
    ///
    /// Errors are passed through and nothing is cached for them.
    pub fn get_or_fetch<E, F>(&self, key: QueryKey, now: DateTime<Utc>, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key, now) {
            tracing::trace!(scope = key.scope().as_str(), "query cache hit");
            return Ok(hit);
        }
        let value = fetch()?;
        self.insert(key, value.clone(), now);
        Ok(value)
    }

    pub fn invalidate(&self, key: &QueryKey) -> bool {
        match self.entries.write() {
            Ok(mut map) => map.remove(key).is_some(),
            Err(_) => false,
        }
    }

    /// Drop every entry in `scope`. Returns how many were removed.
    pub fn invalidate_scope(&self, scope: QueryScope) -> usize {
        let Ok(mut map) = self.entries.write() else {
            return 0;
        };
        let before = map.len();
        map.retain(|k, _| k.scope() != scope);
        before - map.len()
    }

    /// Patch every cached value in `scope` without touching its freshness.
    /// Returns how many entries were visited.
    pub fn update_scope<F>(&self, scope: QueryScope, mut patch: F) -> usize
    where
        F: FnMut(&mut V),
    {
        let Ok(mut map) = self.entries.write() else {
            return 0;
        };
        let mut visited = 0;
        for (_, entry) in map.iter_mut().filter(|(k, _)| k.scope() == scope) {
            patch(&mut entry.value);
            visited += 1;
        }
        visited
    }

    /// Patch one entry in place, if cached.
    pub fn update<F>(&self, key: &QueryKey, patch: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        let Ok(mut map) = self.entries.write() else {
            return false;
        };
        match map.get_mut(key) {
            Some(entry) => {
                patch(&mut entry.value);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self, scope: QueryScope) -> CacheSnapshot<V> {
        let entries = match self.entries.read() {
            Ok(map) => map
                .iter()
                .filter(|(k, _)| k.scope() == scope)
                .map(|(k, e)| (k.clone(), e.clone()))
                .collect(),
            Err(_) => Vec::new(),
        };
        CacheSnapshot { scope, entries }
    }

    /// Replace the scope's entries with a snapshot taken earlier.
    pub fn restore(&self, snapshot: CacheSnapshot<V>) {
        if let Ok(mut map) = self.entries.write() {
            map.retain(|k, _| k.scope() != snapshot.scope);
            map.extend(snapshot.entries);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut map) = self.entries.write() {
            map.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solestock_inventory::{LowestAskFilter, ThresholdType};

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn entries_expire_after_stale_window() {
        let cache = QueryCache::new(Duration::minutes(5));
        let key = QueryKey::inventory_list("", None);
        cache.insert(key.clone(), vec![1, 2, 3], t0());

        let edge = t0() + Duration::minutes(5);
        assert_eq!(cache.get(&key, edge), Some(vec![1, 2, 3]));
        assert_eq!(cache.get(&key, edge + Duration::seconds(1)), None);
    }

    #[test]
    fn get_or_fetch_only_fetches_on_miss() {
        let cache = QueryCache::new(Duration::minutes(5));
        let key = QueryKey::inventory_list("nike", None);
        let mut calls = 0;

        for _ in 0..3 {
            let v: Result<u32, ()> = cache.get_or_fetch(key.clone(), t0(), || {
                calls += 1;
                Ok(7)
            });
            assert_eq!(v, Ok(7));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn fetch_errors_are_not_cached() {
        let cache: QueryCache<u32> = QueryCache::new(Duration::minutes(5));
        let key = QueryKey::inventory_list("", None);
        let err: Result<u32, &str> = cache.get_or_fetch(key.clone(), t0(), || Err("down"));
        assert_eq!(err, Err("down"));
        assert!(cache.is_empty());
    }

    #[test]
    fn noop_criteria_share_the_unfiltered_key() {
        let noop = FilterCriteria {
            lowest_ask: Some(LowestAskFilter::Any),
            ..FilterCriteria::default()
        };
        assert_eq!(
            QueryKey::inventory_list("x", Some(&noop)),
            QueryKey::inventory_list("x", None)
        );

        let real = FilterCriteria {
            spread_type: Some(ThresholdType::Greater),
            spread_value: 10.0,
            ..FilterCriteria::default()
        };
        assert_ne!(
            QueryKey::inventory_list("x", Some(&real)),
            QueryKey::inventory_list("x", None)
        );
    }

    #[test]
    fn scope_invalidation_leaves_other_scopes() {
        let cache = QueryCache::new(Duration::minutes(5));
        cache.insert(QueryKey::inventory_list("a", None), 1, t0());
        cache.insert(QueryKey::inventory_list("b", None), 2, t0());
        cache.insert(QueryKey::inventory_detail(&RecordId::new("1")), 3, t0());

        assert_eq!(cache.invalidate_scope(QueryScope::InventoryLists), 2);
        assert_eq!(cache.len(), 1);
        let detail = QueryKey::inventory_detail(&RecordId::new("1"));
        assert!(cache.invalidate(&detail));
        assert!(!cache.invalidate(&detail));
    }

    #[test]
    fn snapshot_and_restore_roll_back_patches() {
        let cache = QueryCache::new(Duration::minutes(5));
        let key = QueryKey::inventory_list("", None);
        cache.insert(key.clone(), 10, t0());

        let snap = cache.snapshot(QueryScope::InventoryLists);
        assert_eq!(
            cache.update_scope(QueryScope::InventoryLists, |v| *v += 1),
            1
        );
        assert_eq!(cache.get(&key, t0()), Some(11));

        cache.restore(snap);
        assert_eq!(cache.get(&key, t0()), Some(10));
    }

    #[test]
    fn update_single_entry() {
        let cache = QueryCache::new(Duration::minutes(5));
        let key = QueryKey::market_data(Marketplace::Goat, &VariantId::new("v"));
        assert!(!cache.update(&key, |v: &mut u32| *v = 1));
        cache.insert(key.clone(), 0u32, t0());
        assert!(cache.update(&key, |v| *v = 1));
        assert_eq!(cache.get(&key, t0()), Some(1));
        assert_eq!(key.scope().as_str(), "market_data");
    }

    #[test]
    fn marketplace_listing_scopes_are_separate() {
        let cache = QueryCache::new(Duration::minutes(5));
        for (i, variant) in ["var123", "var124"].into_iter().enumerate() {
            cache.insert(QueryKey::stockx_listings(&VariantId::new(variant)), i, t0());
        }
        cache.insert(QueryKey::goat_listings(" 9 "), 3, t0());

        assert_eq!(cache.get(&QueryKey::goat_listings("9"), t0()), Some(3));
        assert_eq!(cache.invalidate_scope(QueryScope::StockXListings), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(QueryScope::GoatListings.as_str(), "listings.goat");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                ..ProptestConfig::default()
            })]

            /// Property: an entry is served iff its age is within the window.
            #[test]
            fn fresh_iff_within_window(stale_secs in 0i64..600, age_secs in 0i64..1200) {
                let cache = QueryCache::new(Duration::seconds(stale_secs));
                let key = QueryKey::inventory_list("", None);
                cache.insert(key.clone(), 1u8, t0());

                let hit = cache.get(&key, t0() + Duration::seconds(age_secs));
                prop_assert_eq!(hit.is_some(), age_secs <= stale_secs);
            }

            /// Property: scope invalidation removes exactly that scope.
            #[test]
            fn invalidate_scope_is_exact(
                lists in proptest::collection::hash_set("[a-z]{1,4}", 0..8),
                details in proptest::collection::hash_set("[0-9]{1,3}", 0..8)
            ) {
                let cache = QueryCache::new(Duration::minutes(5));
                for q in &lists {
                    cache.insert(QueryKey::inventory_list(q, None), 0u8, t0());
                }
                for id in &details {
                    let key = QueryKey::inventory_detail(&RecordId::new(id.as_str()));
                    cache.insert(key, 0u8, t0());
                }

                prop_assert_eq!(cache.invalidate_scope(QueryScope::InventoryLists), lists.len());
                prop_assert_eq!(cache.len(), details.len());
            }
        }
    }
}
