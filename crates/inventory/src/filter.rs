//! Text search and structured filters shared by the inventory and listing
//! tables.
//!
//! Both stages are stable (input order is kept) and recompute from whatever
//! slice they are given; there is no incremental path.

use serde::{Deserialize, Serialize};

use crate::record::{InventoryRecord, ListingRecord};

/// Fields the free-text search looks at.
pub trait Searchable {
    fn name(&self) -> &str;
    fn style_id(&self) -> &str;
}

/// Fields the structured filter looks at. `None` means the record does not
/// carry the metric.
pub trait Filterable {
    fn spread(&self) -> Option<i64>;
    fn days_listed(&self) -> Option<u32>;
    fn is_lowest_ask(&self) -> Option<bool>;
    fn is_expired(&self) -> Option<bool>;
}

/// Comparison selected for a numeric threshold.
///
/// Only `greater` filters. Any other value the filter form sends is kept as
/// `Unsupported` and ignored by the predicate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdType {
    Greater,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LowestAskFilter {
    /// Only records that currently hold the lowest ask.
    LowestAsk,
    /// Only records that do not.
    NotLowestAsk,
    /// Form default ("all"); does not filter.
    #[serde(other)]
    Any,
}

/// Criteria submitted from the filter form. Every field is optional and the
/// configured ones are AND-combined.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub spread_type: Option<ThresholdType>,
    pub spread_value: f64,
    pub days_listed_type: Option<ThresholdType>,
    pub days_listed_value: f64,
    pub lowest_ask: Option<LowestAskFilter>,
    pub show_only_expired: bool,
}

impl FilterCriteria {
    /// True when no criterion would reject anything.
    pub fn is_noop(&self) -> bool {
        !matches!(self.spread_type, Some(ThresholdType::Greater))
            && !matches!(self.days_listed_type, Some(ThresholdType::Greater))
            && !matches!(
                self.lowest_ask,
                Some(LowestAskFilter::LowestAsk | LowestAskFilter::NotLowestAsk)
            )
            && !self.show_only_expired
    }

    /// Evaluate every configured criterion against one record.
    ///
    /// "Greater" is inclusive: a record whose metric equals the threshold is
    /// kept. Missing metrics compare as 0.
    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        if self.spread_type == Some(ThresholdType::Greater)
            && (record.spread().unwrap_or(0) as f64) < self.spread_value
        {
            return false;
        }

        if self.days_listed_type == Some(ThresholdType::Greater)
            && f64::from(record.days_listed().unwrap_or(0)) < self.days_listed_value
        {
            return false;
        }

        let lowest = record.is_lowest_ask().unwrap_or(false);
        match self.lowest_ask {
            Some(LowestAskFilter::LowestAsk) if !lowest => return false,
            Some(LowestAskFilter::NotLowestAsk) if lowest => return false,
            _ => {}
        }

        if self.show_only_expired && !record.is_expired().unwrap_or(false) {
            return false;
        }

        true
    }
}

/// Case-insensitive substring match on `name` or `style_id`.
///
/// `needle` must already be lowercased.
fn matches_text<R: Searchable + ?Sized>(record: &R, needle: &str) -> bool {
    needle.is_empty()
        || record.name().to_lowercase().contains(needle)
        || record.style_id().to_lowercase().contains(needle)
}

/// Keep records whose `name` or `style_id` contains `query`, ignoring case.
///
/// The query is used as typed (no trimming or tokenizing); an empty query
/// keeps everything.
pub fn filter_by_text<R>(records: &[R], query: &str) -> Vec<R>
where
    R: Searchable + Clone,
{
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| matches_text(*r, &needle))
        .cloned()
        .collect()
}

/// Apply structured criteria; `None` passes everything through untouched.
pub fn apply_criteria<R>(records: Vec<R>, criteria: Option<&FilterCriteria>) -> Vec<R>
where
    R: Filterable,
{
    match criteria {
        None => records,
        Some(c) => records.into_iter().filter(|r| c.matches(r)).collect(),
    }
}

/// Text search followed by the structured filter.
pub fn filter_records<R>(records: &[R], query: &str, criteria: Option<&FilterCriteria>) -> Vec<R>
where
    R: Searchable + Filterable + Clone,
{
    let by_text = filter_by_text(records, query);
    let kept = apply_criteria(by_text, criteria);
    tracing::debug!(
        total = records.len(),
        visible = kept.len(),
        query_len = query.len(),
        criteria = criteria.is_some(),
        "filtered records"
    );
    kept
}

impl Searchable for InventoryRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn style_id(&self) -> &str {
        &self.style_id
    }
}

impl Filterable for InventoryRecord {
    fn spread(&self) -> Option<i64> {
        self.spread
    }

    fn days_listed(&self) -> Option<u32> {
        self.days_listed
    }

    fn is_lowest_ask(&self) -> Option<bool> {
        self.is_lowest_ask
    }

    fn is_expired(&self) -> Option<bool> {
        self.is_expired
    }
}

impl Searchable for ListingRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn style_id(&self) -> &str {
        &self.style_id
    }
}

impl Filterable for ListingRecord {
    fn spread(&self) -> Option<i64> {
        Some(self.spread)
    }

    fn days_listed(&self) -> Option<u32> {
        Some(self.days_listed)
    }

    /// We hold the lowest ask when our ask is at or below the market's.
    fn is_lowest_ask(&self) -> Option<bool> {
        self.lowest_ask.map(|market| self.your_ask <= market)
    }

    fn is_expired(&self) -> Option<bool> {
        Some(self.is_expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Row {
        name: &'static str,
        style_id: &'static str,
        spread: Option<i64>,
        days_listed: Option<u32>,
        is_lowest_ask: Option<bool>,
        is_expired: Option<bool>,
    }

    impl Searchable for Row {
        fn name(&self) -> &str {
            self.name
        }

        fn style_id(&self) -> &str {
            self.style_id
        }
    }

    impl Filterable for Row {
        fn spread(&self) -> Option<i64> {
            self.spread
        }

        fn days_listed(&self) -> Option<u32> {
            self.days_listed
        }

        fn is_lowest_ask(&self) -> Option<bool> {
            self.is_lowest_ask
        }

        fn is_expired(&self) -> Option<bool> {
            self.is_expired
        }
    }

    fn spread(v: i64) -> Row {
        Row {
            spread: Some(v),
            ..Row::default()
        }
    }

    fn greater(threshold: f64) -> FilterCriteria {
        FilterCriteria {
            spread_type: Some(ThresholdType::Greater),
            spread_value: threshold,
            ..FilterCriteria::default()
        }
    }

    #[test]
    fn text_search_matches_name_or_style_id_ignoring_case() {
        let rows = vec![
            Row {
                name: "Nike Air Max 1",
                style_id: "NK12345-001",
                ..Row::default()
            },
            Row {
                name: "Timberland 6\" Boot",
                style_id: "TB0NLKR/1184",
                ..Row::default()
            },
        ];

        assert_eq!(filter_by_text(&rows, "AIR MAX").len(), 1);
        assert_eq!(filter_by_text(&rows, "tb0nlkr").len(), 1);
        assert_eq!(filter_by_text(&rows, "").len(), 2);
        assert!(filter_by_text(&rows, "adidas").is_empty());
    }

    #[test]
    fn text_search_does_not_trim_query() {
        let rows = vec![Row {
            name: "Nike",
            style_id: "X",
            ..Row::default()
        }];
        assert!(filter_by_text(&rows, " nike").is_empty());
    }

    #[test]
    fn spread_greater_keeps_values_at_or_above_threshold() {
        let rows = vec![spread(25), spread(-1), spread(50)];
        let kept = apply_criteria(rows, Some(&greater(10.0)));
        let spreads: Vec<_> = kept.iter().map(|r| r.spread.unwrap()).collect();
        assert_eq!(spreads, vec![25, 50]);
    }

    #[test]
    fn spread_greater_is_inclusive() {
        let kept = apply_criteria(vec![spread(10), spread(9)], Some(&greater(10.0)));
        assert_eq!(kept, vec![spread(10)]);
    }

    #[test]
    fn missing_metrics_compare_as_zero() {
        let kept = apply_criteria(vec![Row::default()], Some(&greater(0.0)));
        assert_eq!(kept.len(), 1);
        let kept = apply_criteria(vec![Row::default()], Some(&greater(1.0)));
        assert!(kept.is_empty());
    }

    #[test]
    fn days_listed_threshold() {
        let rows = vec![
            Row {
                days_listed: Some(15),
                ..Row::default()
            },
            Row {
                days_listed: Some(3),
                ..Row::default()
            },
            Row::default(),
        ];
        let criteria = FilterCriteria {
            days_listed_type: Some(ThresholdType::Greater),
            days_listed_value: 5.0,
            ..FilterCriteria::default()
        };
        let kept = apply_criteria(rows, Some(&criteria));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].days_listed, Some(15));
    }

    #[test]
    fn unsupported_threshold_type_does_not_filter() {
        let criteria = FilterCriteria {
            spread_type: Some(ThresholdType::Unsupported),
            spread_value: 1000.0,
            ..FilterCriteria::default()
        };
        assert_eq!(apply_criteria(vec![spread(1)], Some(&criteria)).len(), 1);
        assert!(criteria.is_noop());
    }

    #[test]
    fn lowest_ask_selector() {
        let rows = vec![
            Row {
                is_lowest_ask: Some(true),
                ..Row::default()
            },
            Row {
                is_lowest_ask: Some(false),
                ..Row::default()
            },
            Row::default(),
        ];

        let only = FilterCriteria {
            lowest_ask: Some(LowestAskFilter::LowestAsk),
            ..FilterCriteria::default()
        };
        assert_eq!(apply_criteria(rows.clone(), Some(&only)).len(), 1);

        let not = FilterCriteria {
            lowest_ask: Some(LowestAskFilter::NotLowestAsk),
            ..FilterCriteria::default()
        };
        assert_eq!(apply_criteria(rows.clone(), Some(&not)).len(), 2);

        let any = FilterCriteria {
            lowest_ask: Some(LowestAskFilter::Any),
            ..FilterCriteria::default()
        };
        assert_eq!(apply_criteria(rows, Some(&any)).len(), 3);
    }

    #[test]
    fn expired_toggle() {
        let rows = vec![
            Row {
                is_expired: Some(true),
                ..Row::default()
            },
            Row {
                is_expired: Some(false),
                ..Row::default()
            },
            Row::default(),
        ];
        let criteria = FilterCriteria {
            show_only_expired: true,
            ..FilterCriteria::default()
        };
        assert_eq!(apply_criteria(rows.clone(), Some(&criteria)).len(), 1);
        assert_eq!(
            apply_criteria(rows, Some(&FilterCriteria::default())).len(),
            3
        );
    }

    #[test]
    fn criteria_are_and_combined() {
        let rows = vec![
            Row {
                spread: Some(30),
                is_expired: Some(true),
                ..Row::default()
            },
            Row {
                spread: Some(30),
                is_expired: Some(false),
                ..Row::default()
            },
            Row {
                spread: Some(5),
                is_expired: Some(true),
                ..Row::default()
            },
        ];
        let criteria = FilterCriteria {
            show_only_expired: true,
            ..greater(10.0)
        };
        let kept = apply_criteria(rows, Some(&criteria));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].spread, Some(30));
        assert_eq!(kept[0].is_expired, Some(true));
    }

    #[test]
    fn absent_criteria_is_identity() {
        let rows = vec![spread(1), spread(2)];
        assert_eq!(apply_criteria(rows.clone(), None), rows);
    }

    #[test]
    fn criteria_deserialize_from_form_values() {
        let json = r#"{
            "spreadType": "greater",
            "spreadValue": 10,
            "daysListedType": "less",
            "daysListedValue": 3,
            "lowestAsk": "notLowestAsk",
            "showOnlyExpired": true
        }"#;
        let c: FilterCriteria = serde_json::from_str(json).unwrap();
        assert_eq!(c.spread_type, Some(ThresholdType::Greater));
        assert_eq!(c.spread_value, 10.0);
        assert_eq!(c.days_listed_type, Some(ThresholdType::Unsupported));
        assert_eq!(c.lowest_ask, Some(LowestAskFilter::NotLowestAsk));
        assert!(c.show_only_expired);

        let empty: FilterCriteria = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, FilterCriteria::default());
        assert!(empty.is_noop());
    }

    #[test]
    fn listing_holds_lowest_ask_when_at_or_below_market() {
        let listing = ListingRecord {
            id: "1".into(),
            image: String::new(),
            name: "Boot".to_string(),
            style_id: "TB1".to_string(),
            size: "9".to_string(),
            cost: 95.0,
            your_ask: 116.0,
            qty: "1".to_string(),
            highest_bid: None,
            lowest_ask: Some(116.0),
            spread: 0,
            roi: "12%".to_string(),
            days_listed: 1,
            last_update: String::new(),
            is_expired: false,
        };
        assert_eq!(listing.is_lowest_ask(), Some(true));

        let above = ListingRecord {
            your_ask: 117.0,
            ..listing.clone()
        };
        assert_eq!(above.is_lowest_ask(), Some(false));

        let no_market = ListingRecord {
            lowest_ask: None,
            ..listing
        };
        assert_eq!(no_market.is_lowest_ask(), None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, PartialEq)]
        struct Owned {
            name: String,
            style_id: String,
            spread: Option<i64>,
            days_listed: Option<u32>,
            is_lowest_ask: Option<bool>,
            is_expired: Option<bool>,
        }

        impl Searchable for Owned {
            fn name(&self) -> &str {
                &self.name
            }

            fn style_id(&self) -> &str {
                &self.style_id
            }
        }

        impl Filterable for Owned {
            fn spread(&self) -> Option<i64> {
                self.spread
            }

            fn days_listed(&self) -> Option<u32> {
                self.days_listed
            }

            fn is_lowest_ask(&self) -> Option<bool> {
                self.is_lowest_ask
            }

            fn is_expired(&self) -> Option<bool> {
                self.is_expired
            }
        }

        fn row() -> impl Strategy<Value = Owned> {
            (
                "[A-Za-z0-9 ]{0,16}",
                "[A-Z0-9/-]{0,12}",
                proptest::option::of(-100i64..100),
                proptest::option::of(0u32..60),
                proptest::option::of(any::<bool>()),
                proptest::option::of(any::<bool>()),
            )
                .prop_map(|(name, style_id, spread, days_listed, is_lowest_ask, is_expired)| Owned {
                    name,
                    style_id,
                    spread,
                    days_listed,
                    is_lowest_ask,
                    is_expired,
                })
        }

        fn criteria() -> impl Strategy<Value = FilterCriteria> {
            (
                proptest::option::of(Just(ThresholdType::Greater)),
                -100i64..100,
                proptest::option::of(Just(ThresholdType::Greater)),
                0u32..60,
                proptest::option::of(prop_oneof![
                    Just(LowestAskFilter::LowestAsk),
                    Just(LowestAskFilter::NotLowestAsk),
                    Just(LowestAskFilter::Any),
                ]),
                any::<bool>(),
            )
                .prop_map(|(st, sv, dt, dv, la, exp)| FilterCriteria {
                    spread_type: st,
                    spread_value: sv as f64,
                    days_listed_type: dt,
                    days_listed_value: f64::from(dv),
                    lowest_ask: la,
                    show_only_expired: exp,
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: empty query returns the input unchanged.
            #[test]
            fn empty_query_is_identity(rows in proptest::collection::vec(row(), 0..20)) {
                prop_assert_eq!(filter_by_text(&rows, ""), rows);
            }

            /// Property: a record is kept iff the query is a case-insensitive
            /// substring of its name or style id.
            #[test]
            fn kept_iff_substring(
                rows in proptest::collection::vec(row(), 0..20),
                query in "[A-Za-z0-9]{0,3}"
            ) {
                let kept = filter_by_text(&rows, &query);
                let needle = query.to_lowercase();
                let expected: Vec<Owned> = rows
                    .iter()
                    .filter(|r| r.name.to_lowercase().contains(&needle)
                        || r.style_id.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();
                prop_assert_eq!(kept, expected);
            }

            /// Property: structured filtering is idempotent.
            #[test]
            fn criteria_are_idempotent(
                rows in proptest::collection::vec(row(), 0..20),
                c in criteria()
            ) {
                let once = apply_criteria(rows, Some(&c));
                let twice = apply_criteria(once.clone(), Some(&c));
                prop_assert_eq!(once, twice);
            }

            /// Property: the output is an order-preserving subsequence.
            #[test]
            fn filtering_preserves_order(
                rows in proptest::collection::vec(row(), 0..20),
                query in "[a-z]{0,2}",
                c in criteria()
            ) {
                let kept = filter_records(&rows, &query, Some(&c));
                let mut source = rows.iter();
                for k in &kept {
                    prop_assert!(source.any(|r| r == k));
                }
            }
        }
    }
}
