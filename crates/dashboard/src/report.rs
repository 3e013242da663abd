//! Serializable snapshot of the board, printed by the binary.

use serde::Serialize;

use solestock_inventory::{FilterCriteria, InventoryRecord, ListingRecord, ListingView, ViewMode};

/// One product row of the grouped listing table, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRow {
    pub name: String,
    pub style_id: String,
    pub listings: usize,
    pub total_qty: i64,
    pub price_range: String,
    pub highest_bid: String,
    pub lowest_ask: String,
    pub roi_range: String,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ListingRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "rows", rename_all = "snake_case")]
pub enum ListingRows {
    Simple(Vec<ListingRecord>),
    Grouped(Vec<GroupRow>),
}

impl From<&ListingView> for ListingRows {
    fn from(view: &ListingView) -> Self {
        match view {
            ListingView::Simple(rows) => ListingRows::Simple(rows.clone()),
            ListingView::Grouped(grouped) => ListingRows::Grouped(
                grouped
                    .rows()
                    .map(|(group, expanded)| GroupRow {
                        name: group.key().to_string(),
                        style_id: group.style_id().to_string(),
                        listings: group.member_count(),
                        total_qty: group.total_qty(),
                        price_range: group.price_range_label(),
                        highest_bid: group.highest_bid_label(),
                        lowest_ask: group.lowest_ask_label(),
                        roi_range: group.roi_range_label(),
                        expanded,
                        // Collapsed groups show only the summary row.
                        members: if expanded {
                            group.members().to_vec()
                        } else {
                            Vec::new()
                        },
                    })
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardReport {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<FilterCriteria>,
    pub view_mode: ViewMode,
    pub inventory: Vec<InventoryRecord>,
    pub listings: ListingRows,
}

impl BoardReport {
    pub fn new(
        query: &str,
        criteria: Option<&FilterCriteria>,
        inventory: &[InventoryRecord],
        listings: &ListingView,
    ) -> Self {
        Self {
            query: query.to_string(),
            criteria: criteria.cloned(),
            view_mode: listings.mode(),
            inventory: inventory.to_vec(),
            listings: ListingRows::from(listings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solestock_core::RecordId;
    use solestock_inventory::MISSING_VALUE;

    fn listing(id: &str, name: &str, ask: f64, lowest: Option<f64>) -> ListingRecord {
        ListingRecord {
            id: RecordId::new(id),
            image: String::new(),
            name: name.to_string(),
            style_id: "TB00073-009".to_string(),
            size: "US M 9.5".to_string(),
            cost: 95.0,
            your_ask: ask,
            qty: "12/5".to_string(),
            highest_bid: None,
            lowest_ask: lowest,
            spread: 0,
            roi: "12%".to_string(),
            days_listed: 2,
            last_update: "1/1/25".to_string(),
            is_expired: false,
        }
    }

    #[test]
    fn grouped_rows_hide_members_until_expanded() {
        let rows = vec![
            listing("1", "Nubuck", 116.0, None),
            listing("2", "Nubuck", 118.0, None),
        ];
        let mut view = ListingView::build(rows, ViewMode::Grouped);

        let ListingRows::Grouped(collapsed) = ListingRows::from(&view) else {
            panic!("expected grouped rows");
        };
        assert_eq!(collapsed.len(), 1);
        assert!(collapsed[0].members.is_empty());
        assert_eq!(collapsed[0].lowest_ask, MISSING_VALUE);
        assert_eq!(collapsed[0].highest_bid, "$0");
        assert_eq!(collapsed[0].total_qty, 24);

        if let ListingView::Grouped(grouped) = &mut view {
            grouped.toggle("Nubuck");
        }
        let ListingRows::Grouped(expanded) = ListingRows::from(&view) else {
            panic!("expected grouped rows");
        };
        assert_eq!(expanded[0].members.len(), 2);
    }

    #[test]
    fn report_serializes_mode_tag() {
        let view = ListingView::build(vec![listing("1", "Denim", 90.0, None)], ViewMode::Simple);
        let report = BoardReport::new("denim", None, &[], &view);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["viewMode"], "simple");
        assert_eq!(json["listings"]["mode"], "simple");
        assert_eq!(json["listings"]["rows"][0]["yourAsk"], 90.0);
        assert!(json.get("criteria").is_none());
    }
}
