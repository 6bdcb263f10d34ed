use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shipdesk_core::{ProductId, Resource, SellerId, StockItemId, WarehouseId};

/// Stock of one product in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: StockItemId,
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub seller_id: Option<SellerId>,
    pub warehouse_id: WarehouseId,
    #[serde(default)]
    pub warehouse_name: Option<String>,
    pub quantity_available: i64,
    #[serde(default)]
    pub quantity_reserved: i64,
    #[serde(default)]
    pub quantity_defective: i64,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StockItem {
    pub fn on_hand(&self) -> i64 {
        self.quantity_available + self.quantity_reserved + self.quantity_defective
    }

    /// At or below the threshold. Items without a threshold are never low.
    pub fn is_low_stock(&self) -> bool {
        self.low_stock_threshold
            .is_some_and(|threshold| self.quantity_available <= threshold)
    }
}

impl Resource for StockItem {
    type Id = StockItemId;

    fn id(&self) -> &StockItemId {
        &self.id
    }

    fn label(&self) -> String {
        match &self.sku {
            Some(sku) => format!("{} ({sku})", self.product_name),
            None => self.product_name.clone(),
        }
    }
}

/// Per-warehouse totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseOverview {
    pub warehouse_id: WarehouseId,
    pub warehouse_name: String,
    #[serde(default)]
    pub city: Option<String>,
    pub product_count: u32,
    pub total_available: i64,
    #[serde(default)]
    pub total_reserved: i64,
    #[serde(default)]
    pub total_defective: i64,
    #[serde(default)]
    pub low_stock_count: u32,
}

impl WarehouseOverview {
    /// Totals computed from a cached item list, for warehouses the service
    /// did not summarize.
    pub fn from_items<'a>(
        warehouse_id: &WarehouseId,
        warehouse_name: impl Into<String>,
        items: impl IntoIterator<Item = &'a StockItem>,
    ) -> Self {
        let mut overview = Self {
            warehouse_id: warehouse_id.clone(),
            warehouse_name: warehouse_name.into(),
            city: None,
            product_count: 0,
            total_available: 0,
            total_reserved: 0,
            total_defective: 0,
            low_stock_count: 0,
        };
        for item in items.into_iter().filter(|i| &i.warehouse_id == warehouse_id) {
            overview.product_count += 1;
            overview.total_available += item.quantity_available;
            overview.total_reserved += item.quantity_reserved;
            overview.total_defective += item.quantity_defective;
            if item.is_low_stock() {
                overview.low_stock_count += 1;
            }
        }
        overview
    }
}

/// Stock list filters. Also sent as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<WarehouseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<SellerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub low_stock_only: bool,
}

impl StockFilter {
    pub fn matches(&self, item: &StockItem) -> bool {
        if self
            .warehouse_id
            .as_ref()
            .is_some_and(|w| w != &item.warehouse_id)
        {
            return false;
        }
        if let Some(seller) = &self.seller_id {
            if item.seller_id.as_ref() != Some(seller) {
                return false;
            }
        }
        if self.low_stock_only && !item.is_low_stock() {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                item.product_name.to_lowercase().contains(&needle)
                    || item
                        .sku
                        .as_deref()
                        .is_some_and(|sku| sku.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }

    pub fn apply<'a>(&self, items: &'a [StockItem]) -> Vec<&'a StockItem> {
        items.iter().filter(|i| self.matches(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(
        id: &str,
        warehouse: &str,
        name: &str,
        available: i64,
        threshold: Option<i64>,
    ) -> StockItem {
        StockItem {
            id: id.into(),
            product_id: format!("p-{id}").into(),
            product_name: name.to_string(),
            sku: Some(format!("SKU-{id}")),
            seller_id: Some("s-1".into()),
            warehouse_id: warehouse.into(),
            warehouse_name: None,
            quantity_available: available,
            quantity_reserved: 2,
            quantity_defective: 1,
            low_stock_threshold: threshold,
            updated_at: None,
        }
    }

    #[test]
    fn low_stock_needs_a_threshold() {
        assert!(item("1", "w", "Mug", 5, Some(5)).is_low_stock());
        assert!(!item("1", "w", "Mug", 6, Some(5)).is_low_stock());
        assert!(!item("1", "w", "Mug", 0, None).is_low_stock());
    }

    #[test]
    fn filter_combines_criteria() {
        let items = vec![
            item("1", "casa", "Mug bleu", 3, Some(5)),
            item("2", "casa", "Tasse", 50, Some(5)),
            item("3", "rabat", "Mug rouge", 1, Some(5)),
        ];

        let filter = StockFilter {
            warehouse_id: Some("casa".into()),
            search: Some(" mug ".into()),
            ..Default::default()
        };
        let hits: Vec<_> = filter.apply(&items).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(hits, vec!["1"]);

        let low = StockFilter {
            low_stock_only: true,
            ..Default::default()
        };
        assert_eq!(low.apply(&items).len(), 2);

        let by_sku = StockFilter {
            search: Some("sku-2".into()),
            ..Default::default()
        };
        assert_eq!(by_sku.apply(&items)[0].id.as_str(), "2");
    }

    #[test]
    fn overview_sums_one_warehouse() {
        let items = vec![
            item("1", "casa", "Mug", 3, Some(5)),
            item("2", "casa", "Tasse", 50, Some(5)),
            item("3", "rabat", "Bol", 1, Some(5)),
        ];
        let overview = WarehouseOverview::from_items(&"casa".into(), "Casablanca", &items);
        assert_eq!(overview.product_count, 2);
        assert_eq!(overview.total_available, 53);
        assert_eq!(overview.total_reserved, 4);
        assert_eq!(overview.low_stock_count, 1);
    }

    #[test]
    fn query_skips_default_fields() {
        let value = serde_json::to_value(StockFilter::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    proptest! {
        #[test]
        fn empty_filter_keeps_everything(avail in proptest::collection::vec(0i64..100, 0..30)) {
            let items: Vec<_> = avail
                .iter()
                .enumerate()
                .map(|(i, a)| item(&i.to_string(), "w", "x", *a, Some(10)))
                .collect();
            prop_assert_eq!(StockFilter::default().apply(&items).len(), items.len());
        }
    }
}
