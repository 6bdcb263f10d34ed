//! Warehouse stock overview.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use shipdesk_auth::permissions::catalog;
use shipdesk_client::StockClient;
use shipdesk_core::WarehouseId;
use shipdesk_inventory::{StockFilter, StockItem, WarehouseOverview};

use crate::error::StoreResult;
use crate::resource::{ResourcePermissions, ResourceStore};
use crate::session::SessionStore;

pub struct StockStore {
    resources: ResourceStore<StockItem, StockClient>,
    warehouses: RwLock<Vec<WarehouseOverview>>,
}

impl StockStore {
    pub fn new(api: Arc<StockClient>, session: Arc<SessionStore>) -> Self {
        let permissions = ResourcePermissions {
            read: Some(catalog::STOCK_READ),
            ..Default::default()
        };
        Self {
            resources: ResourceStore::new("Stock", api, session, permissions),
            warehouses: RwLock::new(Vec::new()),
        }
    }

    pub fn resources(&self) -> &ResourceStore<StockItem, StockClient> {
        &self.resources
    }

    pub async fn fetch_warehouses(&self) -> StoreResult<Vec<WarehouseOverview>> {
        let ctx = self.resources.context_for(Some(&catalog::STOCK_READ)).await?;
        match self.resources.api().warehouses(&ctx).await.into_result() {
            Ok(warehouses) => {
                *self.warehouses.write().await = warehouses.clone();
                Ok(warehouses)
            }
            Err(e) => Err(self.resources.record_failure("warehouses", e).await),
        }
    }

    /// Service totals, completed with totals computed from cached items for
    /// warehouses the service did not summarize.
    pub async fn warehouses(&self) -> Vec<WarehouseOverview> {
        let mut overviews = self.warehouses.read().await.clone();
        let items = self.resources.items().await;

        let mut uncovered: BTreeMap<&WarehouseId, &str> = BTreeMap::new();
        for item in &items {
            if !overviews.iter().any(|o| o.warehouse_id == item.warehouse_id) {
                uncovered
                    .entry(&item.warehouse_id)
                    .or_insert_with(|| {
                        item.warehouse_name
                            .as_deref()
                            .unwrap_or(item.warehouse_id.as_str())
                    });
            }
        }
        overviews.extend(
            uncovered
                .into_iter()
                .map(|(id, name)| WarehouseOverview::from_items(id, name, &items)),
        );
        overviews
    }

    /// Cached items narrowed without a round-trip.
    pub async fn filtered(&self, filter: &StockFilter) -> Vec<StockItem> {
        let items = self.resources.items().await;
        filter.apply(&items).into_iter().cloned().collect()
    }

    pub async fn low_stock(&self) -> Vec<StockItem> {
        self.filtered(&StockFilter {
            low_stock_only: true,
            ..Default::default()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::RecordingNotifier;
    use crate::testing::{page_meta, session_store};
    use serde_json::{json, Value};
    use shipdesk_client::HttpClient;
    use shipdesk_core::PageRequest;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(id: &str, warehouse: &str, available: i64, threshold: i64) -> Value {
        json!({
            "id": id,
            "productId": format!("p-{id}"),
            "productName": format!("Produit {id}"),
            "sku": format!("SKU-{id}"),
            "warehouseId": warehouse,
            "warehouseName": format!("Entrepôt {warehouse}"),
            "quantityAvailable": available,
            "lowStockThreshold": threshold
        })
    }

    async fn store(server: &MockServer) -> StockStore {
        let notifier = Arc::new(RecordingNotifier::new());
        let session = session_store(&server.uri(), &["stock.read"], notifier).await;
        StockStore::new(Arc::new(StockClient::new(HttpClient::new(server.uri()))), session)
    }

    #[tokio::test]
    async fn filters_are_sent_and_applied_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stock"))
            .and(query_param("warehouseId", "w-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [item("a", "w-1", 3, 5), item("b", "w-1", 40, 5)],
                "meta": page_meta(2),
            })))
            .expect(1)
            .mount(&server)
            .await;
        let store = store(&server).await;

        let filter = StockFilter {
            warehouse_id: Some(WarehouseId::new("w-1")),
            ..Default::default()
        };
        store.resources().fetch(&filter, PageRequest::default()).await.unwrap();

        let low: Vec<_> = store.low_stock().await.into_iter().map(|i| i.product_name).collect();
        assert_eq!(low, vec!["Produit a".to_string()]);
        let search = StockFilter {
            search: Some("sku-b".into()),
            ..Default::default()
        };
        assert_eq!(store.filtered(&search).await.len(), 1);
    }

    #[tokio::test]
    async fn overview_fills_in_unsummarized_warehouses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stock/warehouses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "warehouseId": "w-1", "warehouseName": "Casablanca", "productCount": 12, "totalAvailable": 500 }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/stock"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [item("a", "w-1", 3, 5), item("b", "w-2", 7, 5), item("c", "w-2", 1, 5)],
                "meta": page_meta(3),
            })))
            .mount(&server)
            .await;
        let store = store(&server).await;
        store.fetch_warehouses().await.unwrap();
        store
            .resources()
            .fetch(&StockFilter::default(), PageRequest::default())
            .await
            .unwrap();

        let overviews = store.warehouses().await;
        assert_eq!(overviews.len(), 2);
        assert_eq!(overviews[0].total_available, 500);
        let w2 = &overviews[1];
        assert_eq!(w2.warehouse_name, "Entrepôt w-2");
        assert_eq!(w2.product_count, 2);
        assert_eq!(w2.total_available, 8);
        assert_eq!(w2.low_stock_count, 1);
    }
}
