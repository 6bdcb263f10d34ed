use async_trait::async_trait;

use shipdesk_core::{PageRequest, StockItemId};
use shipdesk_inventory::{StockFilter, StockItem, WarehouseOverview};

use crate::context::RequestContext;
use crate::crud::{ListApi, ListQuery};
use crate::envelope::{ApiResponse, PaginatedResponse};
use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct StockClient {
    http: HttpClient,
}

impl StockClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn warehouses(&self, ctx: &RequestContext) -> ApiResponse<Vec<WarehouseOverview>> {
        self.http.get(ctx, "/api/stock/warehouses").await
    }
}

#[async_trait]
impl ListApi<StockItem> for StockClient {
    type Filters = StockFilter;

    async fn list(
        &self,
        ctx: &RequestContext,
        filters: &StockFilter,
        page: PageRequest,
    ) -> ApiResponse<PaginatedResponse<StockItem>> {
        self.http
            .get_with_query(ctx, "/api/stock", &ListQuery::new(filters, page))
            .await
    }

    async fn get(&self, ctx: &RequestContext, id: &StockItemId) -> ApiResponse<StockItem> {
        self.http.get(ctx, &format!("/api/stock/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shipdesk_core::TenantId;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn low_stock_flag_is_sent_only_when_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stock"))
            .and(query_param("lowStockOnly", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": "st-1", "productId": "p-1", "productName": "Mug",
                    "warehouseId": "w-1", "quantityAvailable": 2, "lowStockThreshold": 5
                }],
                "meta": { "page": 1, "limit": 20, "total": 1, "totalPages": 1,
                          "hasNext": false, "hasPrev": false }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = StockClient::new(HttpClient::new(server.uri()));
        let ctx = RequestContext::new(TenantId::new("tenant-1"), "tok");
        let filter = StockFilter {
            low_stock_only: true,
            ..Default::default()
        };
        let page = client
            .list(&ctx, &filter, PageRequest::default())
            .await
            .into_result()
            .unwrap();
        assert!(page.data[0].is_low_stock());
    }
}
