use async_trait::async_trait;
use serde::Serialize;

use shipdesk_core::{ExpeditionId, PageRequest};
use shipdesk_expeditions::{
    Expedition, ExpeditionFilters, ReceiveExpeditionPayload, ReceiveExpeditionResponse,
    UpdateStatusPayload,
};

use crate::context::RequestContext;
use crate::crud::{ListApi, ListQuery};
use crate::envelope::{ApiResponse, PaginatedResponse};
use crate::http::HttpClient;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelExpeditionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExpeditionClient {
    http: HttpClient,
}

impl ExpeditionClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: &ExpeditionId,
        payload: &UpdateStatusPayload,
    ) -> ApiResponse<Expedition> {
        self.http
            .patch(ctx, &format!("/api/expeditions/{id}/status"), payload)
            .await
    }

    pub async fn cancel(
        &self,
        ctx: &RequestContext,
        id: &ExpeditionId,
        payload: &CancelExpeditionPayload,
    ) -> ApiResponse<Expedition> {
        self.http
            .post(ctx, &format!("/api/expeditions/{id}/cancel"), payload)
            .await
    }

    /// Submit received quantities. Reconciliation happens server-side.
    pub async fn receive(
        &self,
        ctx: &RequestContext,
        id: &ExpeditionId,
        payload: &ReceiveExpeditionPayload,
    ) -> ApiResponse<ReceiveExpeditionResponse> {
        self.http
            .post(ctx, &format!("/api/expeditions/{id}/receive"), payload)
            .await
    }
}

#[async_trait]
impl ListApi<Expedition> for ExpeditionClient {
    type Filters = ExpeditionFilters;

    async fn list(
        &self,
        ctx: &RequestContext,
        filters: &ExpeditionFilters,
        page: PageRequest,
    ) -> ApiResponse<PaginatedResponse<Expedition>> {
        self.http
            .get_with_query(ctx, "/api/expeditions", &ListQuery::new(filters, page))
            .await
    }

    async fn get(&self, ctx: &RequestContext, id: &ExpeditionId) -> ApiResponse<Expedition> {
        self.http.get(ctx, &format!("/api/expeditions/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shipdesk_core::TenantId;
    use shipdesk_expeditions::{ExpeditionStatus, ReceiveItem};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> RequestContext {
        RequestContext::new(TenantId::new("tenant-1"), "tok")
    }

    fn expedition_json(status: &str) -> serde_json::Value {
        json!({
            "id": "exp-1",
            "reference": "EXP-0001",
            "sellerId": "s-1",
            "warehouseId": "w-1",
            "status": status,
            "items": [{ "id": "a", "productId": "p-1", "quantity_sent": 10 }]
        })
    }

    #[tokio::test]
    async fn receive_posts_the_payload_and_decodes_the_report() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/expeditions/exp-1/receive"))
            .and(body_json(json!({
                "items": [{ "itemId": "a", "quantity_received": 8, "quantity_defective": 1 }],
                "receivedBy": "agent-7"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "expedition": expedition_json("received"),
                "stockUpdates": [{ "productId": "p-1", "quantityAdded": 8 }],
                "discrepancies": [{ "itemId": "a", "expected": 10, "actual": 9 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ExpeditionClient::new(HttpClient::new(server.uri()));
        let payload = ReceiveExpeditionPayload::new("agent-7", vec![ReceiveItem::new("a", 8, 1)]);
        let report = client
            .receive(&ctx(), &ExpeditionId::new("exp-1"), &payload)
            .await
            .into_result()
            .unwrap();

        assert_eq!(report.expedition.status, ExpeditionStatus::Received);
        assert_eq!(report.discrepancies.len(), 1);
        assert_eq!(report.discrepancies[0].expected, 10);
        assert_eq!(report.stock_updates[0].quantity_added, 8);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/expeditions"))
            .and(query_param("status", "pointed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [expedition_json("pointed")],
                "meta": { "page": 1, "limit": 20, "total": 1, "totalPages": 1,
                          "hasNext": false, "hasPrev": false }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ExpeditionClient::new(HttpClient::new(server.uri()));
        let filters = ExpeditionFilters {
            status: Some(ExpeditionStatus::Pointed),
            ..Default::default()
        };
        let page = client
            .list(&ctx(), &filters, PageRequest::default())
            .await
            .into_result()
            .unwrap();
        assert_eq!(page.data[0].status, ExpeditionStatus::Pointed);
    }

    #[tokio::test]
    async fn status_update_is_a_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/expeditions/exp-1/status"))
            .and(body_json(json!({ "status": "prepared" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(expedition_json("prepared")))
            .expect(1)
            .mount(&server)
            .await;

        let client = ExpeditionClient::new(HttpClient::new(server.uri()));
        let payload = UpdateStatusPayload {
            status: ExpeditionStatus::Prepared,
            notes: None,
        };
        let exp = client
            .update_status(&ctx(), &ExpeditionId::new("exp-1"), &payload)
            .await
            .into_result()
            .unwrap();
        assert_eq!(exp.status, ExpeditionStatus::Prepared);
    }
}
