use async_trait::async_trait;

use shipdesk_core::{PageRequest, ParcelId, SlipId};
use shipdesk_slips::{
    AddParcelPayload, Slip, SlipFilters, SlipKind, SlipStatus, UpdateSlipStatusPayload,
};

use crate::context::RequestContext;
use crate::crud::{ListApi, ListQuery};
use crate::envelope::{ApiResponse, PaginatedResponse};
use crate::http::HttpClient;

/// Delivery or shipping slips; both families share one API shape.
#[derive(Debug, Clone)]
pub struct SlipClient {
    http: HttpClient,
    kind: SlipKind,
}

impl SlipClient {
    pub fn new(http: HttpClient, kind: SlipKind) -> Self {
        Self { http, kind }
    }

    pub fn kind(&self) -> SlipKind {
        self.kind
    }

    fn collection(&self) -> String {
        format!("/api/{}", self.kind.path_segment())
    }

    /// Attach a scanned parcel; answers with the updated slip.
    pub async fn add_parcel(
        &self,
        ctx: &RequestContext,
        id: &SlipId,
        parcel_code: &str,
    ) -> ApiResponse<Slip> {
        let body = AddParcelPayload {
            parcel_code: parcel_code.to_string(),
        };
        self.http
            .post(ctx, &format!("{}/{id}/parcels", self.collection()), &body)
            .await
    }

    pub async fn remove_parcel(
        &self,
        ctx: &RequestContext,
        id: &SlipId,
        parcel_id: &ParcelId,
    ) -> ApiResponse<Slip> {
        self.http
            .delete(ctx, &format!("{}/{id}/parcels/{parcel_id}", self.collection()))
            .await
    }

    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: &SlipId,
        status: SlipStatus,
    ) -> ApiResponse<Slip> {
        self.http
            .patch(
                ctx,
                &format!("{}/{id}/status", self.collection()),
                &UpdateSlipStatusPayload { status },
            )
            .await
    }
}

#[async_trait]
impl ListApi<Slip> for SlipClient {
    type Filters = SlipFilters;

    async fn list(
        &self,
        ctx: &RequestContext,
        filters: &SlipFilters,
        page: PageRequest,
    ) -> ApiResponse<PaginatedResponse<Slip>> {
        self.http
            .get_with_query(ctx, &self.collection(), &ListQuery::new(filters, page))
            .await
    }

    async fn get(&self, ctx: &RequestContext, id: &SlipId) -> ApiResponse<Slip> {
        self.http
            .get(ctx, &format!("{}/{id}", self.collection()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shipdesk_core::TenantId;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> RequestContext {
        RequestContext::new(TenantId::new("tenant-1"), "tok")
    }

    #[tokio::test]
    async fn kinds_route_to_their_own_collection() {
        let server = MockServer::start().await;
        let slip = json!({
            "id": "be-1", "reference": "BE-0001", "status": "PENDING",
            "items": [{ "parcelId": "p1", "parcelReference": "PARCEL123", "scanned": true }]
        });
        Mock::given(method("POST"))
            .and(path("/api/shipping-slips/be-1/parcels"))
            .and(body_json(json!({ "parcelCode": "PARCEL123" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(slip))
            .expect(1)
            .mount(&server)
            .await;

        let client = SlipClient::new(HttpClient::new(server.uri()), SlipKind::Shipping);
        let updated = client
            .add_parcel(&ctx(), &SlipId::new("be-1"), "PARCEL123")
            .await
            .into_result()
            .unwrap();
        assert_eq!(updated.summary().scanned_parcels, 1);
    }

    #[tokio::test]
    async fn remove_parcel_deletes_the_sub_resource() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/delivery-slips/bl-1/parcels/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "bl-1", "reference": "BL-0001", "status": "PENDING", "items": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SlipClient::new(HttpClient::new(server.uri()), SlipKind::Delivery);
        let updated = client
            .remove_parcel(&ctx(), &SlipId::new("bl-1"), &ParcelId::new("p1"))
            .await
            .into_result()
            .unwrap();
        assert!(updated.items.is_empty());
    }
}
