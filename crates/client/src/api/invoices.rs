use async_trait::async_trait;
use serde::Serialize;

use shipdesk_core::{InvoiceId, PageRequest};
use shipdesk_invoicing::{GenerateInvoicePayload, Invoice, InvoiceFilters, MarkPaidPayload};

use crate::context::RequestContext;
use crate::crud::{ListApi, ListQuery};
use crate::envelope::{ApiResponse, PaginatedResponse};
use crate::http::HttpClient;

#[derive(Serialize)]
struct CancelBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct InvoiceClient {
    http: HttpClient,
}

impl InvoiceClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Invoices awaiting payment, across sellers.
    pub async fn pending(&self, ctx: &RequestContext) -> ApiResponse<Vec<Invoice>> {
        self.http.get(ctx, "/api/invoices/pending").await
    }

    pub async fn generate(
        &self,
        ctx: &RequestContext,
        payload: &GenerateInvoicePayload,
    ) -> ApiResponse<Invoice> {
        self.http.post(ctx, "/api/invoices/generate", payload).await
    }

    pub async fn mark_paid(
        &self,
        ctx: &RequestContext,
        id: &InvoiceId,
        payload: &MarkPaidPayload,
    ) -> ApiResponse<Invoice> {
        self.http
            .post(ctx, &format!("/api/invoices/{id}/mark-paid"), payload)
            .await
    }

    pub async fn cancel(
        &self,
        ctx: &RequestContext,
        id: &InvoiceId,
        reason: Option<&str>,
    ) -> ApiResponse<Invoice> {
        self.http
            .post(ctx, &format!("/api/invoices/{id}/cancel"), &CancelBody { reason })
            .await
    }
}

#[async_trait]
impl ListApi<Invoice> for InvoiceClient {
    type Filters = InvoiceFilters;

    async fn list(
        &self,
        ctx: &RequestContext,
        filters: &InvoiceFilters,
        page: PageRequest,
    ) -> ApiResponse<PaginatedResponse<Invoice>> {
        self.http
            .get_with_query(ctx, "/api/invoices", &ListQuery::new(filters, page))
            .await
    }

    async fn get(&self, ctx: &RequestContext, id: &InvoiceId) -> ApiResponse<Invoice> {
        self.http.get(ctx, &format!("/api/invoices/{id}")).await
    }
}
