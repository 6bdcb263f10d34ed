use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use shipdesk_core::{CityId, PageRequest, TariffId};
use shipdesk_tariffs::{
    City, CoverageStats, CreatePickupCityPayload, CreateTariffPayload, ImportRow, MissingTariff,
    PickupCity, PickupCityFilters, ServerImportReport, Tariff, TariffFilters,
    UpdatePickupCityPayload, UpdateTariffPayload,
};

use crate::context::RequestContext;
use crate::crud::{CrudApi, ListApi, ListQuery};
use crate::envelope::{ApiResponse, PaginatedResponse};
use crate::http::HttpClient;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResult {
    #[serde(default)]
    pub deleted: u32,
    #[serde(default)]
    pub failed_ids: Vec<TariffId>,
}

#[derive(Serialize)]
struct IdsBody<'a> {
    ids: &'a [TariffId],
}

#[derive(Serialize)]
struct ImportBody<'a> {
    rows: &'a [ImportRow],
}

#[derive(Debug, Clone)]
pub struct TariffClient {
    http: HttpClient,
}

impl TariffClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Batch delete in one request.
    pub async fn bulk_delete(
        &self,
        ctx: &RequestContext,
        ids: &[TariffId],
    ) -> ApiResponse<BulkDeleteResult> {
        self.http
            .post(ctx, "/api/tariffs/bulk-delete", &IdsBody { ids })
            .await
    }

    /// Send validated CSV rows.
    pub async fn import_rows(
        &self,
        ctx: &RequestContext,
        rows: &[ImportRow],
    ) -> ApiResponse<ServerImportReport> {
        self.http
            .post(ctx, "/api/tariffs/import", &ImportBody { rows })
            .await
    }

    pub async fn missing(&self, ctx: &RequestContext) -> ApiResponse<Vec<MissingTariff>> {
        self.http.get(ctx, "/api/tariffs/missing").await
    }

    pub async fn coverage(&self, ctx: &RequestContext) -> ApiResponse<CoverageStats> {
        self.http.get(ctx, "/api/tariffs/coverage").await
    }
}

#[async_trait]
impl ListApi<Tariff> for TariffClient {
    type Filters = TariffFilters;

    async fn list(
        &self,
        ctx: &RequestContext,
        filters: &TariffFilters,
        page: PageRequest,
    ) -> ApiResponse<PaginatedResponse<Tariff>> {
        self.http
            .get_with_query(ctx, "/api/tariffs", &ListQuery::new(filters, page))
            .await
    }

    async fn get(&self, ctx: &RequestContext, id: &TariffId) -> ApiResponse<Tariff> {
        self.http.get(ctx, &format!("/api/tariffs/{id}")).await
    }
}

#[async_trait]
impl CrudApi<Tariff> for TariffClient {
    type Create = CreateTariffPayload;
    type Update = UpdateTariffPayload;

    async fn create(
        &self,
        ctx: &RequestContext,
        payload: &CreateTariffPayload,
    ) -> ApiResponse<Tariff> {
        self.http.post(ctx, "/api/tariffs", payload).await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: &TariffId,
        payload: &UpdateTariffPayload,
    ) -> ApiResponse<Tariff> {
        self.http.put(ctx, &format!("/api/tariffs/{id}"), payload).await
    }

    async fn delete(&self, ctx: &RequestContext, id: &TariffId) -> ApiResponse<()> {
        self.http.delete(ctx, &format!("/api/tariffs/{id}")).await
    }

    async fn toggle_status(&self, ctx: &RequestContext, id: &TariffId) -> ApiResponse<Tariff> {
        self.http
            .patch_empty(ctx, &format!("/api/tariffs/{id}/toggle-status"))
            .await
    }
}

/// Read-only city referential.
#[derive(Debug, Clone)]
pub struct CityClient {
    http: HttpClient,
}

impl CityClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, ctx: &RequestContext) -> ApiResponse<Vec<City>> {
        self.http.get(ctx, "/api/cities").await
    }
}

#[derive(Debug, Clone)]
pub struct PickupCityClient {
    http: HttpClient,
}

impl PickupCityClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ListApi<PickupCity> for PickupCityClient {
    type Filters = PickupCityFilters;

    async fn list(
        &self,
        ctx: &RequestContext,
        filters: &PickupCityFilters,
        page: PageRequest,
    ) -> ApiResponse<PaginatedResponse<PickupCity>> {
        self.http
            .get_with_query(ctx, "/api/pickup-cities", &ListQuery::new(filters, page))
            .await
    }

    async fn get(&self, ctx: &RequestContext, id: &CityId) -> ApiResponse<PickupCity> {
        self.http.get(ctx, &format!("/api/pickup-cities/{id}")).await
    }
}

#[async_trait]
impl CrudApi<PickupCity> for PickupCityClient {
    type Create = CreatePickupCityPayload;
    type Update = UpdatePickupCityPayload;

    async fn create(
        &self,
        ctx: &RequestContext,
        payload: &CreatePickupCityPayload,
    ) -> ApiResponse<PickupCity> {
        self.http.post(ctx, "/api/pickup-cities", payload).await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: &CityId,
        payload: &UpdatePickupCityPayload,
    ) -> ApiResponse<PickupCity> {
        self.http
            .put(ctx, &format!("/api/pickup-cities/{id}"), payload)
            .await
    }

    async fn delete(&self, ctx: &RequestContext, id: &CityId) -> ApiResponse<()> {
        self.http.delete(ctx, &format!("/api/pickup-cities/{id}")).await
    }

    async fn toggle_status(&self, ctx: &RequestContext, id: &CityId) -> ApiResponse<PickupCity> {
        self.http
            .patch_empty(ctx, &format!("/api/pickup-cities/{id}/toggle-status"))
            .await
    }
}
