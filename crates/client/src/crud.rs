//! Traits the generic resource store is written against.

use async_trait::async_trait;
use serde::Serialize;

use shipdesk_core::{PageRequest, Resource};

use crate::context::RequestContext;
use crate::envelope::{ApiResponse, PaginatedResponse};

/// Read side of a resource collection.
#[async_trait]
pub trait ListApi<R: Resource>: Send + Sync {
    type Filters: Serialize + Clone + Default + Send + Sync;

    async fn list(
        &self,
        ctx: &RequestContext,
        filters: &Self::Filters,
        page: PageRequest,
    ) -> ApiResponse<PaginatedResponse<R>>;

    async fn get(&self, ctx: &RequestContext, id: &R::Id) -> ApiResponse<R>;
}

/// Full CRUD plus the active/inactive toggle most back-office lists carry.
#[async_trait]
pub trait CrudApi<R: Resource>: ListApi<R> {
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;

    async fn create(&self, ctx: &RequestContext, payload: &Self::Create) -> ApiResponse<R>;

    async fn update(
        &self,
        ctx: &RequestContext,
        id: &R::Id,
        payload: &Self::Update,
    ) -> ApiResponse<R>;

    async fn delete(&self, ctx: &RequestContext, id: &R::Id) -> ApiResponse<()>;

    async fn toggle_status(&self, ctx: &RequestContext, id: &R::Id) -> ApiResponse<R>;
}

/// Query string of a list call: the filters flattened next to the page.
#[derive(Serialize)]
pub(crate) struct ListQuery<'a, F: Serialize> {
    #[serde(flatten)]
    pub filters: &'a F,
    pub page: u32,
    pub limit: u32,
}

impl<'a, F: Serialize> ListQuery<'a, F> {
    pub fn new(filters: &'a F, page: PageRequest) -> Self {
        Self {
            filters,
            page: page.page,
            limit: page.limit,
        }
    }
}
