use async_trait::async_trait;
use serde::Serialize;

use shipdesk_auth::{CreateUserPayload, UpdateUserPayload, User, UserFilters, ValidationStatus};
use shipdesk_core::{PageRequest, UserId};

use crate::context::RequestContext;
use crate::crud::{CrudApi, ListApi, ListQuery};
use crate::envelope::{ApiResponse, PaginatedResponse};
use crate::http::HttpClient;

/// Decision on a pending account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAccountPayload {
    pub status: ValidationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserClient {
    http: HttpClient,
}

impl UserClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn validate_account(
        &self,
        ctx: &RequestContext,
        id: &UserId,
        payload: &ValidateAccountPayload,
    ) -> ApiResponse<User> {
        self.http
            .post(ctx, &format!("/api/users/{id}/validate"), payload)
            .await
    }
}

#[async_trait]
impl ListApi<User> for UserClient {
    type Filters = UserFilters;

    async fn list(
        &self,
        ctx: &RequestContext,
        filters: &UserFilters,
        page: PageRequest,
    ) -> ApiResponse<PaginatedResponse<User>> {
        self.http
            .get_with_query(ctx, "/api/users", &ListQuery::new(filters, page))
            .await
    }

    async fn get(&self, ctx: &RequestContext, id: &UserId) -> ApiResponse<User> {
        self.http.get(ctx, &format!("/api/users/{id}")).await
    }
}

#[async_trait]
impl CrudApi<User> for UserClient {
    type Create = CreateUserPayload;
    type Update = UpdateUserPayload;

    async fn create(&self, ctx: &RequestContext, payload: &CreateUserPayload) -> ApiResponse<User> {
        self.http.post(ctx, "/api/users", payload).await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: &UserId,
        payload: &UpdateUserPayload,
    ) -> ApiResponse<User> {
        self.http.put(ctx, &format!("/api/users/{id}"), payload).await
    }

    async fn delete(&self, ctx: &RequestContext, id: &UserId) -> ApiResponse<()> {
        self.http.delete(ctx, &format!("/api/users/{id}")).await
    }

    async fn toggle_status(&self, ctx: &RequestContext, id: &UserId) -> ApiResponse<User> {
        self.http
            .patch_empty(ctx, &format!("/api/users/{id}/toggle-status"))
            .await
    }
}
