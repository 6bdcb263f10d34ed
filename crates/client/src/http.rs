//! Thin reqwest wrapper shared by every resource client.

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::envelope::{decode_failure, decode_success, ApiError, ApiResponse};

/// Tenant header read by every service.
pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// One backend service. Single attempt per call: no retries, no timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Share one connection pool across services.
    pub fn with_client(inner: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            inner,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> ApiResponse<T> {
        self.send(ctx, self.request(ctx, Method::GET, path)).await
    }

    pub async fn get_with_query<Q, T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: &Q,
    ) -> ApiResponse<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ctx, self.request(ctx, Method::GET, path).query(query))
            .await
    }

    pub async fn post<B, T>(&self, ctx: &RequestContext, path: &str, body: &B) -> ApiResponse<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ctx, self.request(ctx, Method::POST, path).json(body))
            .await
    }

    /// POST without a body (cancel, logout).
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> ApiResponse<T> {
        self.send(ctx, self.request(ctx, Method::POST, path)).await
    }

    pub async fn put<B, T>(&self, ctx: &RequestContext, path: &str, body: &B) -> ApiResponse<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ctx, self.request(ctx, Method::PUT, path).json(body))
            .await
    }

    pub async fn patch<B, T>(&self, ctx: &RequestContext, path: &str, body: &B) -> ApiResponse<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ctx, self.request(ctx, Method::PATCH, path).json(body))
            .await
    }

    pub async fn patch_empty<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> ApiResponse<T> {
        self.send(ctx, self.request(ctx, Method::PATCH, path)).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> ApiResponse<T> {
        self.send(ctx, self.request(ctx, Method::DELETE, path)).await
    }

    fn request(&self, ctx: &RequestContext, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .inner
            .request(method, url)
            .header(TENANT_HEADER, ctx.tenant_id().as_str());

        if let Some(token) = ctx.access_token() {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        req: RequestBuilder,
    ) -> ApiResponse<T> {
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(tenant = %ctx.tenant_id(), error = %e, "request failed before a response");
                return ApiResponse::failure(ApiError::network(e.to_string()));
            }
        };

        let status = resp.status();
        let url = resp.url().path().to_string();
        debug!(tenant = %ctx.tenant_id(), %status, path = %url, "response received");

        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%status, path = %url, error = %e, "failed to read response body");
                return ApiResponse::failure(ApiError::network(e.to_string()));
            }
        };

        if status.is_success() {
            decode_success(status.as_u16(), &body)
        } else {
            let error = decode_failure(status.as_u16(), status.canonical_reason(), &body);
            warn!(%status, path = %url, message = %error.message, "request rejected");
            ApiResponse::failure(error)
        }
    }
}
