use serde::{Deserialize, Serialize};

use shipdesk_auth::{PermissionSet, SessionUser, TokenGrant};

use crate::context::RequestContext;
use crate::envelope::ApiResponse;
use crate::http::HttpClient;

#[derive(Clone, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

impl LoginPayload {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginPayload")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPayload {
    pub refresh_token: String,
}

/// Body of `/api/auth/set-cookies`, used to bootstrap an embedded web view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookiesPayload {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Answer of `/api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
    pub user: SessionUser,
    #[serde(default)]
    pub permissions: PermissionSet,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: HttpClient,
}

impl AuthClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn login(
        &self,
        ctx: &RequestContext,
        payload: &LoginPayload,
    ) -> ApiResponse<TokenGrant> {
        self.http.post(ctx, "/api/auth/login", payload).await
    }

    pub async fn refresh(
        &self,
        ctx: &RequestContext,
        refresh_token: &str,
    ) -> ApiResponse<TokenGrant> {
        let body = RefreshPayload {
            refresh_token: refresh_token.to_string(),
        };
        self.http.post(ctx, "/api/auth/refresh", &body).await
    }

    pub async fn logout(&self, ctx: &RequestContext) -> ApiResponse<()> {
        self.http.post_empty(ctx, "/api/auth/logout").await
    }

    pub async fn me(&self, ctx: &RequestContext) -> ApiResponse<CurrentUser> {
        self.http.get(ctx, "/api/auth/me").await
    }

    pub async fn set_cookies(
        &self,
        ctx: &RequestContext,
        payload: &SetCookiesPayload,
    ) -> ApiResponse<()> {
        self.http.post(ctx, "/api/auth/set-cookies", payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shipdesk_auth::UserType;
    use shipdesk_core::TenantId;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn grant_json() -> serde_json::Value {
        json!({
            "accessToken": "acc",
            "refreshToken": "ref",
            "expiresIn": 900,
            "tenantId": "tenant-1",
            "user": {
                "id": "u-1",
                "email": "admin@example.com",
                "displayName": "Admin",
                "userType": "ADMIN"
            },
            "permissions": ["*"]
        })
    }

    #[tokio::test]
    async fn login_posts_credentials_and_decodes_the_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": "admin@example.com", "password": "s3cret!!" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": grant_json() })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = AuthClient::new(HttpClient::new(server.uri()));
        let ctx = RequestContext::anonymous(TenantId::new("tenant-1"));
        let grant = client
            .login(&ctx, &LoginPayload::new("admin@example.com", "s3cret!!"))
            .await
            .into_result()
            .unwrap();

        assert_eq!(grant.access_token, "acc");
        assert_eq!(grant.expires_in, 900);
        assert_eq!(grant.user.user_type, UserType::Admin);
        assert!(grant.permissions.has_wildcard());
    }

    #[tokio::test]
    async fn bad_credentials_surface_as_401() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Identifiants invalides" })),
            )
            .mount(&server)
            .await;

        let client = AuthClient::new(HttpClient::new(server.uri()));
        let ctx = RequestContext::anonymous(TenantId::new("tenant-1"));
        let err = client
            .login(&ctx, &LoginPayload::new("x@example.com", "nope"))
            .await
            .into_result()
            .unwrap_err();
        assert!(err.is_status(401));
        assert_eq!(err.message, "Identifiants invalides");
    }

    #[tokio::test]
    async fn set_cookies_sends_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/set-cookies"))
            .and(body_json(json!({ "accessToken": "acc", "refreshToken": "ref", "expiresIn": 900 })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = AuthClient::new(HttpClient::new(server.uri()));
        let ctx = RequestContext::new(TenantId::new("tenant-1"), "acc");
        let payload = SetCookiesPayload {
            access_token: "acc".into(),
            refresh_token: Some("ref".into()),
            expires_in: 900,
        };
        assert!(client.set_cookies(&ctx, &payload).await.into_unit_result().is_ok());
    }

    #[test]
    fn login_debug_hides_password() {
        let rendered = format!("{:?}", LoginPayload::new("a@b.c", "hunter22"));
        assert!(!rendered.contains("hunter22"));
    }
}
