//! Shared fixtures for the store tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use shipdesk_auth::{AuthSession, TokenGrant};
use shipdesk_client::{AuthClient, HttpClient};

use crate::notifier::RecordingNotifier;
use crate::session::{MemorySessionPersistence, SessionStore};

pub fn grant(permissions: &[&str]) -> Value {
    json!({
        "accessToken": "access",
        "refreshToken": "refresh",
        "expiresIn": 3600,
        "tenantId": "tenant-1",
        "user": {
            "id": "u-1",
            "email": "admin@example.com",
            "displayName": "Admin",
            "userType": "ADMIN",
            "accountStatus": "ACTIVE",
            "validationStatus": "VALIDATED"
        },
        "permissions": permissions,
    })
}

pub fn session_at(permissions: &[&str], issued_at: DateTime<Utc>) -> AuthSession {
    let mut grant: TokenGrant = serde_json::from_value(grant(permissions)).unwrap();
    grant.refresh_token = Some("refresh".into());
    AuthSession::from_grant(grant, issued_at)
}

/// A logged-in session store whose services all live at `uri`.
pub async fn session_store(
    uri: &str,
    permissions: &[&str],
    notifier: Arc<RecordingNotifier>,
) -> Arc<SessionStore> {
    let store = SessionStore::new(
        AuthClient::new(HttpClient::new(uri)),
        Arc::new(MemorySessionPersistence::new()),
        notifier,
    );
    store.install(session_at(permissions, Utc::now())).await.unwrap();
    Arc::new(store)
}

pub fn page_meta(total: u64) -> Value {
    json!({
        "page": 1, "limit": 20, "total": total, "totalPages": 1,
        "hasNext": false, "hasPrev": false
    })
}
