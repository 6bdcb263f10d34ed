use shipdesk_auth::AuthSession;
use shipdesk_core::TenantId;

/// Tenant and credentials for one request.
///
/// Passed explicitly to every client call; nothing is read from ambient
/// storage.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestContext {
    tenant_id: TenantId,
    access_token: Option<String>,
}

impl RequestContext {
    pub fn new(tenant_id: TenantId, access_token: impl Into<String>) -> Self {
        Self {
            tenant_id,
            access_token: Some(access_token.into()),
        }
    }

    /// Context for unauthenticated calls (login, set-cookies).
    pub fn anonymous(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            access_token: None,
        }
    }

    pub fn from_session(session: &AuthSession) -> Self {
        Self::new(session.tenant_id.clone(), session.access_token.clone())
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

// Tokens stay out of logs.
impl core::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestContext")
            .field("tenant_id", &self.tenant_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_the_token() {
        let ctx = RequestContext::new(TenantId::new("t-1"), "secret-token");
        let rendered = format!("{ctx:?}");
        assert!(rendered.contains("t-1"));
        assert!(!rendered.contains("secret-token"));
        assert_eq!(ctx.access_token(), Some("secret-token"));
        assert_eq!(RequestContext::anonymous(TenantId::new("t-1")).access_token(), None);
    }
}
