//! Authenticated session held by the client.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shipdesk_core::{TenantId, UserId};

use crate::{AccessLevel, AccountStatus, PermissionSet, Role, UserType, ValidationStatus};

/// Identity summary returned by the login and `me` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    pub user_type: UserType,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub account_status: AccountStatus,
    #[serde(default)]
    pub validation_status: ValidationStatus,
}

impl SessionUser {
    pub fn access_level(&self) -> AccessLevel {
        self.user_type.access_level()
    }
}

/// Token grant as returned by `/api/auth/login` and `/api/auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    pub tenant_id: TenantId,
    pub user: SessionUser,
    #[serde(default)]
    pub permissions: PermissionSet,
}

/// Session state persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub tenant_id: TenantId,
    pub user: SessionUser,
    pub permissions: PermissionSet,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    #[error("no access token")]
    MissingToken,

    #[error("access token has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Upper bound on an access token lifetime (ten years).
pub const MAX_GRANT_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

impl AuthSession {
    /// Build a session from a grant received at `now`. The lifetime is
    /// clamped to [`MAX_GRANT_LIFETIME_SECS`].
    pub fn from_grant(grant: TokenGrant, now: DateTime<Utc>) -> Self {
        let lifetime = grant.expires_in.clamp(0, MAX_GRANT_LIFETIME_SECS);
        let expires_at = Duration::try_seconds(lifetime)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            issued_at: now,
            expires_at,
            tenant_id: grant.tenant_id,
            user: grant.user,
            permissions: grant.permissions,
        }
    }

    /// Apply a refreshed grant, keeping the old refresh token if the server
    /// did not rotate it.
    pub fn refreshed(&self, grant: TokenGrant, now: DateTime<Utc>) -> Self {
        let previous_refresh = self.refresh_token.clone();
        let mut next = Self::from_grant(grant, now);
        if next.refresh_token.is_none() {
            next.refresh_token = previous_refresh;
        }
        next
    }

    /// Check the token window. No signature verification happens client-side.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), SessionValidationError> {
        if self.access_token.trim().is_empty() {
            return Err(SessionValidationError::MissingToken);
        }
        if self.expires_at <= self.issued_at {
            return Err(SessionValidationError::InvalidTimeWindow);
        }
        if now < self.issued_at {
            return Err(SessionValidationError::NotYetValid);
        }
        if now >= self.expires_at {
            return Err(SessionValidationError::Expired);
        }
        Ok(())
    }

    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.validate(now).is_ok()
    }

    /// True when the token expires within `margin` of `now` (refresh window).
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at - now <= margin
    }

    /// Seconds left on the access token, clamped at zero.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.has_permission(permission)
    }

    pub fn has_any_permission<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        self.permissions.has_any_permission(permissions)
    }

    pub fn has_all_permissions<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        self.permissions.has_all_permissions(permissions)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::session;
    use super::*;

    #[test]
    fn authenticated_only_inside_the_token_window() {
        let now = Utc::now();
        let s = session(UserType::Admin, &["*"], now);

        assert!(s.is_authenticated(now));
        assert!(s.is_authenticated(now + Duration::seconds(3599)));
        assert_eq!(
            s.validate(now + Duration::seconds(3600)),
            Err(SessionValidationError::Expired)
        );
        assert_eq!(
            s.validate(now - Duration::seconds(1)),
            Err(SessionValidationError::NotYetValid)
        );
    }

    #[test]
    fn empty_token_is_never_authenticated() {
        let now = Utc::now();
        let mut s = session(UserType::Admin, &[], now);
        s.access_token = "  ".to_string();
        assert_eq!(s.validate(now), Err(SessionValidationError::MissingToken));
    }

    #[test]
    fn zero_lifetime_grant_is_an_invalid_window() {
        let now = Utc::now();
        let mut s = session(UserType::Admin, &[], now);
        s.expires_at = s.issued_at;
        assert_eq!(s.validate(now), Err(SessionValidationError::InvalidTimeWindow));
    }

    #[test]
    fn refresh_keeps_previous_refresh_token_when_not_rotated() {
        let now = Utc::now();
        let s = session(UserType::Manager, &["users.read"], now);
        let grant = TokenGrant {
            access_token: "access-2".to_string(),
            refresh_token: None,
            expires_in: 60,
            tenant_id: s.tenant_id.clone(),
            user: s.user.clone(),
            permissions: s.permissions.clone(),
        };
        let later = now + Duration::seconds(10);
        let next = s.refreshed(grant, later);
        assert_eq!(next.access_token, "access-2");
        assert_eq!(next.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(next.remaining_seconds(later), 60);
        assert!(next.expires_within(later, Duration::seconds(60)));
    }

    #[test]
    fn oversized_lifetime_saturates_instead_of_overflowing() {
        let now = Utc::now();
        let s = session(UserType::Admin, &[], now);
        let grant = TokenGrant {
            access_token: "access".to_string(),
            refresh_token: None,
            expires_in: 10_000_000_000_000,
            tenant_id: s.tenant_id.clone(),
            user: s.user.clone(),
            permissions: s.permissions.clone(),
        };
        let long = AuthSession::from_grant(grant.clone(), now);
        assert_eq!(long.remaining_seconds(now), MAX_GRANT_LIFETIME_SECS);
        assert!(long.is_authenticated(now));

        let max = AuthSession::from_grant(TokenGrant { expires_in: i64::MAX, ..grant }, now);
        assert_eq!(max.expires_at, long.expires_at);

        let encoded = serde_json::to_string(&max).unwrap();
        let decoded: AuthSession = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.expires_at, max.expires_at);
    }

    #[test]
    fn grant_parses_from_camel_case_json() {
        let grant: TokenGrant = serde_json::from_value(serde_json::json!({
            "accessToken": "a",
            "refreshToken": "r",
            "expiresIn": 900,
            "tenantId": "t-9",
            "user": {
                "id": "u-9",
                "email": "boss@example.com",
                "userType": "ADMIN",
                "accountStatus": "ACTIVE"
            },
            "permissions": ["tariffs.read", "*"]
        }))
        .unwrap();
        assert_eq!(grant.tenant_id.as_str(), "t-9");
        assert!(grant.permissions.has_wildcard());
        assert_eq!(grant.user.validation_status, ValidationStatus::Pending);
    }
}
