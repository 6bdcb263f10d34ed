//! Permission gate: decides whether a screen or action is offered.
//!
//! - No IO
//! - No panics
//! - Not authoritative; the backend re-checks each request

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use shipdesk_core::TenantId;

use crate::{AccessLevel, AccountStatus, AuthSession, Permission, ValidationStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Check a single permission for an action scoped to `tenant_id`.
pub fn authorize(
    session: Option<&AuthSession>,
    tenant_id: &TenantId,
    required: &Permission,
    now: DateTime<Utc>,
) -> Result<(), AuthzError> {
    let session = session
        .filter(|s| s.is_authenticated(now))
        .ok_or(AuthzError::NotAuthenticated)?;

    if &session.tenant_id != tenant_id {
        return Err(AuthzError::TenantMismatch);
    }

    if session.has_permission(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Why a gate refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenialReason {
    NotAuthenticated,
    MissingPermissions { missing: Vec<String> },
    NoneOfPermissions { expected_any: Vec<String> },
    AccessLevelTooLow { required: AccessLevel, actual: AccessLevel },
    AccountStatus { required: AccountStatus, actual: AccountStatus },
    AccountNotValidated,
}

impl core::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DenialReason::NotAuthenticated => write!(f, "sign in to continue"),
            DenialReason::MissingPermissions { missing } => {
                write!(f, "missing permissions: {}", missing.join(", "))
            }
            DenialReason::NoneOfPermissions { expected_any } => {
                write!(f, "requires one of: {}", expected_any.join(", "))
            }
            DenialReason::AccessLevelTooLow { required, actual } => {
                write!(f, "access level {actual:?} is below {required:?}")
            }
            DenialReason::AccountStatus { required, actual } => {
                write!(f, "account is {actual}, expected {required}")
            }
            DenialReason::AccountNotValidated => write!(f, "account awaiting validation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny(DenialReason),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

/// Requirements of a route (page) before its content is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRequirement {
    pub all_of: Vec<Permission>,
    pub any_of: Vec<Permission>,
    pub min_access_level: Option<AccessLevel>,
    pub account_status: Option<AccountStatus>,
    pub require_validated: bool,
}

impl RouteRequirement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permission(mut self, permission: Permission) -> Self {
        self.all_of.push(permission);
        self
    }

    pub fn any_permission(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.any_of.extend(permissions);
        self
    }

    pub fn min_access_level(mut self, level: AccessLevel) -> Self {
        self.min_access_level = Some(level);
        self
    }

    pub fn account_status(mut self, status: AccountStatus) -> Self {
        self.account_status = Some(status);
        self
    }

    pub fn validated(mut self) -> Self {
        self.require_validated = true;
        self
    }

    /// Evaluate against the current session. Checks run in a fixed order and
    /// the first failing one is reported.
    pub fn evaluate(&self, session: Option<&AuthSession>, now: DateTime<Utc>) -> GateDecision {
        let Some(session) = session.filter(|s| s.is_authenticated(now)) else {
            return GateDecision::Deny(DenialReason::NotAuthenticated);
        };

        if let Some(required) = self.account_status {
            let actual = session.user.account_status;
            if actual != required {
                return GateDecision::Deny(DenialReason::AccountStatus { required, actual });
            }
        }

        if self.require_validated && session.user.validation_status != ValidationStatus::Validated {
            return GateDecision::Deny(DenialReason::AccountNotValidated);
        }

        if let Some(required) = self.min_access_level {
            let actual = session.user.access_level();
            if actual < required {
                return GateDecision::Deny(DenialReason::AccessLevelTooLow { required, actual });
            }
        }

        let missing = session.permissions.missing(&self.all_of);
        if !missing.is_empty() {
            return GateDecision::Deny(DenialReason::MissingPermissions {
                missing: missing.into_iter().map(str::to_string).collect(),
            });
        }

        if !self.any_of.is_empty() && !session.has_any_permission(&self.any_of) {
            return GateDecision::Deny(DenialReason::NoneOfPermissions {
                expected_any: self.any_of.iter().map(|p| p.as_str().to_string()).collect(),
            });
        }

        tracing::trace!(user = %session.user.id, "route gate passed");
        GateDecision::Allow
    }
}
