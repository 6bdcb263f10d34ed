//! `shipdesk-auth`: session and permission model of the back office.
//!
//! Everything here is a UI affordance: the backend re-checks every request.
//! The crate is decoupled from HTTP and storage.

pub mod gate;
pub mod permissions;
pub mod session;
pub mod user;
pub mod user_type;

pub use gate::{authorize, AuthzError, DenialReason, GateDecision, RouteRequirement};
pub use permissions::{Permission, PermissionSet};
pub use session::{AuthSession, SessionUser, SessionValidationError, TokenGrant};
pub use user::{CreateUserPayload, Role, UpdateUserPayload, User, UserFilters};
pub use user_type::{can_create_user_type, AccessLevel, AccountStatus, UserType, ValidationStatus};
