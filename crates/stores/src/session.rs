//! Session store: the single piece of state shared by every other store.
//!
//! Holds the authenticated session, persists it through a
//! [`SessionPersistence`] and answers permission checks locally.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use shipdesk_auth::{
    authorize, AuthSession, AuthzError, GateDecision, Permission, RouteRequirement,
};
use shipdesk_client::{AuthClient, LoginPayload, RequestContext, SetCookiesPayload};
use shipdesk_core::TenantId;

use crate::error::{StoreError, StoreResult};
use crate::notifier::Notifier;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("session database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt session record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where the session survives between runs.
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    async fn load(&self) -> Result<Option<AuthSession>, PersistenceError>;

    async fn save(&self, session: &AuthSession) -> Result<(), PersistenceError>;

    async fn clear(&self) -> Result<(), PersistenceError>;
}

/// Process-lifetime persistence.
#[derive(Debug, Default)]
pub struct MemorySessionPersistence {
    slot: Mutex<Option<AuthSession>>,
}

impl MemorySessionPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionPersistence for MemorySessionPersistence {
    async fn load(&self) -> Result<Option<AuthSession>, PersistenceError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, session: &AuthSession) -> Result<(), PersistenceError> {
        *self.slot.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        *self.slot.lock().await = None;
        Ok(())
    }
}

const CURRENT_SLOT: &str = "current";

/// SQLite-backed persistence (one row, last write wins).
#[derive(Debug, Clone)]
pub struct SqliteSessionPersistence {
    path: PathBuf,
    /// Opened lazily on first use.
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteSessionPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn pool(&self) -> Result<SqlitePool, PersistenceError> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                slot      TEXT PRIMARY KEY,
                data      TEXT NOT NULL,
                saved_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        debug!(path = %self.path.display(), "session database opened");
        *guard = Some(pool.clone());
        Ok(pool)
    }
}

#[async_trait]
impl SessionPersistence for SqliteSessionPersistence {
    async fn load(&self) -> Result<Option<AuthSession>, PersistenceError> {
        let pool = self.pool().await?;
        let row = sqlx::query("SELECT data FROM sessions WHERE slot = ?1")
            .bind(CURRENT_SLOT)
            .fetch_optional(&pool)
            .await?;

        match row {
            Some(row) => {
                let data: String = row.try_get("data")?;
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session: &AuthSession) -> Result<(), PersistenceError> {
        let pool = self.pool().await?;
        let data = serde_json::to_string(session)?;
        sqlx::query(
            r#"
            INSERT INTO sessions (slot, data, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(slot) DO UPDATE SET data = excluded.data, saved_at = excluded.saved_at
            "#,
        )
        .bind(CURRENT_SLOT)
        .bind(&data)
        .bind(Utc::now().to_rfc3339())
        .execute(&pool)
        .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        let pool = self.pool().await?;
        sqlx::query("DELETE FROM sessions WHERE slot = ?1")
            .bind(CURRENT_SLOT)
            .execute(&pool)
            .await?;
        Ok(())
    }
}

pub struct SessionStore {
    auth: AuthClient,
    persistence: Arc<dyn SessionPersistence>,
    notifier: Arc<dyn Notifier>,
    session: RwLock<Option<AuthSession>>,
}

impl SessionStore {
    pub fn new(
        auth: AuthClient,
        persistence: Arc<dyn SessionPersistence>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            auth,
            persistence,
            notifier,
            session: RwLock::new(None),
        }
    }

    /// Reload the persisted session. An expired one is discarded.
    pub async fn restore(&self) -> StoreResult<bool> {
        let loaded = self.persistence.load().await?;
        let now = Utc::now();
        match loaded {
            Some(session) if session.is_authenticated(now) => {
                info!(tenant = %session.tenant_id, user = %session.user.email, "session restored");
                *self.session.write().await = Some(session);
                Ok(true)
            }
            Some(_) => {
                debug!("persisted session expired, discarding");
                self.persistence.clear().await?;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    pub async fn login(
        &self,
        tenant_id: TenantId,
        email: &str,
        password: &str,
    ) -> StoreResult<AuthSession> {
        let ctx = RequestContext::anonymous(tenant_id);
        let resp = self
            .auth
            .login(&ctx, &LoginPayload::new(email, password))
            .await;

        let grant = match resp.into_result() {
            Ok(grant) => grant,
            Err(e) => {
                warn!(email, error = %e, "login failed");
                self.notifier.error(&e.message);
                return Err(e.into());
            }
        };

        let session = AuthSession::from_grant(grant, Utc::now());
        {
            let mut guard = self.session.write().await;
            self.persistence.save(&session).await?;
            *guard = Some(session.clone());
        }
        info!(tenant = %session.tenant_id, user = %session.user.email, "logged in");
        self.notifier.success("Connexion réussie");
        Ok(session)
    }

    /// Local state is cleared even if the service call fails.
    pub async fn logout(&self) -> StoreResult<()> {
        let previous = self.session.write().await.take();
        if let Some(session) = &previous {
            let ctx = RequestContext::from_session(session);
            if let Err(e) = self.auth.logout(&ctx).await.into_unit_result() {
                warn!(error = %e, "logout call failed; local session cleared anyway");
            }
        }
        self.persistence.clear().await?;
        info!("logged out");
        Ok(())
    }

    pub async fn refresh(&self) -> StoreResult<AuthSession> {
        let current = self.current().await.ok_or(StoreError::NotAuthenticated)?;
        let refresh_token = current
            .refresh_token
            .clone()
            .ok_or(StoreError::NotAuthenticated)?;

        let ctx = RequestContext::anonymous(current.tenant_id.clone());
        let grant = match self.auth.refresh(&ctx, &refresh_token).await.into_result() {
            Ok(grant) => grant,
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                return Err(e.into());
            }
        };

        let next = current.refreshed(grant, Utc::now());
        let mut guard = self.session.write().await;
        self.persistence.save(&next).await?;
        *guard = Some(next.clone());
        drop(guard);
        debug!(expires_at = %next.expires_at, "session refreshed");
        Ok(next)
    }

    /// Re-fetch identity and permissions from `/api/auth/me`.
    pub async fn reload_profile(&self) -> StoreResult<()> {
        let ctx = self.request_context().await?;
        let me = self.auth.me(&ctx).await.into_result()?;

        let mut guard = self.session.write().await;
        if let Some(session) = guard.as_mut() {
            session.user = me.user;
            session.permissions = me.permissions;
            self.persistence.save(session).await?;
        }
        Ok(())
    }

    /// Hand the current tokens to the cookie endpoint (embedded web views).
    pub async fn bootstrap_cookies(&self) -> StoreResult<()> {
        let session = self.current().await.ok_or(StoreError::NotAuthenticated)?;
        let ctx = RequestContext::from_session(&session);
        let payload = SetCookiesPayload {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_in: session.remaining_seconds(Utc::now()),
        };
        self.auth
            .set_cookies(&ctx, &payload)
            .await
            .into_unit_result()?;
        Ok(())
    }

    /// Drop the session if it expired by `now`. Returns whether one is still
    /// active.
    pub async fn recheck(&self, now: DateTime<Utc>) -> bool {
        let mut guard = self.session.write().await;
        match guard.as_ref() {
            None => return false,
            Some(s) if s.is_authenticated(now) => return true,
            Some(_) => {}
        }

        *guard = None;
        // Cleared under the guard so a concurrent install is not wiped.
        if let Err(e) = self.persistence.clear().await {
            warn!(error = %e, "failed to clear expired session");
        }
        drop(guard);
        info!("session expired");
        self.notifier.warning("Session expirée, veuillez vous reconnecter");
        false
    }

    /// Periodic [`recheck`](Self::recheck). Abort the handle to stop it.
    pub fn spawn_expiry_watch(self: &Arc<Self>, every: StdDuration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                store.recheck(Utc::now()).await;
            }
        })
    }

    pub async fn current(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now()).await
    }

    pub async fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.is_authenticated(now))
    }

    pub async fn has_permission(&self, permission: &str) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.has_permission(permission))
    }

    pub async fn has_any_permission<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.has_any_permission(permissions))
    }

    pub async fn has_all_permissions<P: AsRef<str>>(&self, permissions: &[P]) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.has_all_permissions(permissions))
    }

    pub async fn evaluate(&self, requirement: &RouteRequirement) -> GateDecision {
        let guard = self.session.read().await;
        requirement.evaluate(guard.as_ref(), Utc::now())
    }

    /// Context of an authenticated call.
    pub async fn request_context(&self) -> StoreResult<RequestContext> {
        let guard = self.session.read().await;
        match guard.as_ref() {
            Some(s) if s.is_authenticated(Utc::now()) => Ok(RequestContext::from_session(s)),
            _ => Err(StoreError::NotAuthenticated),
        }
    }

    /// Context of a call that needs `permission`. Refused locally, before any
    /// request, when the session lacks it.
    pub async fn require(&self, permission: &Permission) -> StoreResult<RequestContext> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(StoreError::NotAuthenticated)?;
        match authorize(Some(session), &session.tenant_id, permission, Utc::now()) {
            Ok(()) => Ok(RequestContext::from_session(session)),
            Err(AuthzError::NotAuthenticated) => Err(StoreError::NotAuthenticated),
            Err(e) => Err(StoreError::PermissionDenied(e.to_string())),
        }
    }

    /// Guard for a user action: the context when `permission` (if any) is
    /// held, otherwise an error toast and no context.
    pub async fn authorize_action(
        &self,
        action: &str,
        permission: Option<&Permission>,
    ) -> StoreResult<RequestContext> {
        let result = match permission {
            Some(p) => self.require(p).await,
            None => self.request_context().await,
        };
        if let Err(e) = &result {
            warn!(action, error = %e, "action refused locally");
            let message = match e {
                StoreError::NotAuthenticated => "Veuillez vous connecter",
                _ => "Vous n'avez pas la permission d'effectuer cette action",
            };
            self.notifier.error(message);
        }
        result
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Install a session directly (tests, embedding).
    pub async fn install(&self, session: AuthSession) -> StoreResult<()> {
        let mut guard = self.session.write().await;
        self.persistence.save(&session).await?;
        *guard = Some(session);
        Ok(())
    }
}
