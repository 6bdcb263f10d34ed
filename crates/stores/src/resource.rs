//! Generic list/CRUD store.
//!
//! State only changes after the service confirms (confirm-then-splice): a
//! failed call leaves the cached list untouched and records the error. Fetches
//! are numbered; a response that is not from the latest issued fetch is
//! dropped, so the last request issued wins regardless of arrival order.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shipdesk_auth::Permission;
use shipdesk_client::{ApiError, CrudApi, ListApi, PaginatedResponse, RequestContext};
use shipdesk_core::{PageMeta, PageRequest, Resource};

use crate::error::{StoreError, StoreResult};
use crate::notifier::Notifier;
use crate::session::SessionStore;

/// Permission required by each kind of action. `None` means no check.
#[derive(Debug, Clone, Default)]
pub struct ResourcePermissions {
    pub read: Option<Permission>,
    pub create: Option<Permission>,
    pub update: Option<Permission>,
    pub delete: Option<Permission>,
}

#[derive(Debug, Clone)]
pub struct ResourceState<R: Resource> {
    pub items: Vec<R>,
    pub meta: Option<PageMeta>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected_ids: HashSet<R::Id>,
    /// Record loaded on its own for a detail view.
    pub current: Option<R>,
}

impl<R: Resource> Default for ResourceState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            meta: None,
            loading: false,
            error: None,
            selected_ids: HashSet::new(),
            current: None,
        }
    }
}

impl<R: Resource> ResourceState<R> {
    pub fn find(&self, id: &R::Id) -> Option<&R> {
        self.items
            .iter()
            .find(|r| r.id() == id)
            .or_else(|| self.current.as_ref().filter(|r| r.id() == id))
    }

    pub fn is_selected(&self, id: &R::Id) -> bool {
        self.selected_ids.contains(id)
    }

    fn prune_selection(&mut self) {
        let known: HashSet<&R::Id> = self.items.iter().map(Resource::id).collect();
        self.selected_ids.retain(|id| known.contains(id));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was issued while this one was in flight.
    Superseded,
}

/// Result of a fan-out over several ids.
#[derive(Debug, Clone)]
pub struct BulkOutcome<Id> {
    pub total: usize,
    pub succeeded: Vec<Id>,
    pub failed: Vec<(Id, ApiError)>,
}

impl<Id> BulkOutcome<Id> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("{} sur {} réussi(s)", self.succeeded.len(), self.total)
    }
}

pub struct ResourceStore<R: Resource, A> {
    label: &'static str,
    api: Arc<A>,
    session: Arc<SessionStore>,
    permissions: ResourcePermissions,
    state: RwLock<ResourceState<R>>,
    generation: AtomicU64,
}

impl<R, A> ResourceStore<R, A>
where
    R: Resource,
    A: ListApi<R>,
{
    pub fn new(
        label: &'static str,
        api: Arc<A>,
        session: Arc<SessionStore>,
        permissions: ResourcePermissions,
    ) -> Self {
        Self {
            label,
            api,
            session,
            permissions,
            state: RwLock::new(ResourceState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        self.session.notifier()
    }

    pub async fn snapshot(&self) -> ResourceState<R> {
        self.state.read().await.clone()
    }

    pub async fn items(&self) -> Vec<R> {
        self.state.read().await.items.clone()
    }

    pub async fn find(&self, id: &R::Id) -> Option<R> {
        self.state.read().await.find(id).cloned()
    }

    pub async fn current(&self) -> Option<R> {
        self.state.read().await.current.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Session context for an action, checked against `permission` first.
    /// A refusal is toasted and nothing is sent.
    pub async fn context_for(
        &self,
        permission: Option<&Permission>,
    ) -> StoreResult<RequestContext> {
        self.session.authorize_action(self.label, permission).await
    }

    /// Record a failed call: keep the cache, set `error`, toast.
    pub async fn record_failure(&self, action: &str, error: ApiError) -> StoreError {
        warn!(
            resource = self.label,
            action,
            code = %error.code,
            status = ?error.status_code,
            "{}",
            error.message
        );
        {
            let mut state = self.state.write().await;
            state.loading = false;
            state.error = Some(error.message.clone());
        }
        self.notifier().error(&error.message);
        StoreError::Api(error)
    }

    pub async fn fetch(
        &self,
        filters: &A::Filters,
        page: PageRequest,
    ) -> StoreResult<FetchOutcome> {
        let ctx = self.context_for(self.permissions.read.as_ref()).await?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let resp = self.api.list(&ctx, filters, page).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(resource = self.label, generation, "stale fetch response dropped");
            return Ok(FetchOutcome::Superseded);
        }

        match resp.into_result() {
            Ok(page) => {
                self.apply_fetched(page).await;
                Ok(FetchOutcome::Applied)
            }
            Err(e) => Err(self.record_failure("fetch", e).await),
        }
    }

    /// Load one record as `current`, refreshing its list entry if cached.
    pub async fn fetch_one(&self, id: &R::Id) -> StoreResult<R> {
        let ctx = self.context_for(self.permissions.read.as_ref()).await?;
        match self.api.get(&ctx, id).await.into_result() {
            Ok(record) => {
                self.state.write().await.current = Some(record.clone());
                self.apply_confirmed_update(record.clone()).await;
                Ok(record)
            }
            Err(e) => Err(self.record_failure("get", e).await),
        }
    }

    /// Cached record, or a fetch when it is not cached.
    pub async fn get_or_fetch(&self, id: &R::Id) -> StoreResult<R> {
        match self.find(id).await {
            Some(record) => Ok(record),
            None => self.fetch_one(id).await,
        }
    }

    async fn apply_fetched(&self, page: PaginatedResponse<R>) {
        let mut state = self.state.write().await;
        state.items = page.data;
        state.meta = Some(page.meta);
        state.loading = false;
        state.error = None;
        state.prune_selection();
        debug!(resource = self.label, count = state.items.len(), "list replaced");
    }

    /// Prepend a record the service created. An id already cached is
    /// replaced in place instead, so a record never appears twice.
    pub async fn apply_confirmed_create(&self, record: R) {
        let mut state = self.state.write().await;
        match state.items.iter().position(|r| r.id() == record.id()) {
            Some(i) => state.items[i] = record,
            None => {
                state.items.insert(0, record);
                if let Some(meta) = state.meta.as_mut() {
                    *meta = PageMeta::from_counts(meta.page, meta.limit, meta.total + 1);
                }
            }
        }
        state.error = None;
    }

    /// Replace a cached record by id. Records not in the cache are ignored.
    pub async fn apply_confirmed_update(&self, record: R) {
        let mut state = self.state.write().await;
        if let Some(current) = state.current.as_mut().filter(|c| c.id() == record.id()) {
            *current = record.clone();
        }
        if let Some(slot) = state.items.iter_mut().find(|r| r.id() == record.id()) {
            *slot = record;
        }
        state.error = None;
    }

    /// Drop a record and its selection.
    pub async fn apply_confirmed_removal(&self, id: &R::Id) {
        let mut state = self.state.write().await;
        let before = state.items.len();
        state.items.retain(|r| r.id() != id);
        if state.items.len() < before {
            if let Some(meta) = state.meta.as_mut() {
                let total = meta.total.saturating_sub(1);
                *meta = PageMeta::from_counts(meta.page, meta.limit, total);
            }
        }
        state.selected_ids.remove(id);
        if state.current.as_ref().is_some_and(|c| c.id() == id) {
            state.current = None;
        }
        state.error = None;
    }

    pub async fn select(&self, id: R::Id) {
        self.state.write().await.selected_ids.insert(id);
    }

    pub async fn deselect(&self, id: &R::Id) {
        self.state.write().await.selected_ids.remove(id);
    }

    pub async fn toggle_selection(&self, id: R::Id) {
        let mut state = self.state.write().await;
        if !state.selected_ids.remove(&id) {
            state.selected_ids.insert(id);
        }
    }

    pub async fn select_all(&self) {
        let mut state = self.state.write().await;
        let ids: Vec<R::Id> = state.items.iter().map(|r| r.id().clone()).collect();
        state.selected_ids.extend(ids);
    }

    pub async fn clear_selection(&self) {
        self.state.write().await.selected_ids.clear();
    }

    pub async fn selected_ids(&self) -> Vec<R::Id> {
        let state = self.state.read().await;
        // Keep list order for display and for bulk calls.
        state
            .items
            .iter()
            .map(|r| r.id())
            .filter(|id| state.selected_ids.contains(*id))
            .cloned()
            .collect()
    }
}

impl<R, A> ResourceStore<R, A>
where
    R: Resource,
    A: CrudApi<R>,
{
    pub fn permissions(&self) -> &ResourcePermissions {
        &self.permissions
    }

    pub async fn create(&self, payload: &A::Create) -> StoreResult<R> {
        let ctx = self.context_for(self.permissions.create.as_ref()).await?;
        match self.api.create(&ctx, payload).await.into_result() {
            Ok(record) => {
                info!(resource = self.label, id = %record.id(), "created");
                self.apply_confirmed_create(record.clone()).await;
                self.notifier()
                    .success(&format!("{} : création réussie", self.label));
                Ok(record)
            }
            Err(e) => Err(self.record_failure("create", e).await),
        }
    }

    pub async fn update(&self, id: &R::Id, payload: &A::Update) -> StoreResult<R> {
        let ctx = self.context_for(self.permissions.update.as_ref()).await?;
        match self.api.update(&ctx, id, payload).await.into_result() {
            Ok(record) => {
                info!(resource = self.label, %id, "updated");
                self.apply_confirmed_update(record.clone()).await;
                self.notifier()
                    .success(&format!("{} : mise à jour réussie", self.label));
                Ok(record)
            }
            Err(e) => Err(self.record_failure("update", e).await),
        }
    }

    pub async fn delete(&self, id: &R::Id) -> StoreResult<()> {
        let ctx = self.context_for(self.permissions.delete.as_ref()).await?;
        match self.api.delete(&ctx, id).await.into_unit_result() {
            Ok(()) => {
                info!(resource = self.label, %id, "deleted");
                self.apply_confirmed_removal(id).await;
                self.notifier()
                    .success(&format!("{} : suppression réussie", self.label));
                Ok(())
            }
            Err(e) => Err(self.record_failure("delete", e).await),
        }
    }

    pub async fn toggle_status(&self, id: &R::Id) -> StoreResult<R> {
        let ctx = self.context_for(self.permissions.update.as_ref()).await?;
        match self.api.toggle_status(&ctx, id).await.into_result() {
            Ok(record) => {
                self.apply_confirmed_update(record.clone()).await;
                self.notifier()
                    .success(&format!("{} : statut mis à jour", self.label));
                Ok(record)
            }
            Err(e) => Err(self.record_failure("toggle_status", e).await),
        }
    }

    /// Delete every id concurrently, one request each.
    pub async fn bulk_delete(&self, ids: &[R::Id]) -> StoreResult<BulkOutcome<R::Id>> {
        let ctx = self.context_for(self.permissions.delete.as_ref()).await?;
        let results = join_all(ids.iter().map(|id| {
            let ctx = &ctx;
            async move { (id.clone(), self.api.delete(ctx, id).await.into_unit_result()) }
        }))
        .await;

        let mut outcome = BulkOutcome {
            total: ids.len(),
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (id, result) in results {
            match result {
                Ok(()) => {
                    self.apply_confirmed_removal(&id).await;
                    outcome.succeeded.push(id);
                }
                Err(e) => outcome.failed.push((id, e)),
            }
        }
        self.report_bulk("bulk_delete", "supprimés", &outcome).await;
        Ok(outcome)
    }

    /// Toggle every id concurrently, one request each.
    pub async fn bulk_toggle(&self, ids: &[R::Id]) -> StoreResult<BulkOutcome<R::Id>> {
        let ctx = self.context_for(self.permissions.update.as_ref()).await?;
        let results = join_all(ids.iter().map(|id| {
            let ctx = &ctx;
            async move { (id.clone(), self.api.toggle_status(ctx, id).await.into_result()) }
        }))
        .await;

        let mut outcome = BulkOutcome {
            total: ids.len(),
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (id, result) in results {
            match result {
                Ok(record) => {
                    self.apply_confirmed_update(record).await;
                    outcome.succeeded.push(id);
                }
                Err(e) => outcome.failed.push((id, e)),
            }
        }
        self.report_bulk("bulk_toggle", "mis à jour", &outcome).await;
        Ok(outcome)
    }

    pub(crate) async fn report_bulk(&self, action: &str, verb: &str, outcome: &BulkOutcome<R::Id>) {
        info!(
            resource = self.label,
            action,
            succeeded = outcome.succeeded.len(),
            total = outcome.total,
            "bulk action finished"
        );
        let message = format!("{} sur {} {verb}", outcome.succeeded.len(), outcome.total);
        if outcome.is_complete() {
            self.notifier().success(&message);
        } else {
            if let Some((_, e)) = outcome.failed.first() {
                self.state.write().await.error = Some(e.message.clone());
            }
            self.notifier().warning(&message);
        }
    }
}
