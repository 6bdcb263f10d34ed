//! Expeditions list and the receiving flow.

use std::sync::Arc;

use tracing::{info, warn};

use shipdesk_auth::permissions::catalog;
use shipdesk_client::{CancelExpeditionPayload, ExpeditionClient};
use shipdesk_core::{DomainError, ExpeditionId};
use shipdesk_expeditions::{
    Expedition, ExpeditionStatus, ReceiveExpeditionPayload, ReceiveExpeditionResponse,
    UpdateStatusPayload,
};

use crate::error::{StoreError, StoreResult};
use crate::resource::{ResourcePermissions, ResourceStore};
use crate::session::SessionStore;

pub struct ExpeditionStore {
    resources: ResourceStore<Expedition, ExpeditionClient>,
}

impl ExpeditionStore {
    pub fn new(api: Arc<ExpeditionClient>, session: Arc<SessionStore>) -> Self {
        let permissions = ResourcePermissions {
            read: Some(catalog::EXPEDITIONS_READ),
            update: Some(catalog::EXPEDITIONS_UPDATE),
            ..Default::default()
        };
        Self {
            resources: ResourceStore::new("Expédition", api, session, permissions),
        }
    }

    pub fn resources(&self) -> &ResourceStore<Expedition, ExpeditionClient> {
        &self.resources
    }

    /// Expedition open in the detail or receive view.
    pub async fn current(&self) -> Option<Expedition> {
        self.resources.current().await
    }

    pub async fn open(&self, id: &ExpeditionId) -> StoreResult<Expedition> {
        self.resources.fetch_one(id).await
    }

    /// Open the receive form; refused for received or cancelled expeditions.
    pub async fn open_for_receiving(&self, id: &ExpeditionId) -> StoreResult<Expedition> {
        let expedition = self.open(id).await?;
        if let Err(e) = expedition.ensure_receivable() {
            self.resources
                .notifier()
                .warning(&format!(
                    "L'expédition {} ne peut plus être réceptionnée",
                    expedition.reference
                ));
            return Err(e.into());
        }
        Ok(expedition)
    }

    pub async fn update_status(
        &self,
        id: &ExpeditionId,
        status: ExpeditionStatus,
        notes: Option<String>,
    ) -> StoreResult<Expedition> {
        let ctx = self
            .resources
            .context_for(Some(&catalog::EXPEDITIONS_UPDATE))
            .await?;
        let expedition = self.resources.get_or_fetch(id).await?;
        if !expedition.status.can_transition_to(status) {
            let err = DomainError::transition(expedition.status, status);
            self.resources.notifier().error(&format!(
                "Transition impossible : {} → {}",
                expedition.status.label(),
                status.label()
            ));
            return Err(err.into());
        }

        let payload = UpdateStatusPayload { status, notes };
        match self.resources.api().update_status(&ctx, id, &payload).await.into_result() {
            Ok(updated) => {
                info!(%id, status = %updated.status, "expedition status updated");
                self.resources.apply_confirmed_update(updated.clone()).await;
                self.resources
                    .notifier()
                    .success(&format!("Statut : {}", updated.status.label()));
                Ok(updated)
            }
            Err(e) => Err(self.resources.record_failure("update_status", e).await),
        }
    }

    pub async fn cancel(
        &self,
        id: &ExpeditionId,
        reason: Option<String>,
    ) -> StoreResult<Expedition> {
        self.ensure_cancellable(id).await?;
        let ctx = self
            .resources
            .context_for(Some(&catalog::EXPEDITIONS_UPDATE))
            .await?;
        let payload = CancelExpeditionPayload { reason };
        match self.resources.api().cancel(&ctx, id, &payload).await.into_result() {
            Ok(cancelled) => {
                info!(%id, "expedition cancelled");
                self.resources.apply_confirmed_update(cancelled.clone()).await;
                self.resources.notifier().success("Expédition annulée");
                Ok(cancelled)
            }
            Err(e) => Err(self.resources.record_failure("cancel", e).await),
        }
    }

    async fn ensure_cancellable(&self, id: &ExpeditionId) -> StoreResult<()> {
        if let Some(expedition) = self.resources.find(id).await {
            if expedition.status.is_terminal() {
                self.resources
                    .notifier()
                    .error(&format!(
                        "L'expédition {} est déjà clôturée",
                        expedition.reference
                    ));
                let to = ExpeditionStatus::Cancelled;
                return Err(DomainError::transition(expedition.status, to).into());
            }
        }
        Ok(())
    }

    /// Submit received quantities.
    ///
    /// The payload is checked against the expedition first. On success the
    /// returned expedition replaces the cached one; each discrepancy raises a
    /// warning and each stock update an info toast.
    pub async fn receive(
        &self,
        id: &ExpeditionId,
        payload: &ReceiveExpeditionPayload,
    ) -> StoreResult<ReceiveExpeditionResponse> {
        let ctx = self
            .resources
            .context_for(Some(&catalog::EXPEDITIONS_RECEIVE))
            .await?;
        let expedition = self.resources.get_or_fetch(id).await?;
        if let Err(e) = payload.validate_for(&expedition) {
            warn!(%id, error = %e, "receive payload refused");
            self.resources.notifier().error(&e.to_string());
            return Err(StoreError::Receive(e));
        }

        let response = match self.resources.api().receive(&ctx, id, payload).await.into_result() {
            Ok(response) => response,
            Err(e) => return Err(self.resources.record_failure("receive", e).await),
        };
        info!(
            %id,
            discrepancies = response.discrepancies.len(),
            stock_updates = response.stock_updates.len(),
            "expedition received"
        );

        self.resources.apply_confirmed_update(response.expedition.clone()).await;
        let notifier = self.resources.notifier();
        for discrepancy in &response.discrepancies {
            notifier.warning(&discrepancy.describe());
        }
        for update in &response.stock_updates {
            notifier.info(&update.describe());
        }
        notifier.success(&format!("Expédition {} réceptionnée", response.expedition.reference));
        Ok(response)
    }
}
