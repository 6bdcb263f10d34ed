//! Seller invoices ("factures").

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use shipdesk_auth::permissions::catalog;
use shipdesk_client::InvoiceClient;
use shipdesk_core::InvoiceId;
use shipdesk_invoicing::{GenerateInvoicePayload, Invoice, MarkPaidPayload, PendingSummary};

use crate::error::StoreResult;
use crate::resource::{ResourcePermissions, ResourceStore};
use crate::session::SessionStore;

pub struct InvoiceStore {
    resources: ResourceStore<Invoice, InvoiceClient>,
    pending: RwLock<Vec<Invoice>>,
}

impl InvoiceStore {
    pub fn new(api: Arc<InvoiceClient>, session: Arc<SessionStore>) -> Self {
        let permissions = ResourcePermissions {
            read: Some(catalog::INVOICES_READ),
            create: Some(catalog::INVOICES_MANAGE),
            update: Some(catalog::INVOICES_MANAGE),
            ..Default::default()
        };
        Self {
            resources: ResourceStore::new("Facture", api, session, permissions),
            pending: RwLock::new(Vec::new()),
        }
    }

    pub fn resources(&self) -> &ResourceStore<Invoice, InvoiceClient> {
        &self.resources
    }

    pub async fn fetch_pending(&self) -> StoreResult<Vec<Invoice>> {
        let ctx = self.resources.context_for(Some(&catalog::INVOICES_READ)).await?;
        match self.resources.api().pending(&ctx).await.into_result() {
            Ok(pending) => {
                *self.pending.write().await = pending.clone();
                Ok(pending)
            }
            Err(e) => Err(self.resources.record_failure("pending", e).await),
        }
    }

    pub async fn pending(&self) -> Vec<Invoice> {
        self.pending.read().await.clone()
    }

    /// Count and outstanding total of the last pending fetch.
    pub async fn pending_summary(&self) -> PendingSummary {
        PendingSummary::from_invoices(self.pending.read().await.iter())
    }

    pub async fn generate(&self, payload: &GenerateInvoicePayload) -> StoreResult<Invoice> {
        let ctx = self.resources.context_for(Some(&catalog::INVOICES_MANAGE)).await?;
        match self.resources.api().generate(&ctx, payload).await.into_result() {
            Ok(invoice) => {
                info!(id = %invoice.id, seller = %invoice.seller_id, "invoice generated");
                self.resources.apply_confirmed_create(invoice.clone()).await;
                self.track_pending(&invoice).await;
                self.resources
                    .notifier()
                    .success(&format!("Facture {} générée", invoice.reference));
                Ok(invoice)
            }
            Err(e) => Err(self.resources.record_failure("generate", e).await),
        }
    }

    /// Record a payment. Only pending invoices are accepted.
    pub async fn mark_paid(
        &self,
        id: &InvoiceId,
        payload: &MarkPaidPayload,
    ) -> StoreResult<Invoice> {
        let ctx = self.resources.context_for(Some(&catalog::INVOICES_MANAGE)).await?;
        if let Some(invoice) = self.find(id).await {
            if let Err(e) = invoice.ensure_payable() {
                self.resources.notifier().error(&format!(
                    "La facture {} est {} et ne peut pas être payée",
                    invoice.reference,
                    invoice.status.label().to_lowercase()
                ));
                return Err(e.into());
            }
        }
        match self.resources.api().mark_paid(&ctx, id, payload).await.into_result() {
            Ok(invoice) => {
                info!(%id, "invoice paid");
                self.splice(invoice.clone()).await;
                self.resources
                    .notifier()
                    .success(&format!("Facture {} marquée payée", invoice.reference));
                Ok(invoice)
            }
            Err(e) => Err(self.resources.record_failure("mark_paid", e).await),
        }
    }

    pub async fn cancel(&self, id: &InvoiceId, reason: Option<&str>) -> StoreResult<Invoice> {
        let ctx = self.resources.context_for(Some(&catalog::INVOICES_MANAGE)).await?;
        if let Some(invoice) = self.find(id).await {
            if let Err(e) = invoice.ensure_cancellable() {
                self.resources
                    .notifier()
                    .error(&format!("La facture {} ne peut pas être annulée", invoice.reference));
                return Err(e.into());
            }
        }
        match self.resources.api().cancel(&ctx, id, reason).await.into_result() {
            Ok(invoice) => {
                info!(%id, "invoice cancelled");
                self.splice(invoice.clone()).await;
                self.resources
                    .notifier()
                    .success(&format!("Facture {} annulée", invoice.reference));
                Ok(invoice)
            }
            Err(e) => Err(self.resources.record_failure("cancel", e).await),
        }
    }

    async fn find(&self, id: &InvoiceId) -> Option<Invoice> {
        match self.resources.find(id).await {
            Some(invoice) => Some(invoice),
            None => self.pending.read().await.iter().find(|i| &i.id == id).cloned(),
        }
    }

    async fn splice(&self, invoice: Invoice) {
        self.track_pending(&invoice).await;
        self.resources.apply_confirmed_update(invoice).await;
    }

    /// Keep the pending list in step with a confirmed invoice.
    async fn track_pending(&self, invoice: &Invoice) {
        let mut pending = self.pending.write().await;
        pending.retain(|i| i.id != invoice.id);
        if invoice.can_accept_payment() {
            pending.push(invoice.clone());
        }
    }
}
