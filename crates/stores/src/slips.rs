//! Delivery and shipping slips with barcode scanning.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use shipdesk_auth::permissions::catalog;
use shipdesk_client::SlipClient;
use shipdesk_core::{DomainError, ParcelId, SlipId};
use shipdesk_slips::{ScanOutcome, ScanSession, Slip, SlipKind, SlipStatus};

use crate::error::StoreResult;
use crate::resource::{ResourcePermissions, ResourceStore};
use crate::session::SessionStore;

/// One store per slip family.
pub struct SlipStore {
    kind: SlipKind,
    resources: ResourceStore<Slip, SlipClient>,
    scans: RwLock<HashMap<SlipId, ScanSession>>,
}

impl SlipStore {
    pub fn new(api: Arc<SlipClient>, session: Arc<SessionStore>) -> Self {
        let kind = api.kind();
        let permissions = ResourcePermissions {
            read: Some(catalog::SLIPS_READ),
            update: Some(catalog::SLIPS_UPDATE),
            ..Default::default()
        };
        Self {
            kind,
            resources: ResourceStore::new(kind.label(), api, session, permissions),
            scans: RwLock::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> SlipKind {
        self.kind
    }

    pub fn resources(&self) -> &ResourceStore<Slip, SlipClient> {
        &self.resources
    }

    /// Load a slip and seed its scan session.
    pub async fn open(&self, id: &SlipId) -> StoreResult<Slip> {
        let slip = self.resources.fetch_one(id).await?;
        self.scans
            .write()
            .await
            .entry(id.clone())
            .or_default()
            .sync_with(&slip);
        Ok(slip)
    }

    /// Codes recorded for a slip, sorted.
    pub async fn scanned_codes(&self, id: &SlipId) -> Vec<String> {
        let scans = self.scans.read().await;
        let mut codes: Vec<String> = scans
            .get(id)
            .map(|session| session.codes().map(str::to_string).collect())
            .unwrap_or_default();
        codes.sort();
        codes
    }

    async fn slip(&self, id: &SlipId) -> StoreResult<Slip> {
        let slip = self.resources.get_or_fetch(id).await?;
        let mut scans = self.scans.write().await;
        scans
            .entry(id.clone())
            .or_insert_with(|| ScanSession::from_slip(&slip));
        Ok(slip)
    }

    async fn splice(&self, slip: Slip) {
        if let Some(session) = self.scans.write().await.get_mut(&slip.id) {
            session.sync_with(&slip);
        }
        self.resources.apply_confirmed_update(slip).await;
    }

    /// Handle one scanner read.
    ///
    /// A code already on the slip raises a warning and sends nothing.
    pub async fn scan(&self, id: &SlipId, raw: &str) -> StoreResult<ScanOutcome> {
        let ctx = self.resources.context_for(Some(&catalog::SLIPS_SCAN)).await?;
        let slip = self.slip(id).await?;
        if !slip.status.is_open() {
            self.resources
                .notifier()
                .error(&format!("Le bordereau {} est clôturé", slip.reference));
            let message = format!("slip {} is {}", slip.reference, slip.status.as_str());
            return Err(DomainError::validation(message).into());
        }

        let outcome = match self.scans.read().await.get(id) {
            Some(session) => session.check(raw),
            None => ScanSession::from_slip(&slip).check(raw),
        };
        let code = match &outcome {
            ScanOutcome::Empty => {
                self.resources.notifier().warning("Code colis vide");
                return Ok(outcome);
            }
            ScanOutcome::AlreadyScanned(code) => {
                debug!(slip = %id, code, "duplicate scan ignored");
                self.resources
                    .notifier()
                    .warning(&format!("Colis {code} déjà scanné"));
                return Ok(outcome);
            }
            ScanOutcome::Accepted(code) => code.clone(),
        };

        match self.resources.api().add_parcel(&ctx, id, &code).await.into_result() {
            Ok(updated) => {
                info!(slip = %id, code, "parcel added");
                self.scans
                    .write()
                    .await
                    .entry(id.clone())
                    .or_default()
                    .confirm(&code);
                self.splice(updated).await;
                self.resources
                    .notifier()
                    .success(&format!("Colis {code} ajouté"));
                Ok(outcome)
            }
            Err(e) => Err(self.resources.record_failure("add_parcel", e).await),
        }
    }

    pub async fn remove_parcel(&self, id: &SlipId, parcel_id: &ParcelId) -> StoreResult<Slip> {
        let ctx = self.resources.context_for(Some(&catalog::SLIPS_SCAN)).await?;
        let before = self.slip(id).await?;
        let code = before
            .items
            .iter()
            .find(|item| &item.parcel_id == parcel_id)
            .map(|item| item.parcel_reference.clone());

        match self.resources.api().remove_parcel(&ctx, id, parcel_id).await.into_result() {
            Ok(updated) => {
                info!(slip = %id, parcel = %parcel_id, "parcel removed");
                if let (Some(code), Some(session)) = (code, self.scans.write().await.get_mut(id)) {
                    session.forget(&code);
                }
                self.splice(updated.clone()).await;
                self.resources.notifier().success("Colis retiré du bordereau");
                Ok(updated)
            }
            Err(e) => Err(self.resources.record_failure("remove_parcel", e).await),
        }
    }

    pub async fn update_status(&self, id: &SlipId, status: SlipStatus) -> StoreResult<Slip> {
        let ctx = self.resources.context_for(Some(&catalog::SLIPS_UPDATE)).await?;
        let slip = self.slip(id).await?;
        if !slip.status.can_transition_to(status) {
            self.resources.notifier().error(&format!(
                "Transition impossible : {} → {}",
                slip.status.as_str(),
                status.as_str()
            ));
            return Err(DomainError::transition(slip.status.as_str(), status.as_str()).into());
        }
        match self.resources.api().update_status(&ctx, id, status).await.into_result() {
            Ok(updated) => {
                self.splice(updated.clone()).await;
                self.resources
                    .notifier()
                    .success(&format!(
                        "Bordereau {} : {}",
                        updated.reference,
                        updated.status.as_str()
                    ));
                Ok(updated)
            }
            Err(e) => Err(self.resources.record_failure("update_status", e).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::notifier::{RecordingNotifier, ToastLevel};
    use crate::testing::session_store;
    use serde_json::{json, Value};
    use shipdesk_client::HttpClient;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn slip(scanned: &[(&str, &str)], pending: &[(&str, &str)]) -> Value {
        let items: Vec<Value> = scanned
            .iter()
            .map(|(id, code)| json!({ "parcelId": id, "parcelReference": code, "value": 100, "scanned": true }))
            .chain(
                pending
                    .iter()
                    .map(|(id, code)| json!({ "parcelId": id, "parcelReference": code, "value": 50, "scanned": false })),
            )
            .collect();
        json!({ "id": "bl-1", "reference": "BL-0001", "status": "PENDING", "items": items })
    }

    async fn store(server: &MockServer) -> (SlipStore, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let session = session_store(&server.uri(), &["*"], notifier.clone()).await;
        let api = Arc::new(SlipClient::new(HttpClient::new(server.uri()), SlipKind::Delivery));
        (SlipStore::new(api, session), notifier)
    }

    async fn mount_slip(server: &MockServer, body: Value) {
        Mock::given(method("GET"))
            .and(path("/api/delivery-slips/bl-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn already_scanned_code_sends_nothing() {
        let server = MockServer::start().await;
        mount_slip(&server, slip(&[("p1", "PARCEL123")], &[])).await;
        Mock::given(method("POST"))
            .and(path("/api/delivery-slips/bl-1/parcels"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (store, notifier) = store(&server).await;
        let id = SlipId::new("bl-1");
        store.open(&id).await.unwrap();

        let outcome = store.scan(&id, "PARCEL123").await.unwrap();

        assert_eq!(outcome, ScanOutcome::AlreadyScanned("PARCEL123".into()));
        let warnings = notifier.of_level(ToastLevel::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("déjà scanné"));
    }

    #[tokio::test]
    async fn new_code_is_added_then_becomes_duplicate() {
        let server = MockServer::start().await;
        mount_slip(&server, slip(&[], &[("p2", "PARCEL456")])).await;
        Mock::given(method("POST"))
            .and(path("/api/delivery-slips/bl-1/parcels"))
            .and(body_json(json!({ "parcelCode": "PARCEL456" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(slip(&[("p2", "PARCEL456")], &[])))
            .expect(1)
            .mount(&server)
            .await;
        let (store, notifier) = store(&server).await;
        let id = SlipId::new("bl-1");
        store.open(&id).await.unwrap();

        let first = store.scan(&id, "  PARCEL456 ").await.unwrap();
        let second = store.scan(&id, "PARCEL456").await.unwrap();

        assert_eq!(first, ScanOutcome::Accepted("PARCEL456".into()));
        assert_eq!(second, ScanOutcome::AlreadyScanned("PARCEL456".into()));
        assert_eq!(notifier.of_level(ToastLevel::Success).len(), 1);
        assert_eq!(store.scanned_codes(&id).await, vec!["PARCEL456".to_string()]);
    }

    #[tokio::test]
    async fn blank_read_is_ignored() {
        let server = MockServer::start().await;
        mount_slip(&server, slip(&[], &[])).await;
        let (store, notifier) = store(&server).await;

        let outcome = store.scan(&SlipId::new("bl-1"), "   ").await.unwrap();
        assert_eq!(outcome, ScanOutcome::Empty);
        assert_eq!(notifier.of_level(ToastLevel::Warning).len(), 1);
        // Only the slip lookup.
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removed_parcel_can_be_scanned_again() {
        let server = MockServer::start().await;
        mount_slip(&server, slip(&[("p1", "PARCEL123")], &[])).await;
        Mock::given(method("DELETE"))
            .and(path("/api/delivery-slips/bl-1/parcels/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(slip(&[], &[])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/delivery-slips/bl-1/parcels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(slip(&[("p1", "PARCEL123")], &[])))
            .expect(1)
            .mount(&server)
            .await;
        let (store, _) = store(&server).await;
        let id = SlipId::new("bl-1");
        store.open(&id).await.unwrap();

        store.remove_parcel(&id, &ParcelId::new("p1")).await.unwrap();
        let outcome = store.scan(&id, "PARCEL123").await.unwrap();
        assert_eq!(outcome, ScanOutcome::Accepted("PARCEL123".into()));
    }

    #[tokio::test]
    async fn closed_slip_refuses_scans() {
        let server = MockServer::start().await;
        let mut body = slip(&[], &[]);
        body["status"] = json!("SHIPPED");
        mount_slip(&server, body).await;
        let (store, notifier) = store(&server).await;

        let err = store.scan(&SlipId::new("bl-1"), "PARCEL9").await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));
        assert_eq!(notifier.of_level(ToastLevel::Error).len(), 1);
    }
}
