//! Tariff configuration: route prices, cities, pickup cities, CSV import and
//! coverage of missing routes.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use shipdesk_auth::permissions::catalog;
use shipdesk_client::{codes, ApiError, CityClient, PickupCityClient, TariffClient};
use shipdesk_core::TariffId;
use shipdesk_tariffs::{
    export_csv, parse_import, template_csv, City, CityDirectory, CoverageStats,
    CreateTariffPayload, ImportReport, MissingTariff, MissingTariffFilter, PickupCity, Tariff,
    UpdateTariffPayload,
};

use crate::error::{StoreError, StoreResult};
use crate::forms::{validate_form, FormErrors};
use crate::resource::{BulkOutcome, ResourcePermissions, ResourceStore};
use crate::session::SessionStore;

pub type PickupCityStore = ResourceStore<PickupCity, PickupCityClient>;

pub fn pickup_city_store(
    api: Arc<PickupCityClient>,
    session: Arc<SessionStore>,
) -> PickupCityStore {
    ResourceStore::new(
        "Ville de ramassage",
        api,
        session,
        ResourcePermissions {
            read: Some(catalog::CITIES_READ),
            create: Some(catalog::CITIES_MANAGE),
            update: Some(catalog::CITIES_MANAGE),
            delete: Some(catalog::CITIES_MANAGE),
        },
    )
}

pub struct TariffStore {
    resources: ResourceStore<Tariff, TariffClient>,
    cities_api: CityClient,
    cities: RwLock<Vec<City>>,
    missing: RwLock<Vec<MissingTariff>>,
    coverage: RwLock<Option<CoverageStats>>,
    last_import: RwLock<Option<ImportReport>>,
}

impl TariffStore {
    pub fn new(api: Arc<TariffClient>, cities_api: CityClient, session: Arc<SessionStore>) -> Self {
        let permissions = ResourcePermissions {
            read: Some(catalog::TARIFFS_READ),
            create: Some(catalog::TARIFFS_CREATE),
            update: Some(catalog::TARIFFS_UPDATE),
            delete: Some(catalog::TARIFFS_DELETE),
        };
        Self {
            resources: ResourceStore::new("Tarif", api, session, permissions),
            cities_api,
            cities: RwLock::new(Vec::new()),
            missing: RwLock::new(Vec::new()),
            coverage: RwLock::new(None),
            last_import: RwLock::new(None),
        }
    }

    /// List, selection and single-record actions.
    pub fn resources(&self) -> &ResourceStore<Tariff, TariffClient> {
        &self.resources
    }

    pub async fn load_cities(&self) -> StoreResult<Vec<City>> {
        let ctx = self.resources.context_for(Some(&catalog::CITIES_READ)).await?;
        match self.cities_api.list(&ctx).await.into_result() {
            Ok(cities) => {
                *self.cities.write().await = cities.clone();
                Ok(cities)
            }
            Err(e) => Err(self.resources.record_failure("load_cities", e).await),
        }
    }

    pub async fn cities(&self) -> Vec<City> {
        self.cities.read().await.clone()
    }

    pub async fn city_directory(&self) -> CityDirectory {
        CityDirectory::from_cities(self.cities.read().await.iter())
    }

    pub async fn create(&self, payload: &CreateTariffPayload) -> StoreResult<Tariff> {
        validate_form(payload).map_err(StoreError::Form)?;
        if payload.pickup_city_id == payload.destination_city_id {
            let mut errors = FormErrors::default();
            errors.add(
                "destinationCityId",
                "la destination doit différer de la ville de ramassage",
            );
            return Err(StoreError::Form(errors));
        }
        self.resources.create(payload).await
    }

    pub async fn update(
        &self,
        id: &TariffId,
        payload: &UpdateTariffPayload,
    ) -> StoreResult<Tariff> {
        validate_form(payload).map_err(StoreError::Form)?;
        self.resources.update(id, payload).await
    }

    /// Delete through the batch endpoint; ids the service reports as failed
    /// stay cached.
    pub async fn bulk_delete(&self, ids: &[TariffId]) -> StoreResult<BulkOutcome<TariffId>> {
        let delete = self.resources.permissions().delete.clone();
        let ctx = self.resources.context_for(delete.as_ref()).await?;
        let result = match self.resources.api().bulk_delete(&ctx, ids).await.into_result() {
            Ok(result) => result,
            Err(e) => return Err(self.resources.record_failure("bulk_delete", e).await),
        };

        let mut outcome = BulkOutcome {
            total: ids.len(),
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for id in ids {
            if result.failed_ids.contains(id) {
                outcome.failed.push((
                    id.clone(),
                    ApiError::new(
                        codes::SERVER_ERROR,
                        format!("Le tarif {id} n'a pas pu être supprimé"),
                    ),
                ));
            } else {
                self.resources.apply_confirmed_removal(id).await;
                outcome.succeeded.push(id.clone());
            }
        }
        self.resources.report_bulk("bulk_delete", "supprimés", &outcome).await;
        Ok(outcome)
    }

    /// Validate `contents` against the cached cities and send the valid rows.
    ///
    /// Nothing is sent when no row passes local checks. The returned report
    /// carries local and server findings.
    pub async fn import_csv(&self, contents: &str) -> StoreResult<ImportReport> {
        let ctx = self.resources.context_for(Some(&catalog::TARIFFS_IMPORT)).await?;
        if self.cities.read().await.is_empty() {
            self.load_cities().await?;
        }
        let directory = self.city_directory().await;

        let mut report = match parse_import(contents.as_bytes(), &directory) {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "tariff import refused");
                self.resources.notifier().error(&format!("Import impossible : {e}"));
                return Err(e.into());
            }
        };

        if report.rows.is_empty() {
            self.resources.notifier().warning(&format!(
                "Aucune ligne valide à importer ({} erreur(s))",
                report.errors.len()
            ));
            *self.last_import.write().await = Some(report.clone());
            return Ok(report);
        }

        let server = match self
            .resources
            .api()
            .import_rows(&ctx, &report.rows)
            .await
            .into_result()
        {
            Ok(server) => server,
            Err(e) => return Err(self.resources.record_failure("import", e).await),
        };
        report.merge_server_report(&server);
        info!(
            imported = server.imported,
            skipped = server.skipped,
            errors = report.errors.len(),
            "tariff import finished"
        );

        let message = format!(
            "{} tarif(s) importé(s), {} ignoré(s)",
            server.imported, server.skipped
        );
        if report.has_errors() {
            self.resources
                .notifier()
                .warning(&format!("{message}, {} erreur(s)", report.errors.len()));
        } else {
            self.resources.notifier().success(&message);
        }
        *self.last_import.write().await = Some(report.clone());
        Ok(report)
    }

    pub async fn last_import(&self) -> Option<ImportReport> {
        self.last_import.read().await.clone()
    }

    pub fn template_csv(&self) -> String {
        template_csv()
    }

    /// Cached tariffs in the import format.
    pub async fn export_csv(&self) -> StoreResult<String> {
        let items = self.resources.items().await;
        Ok(export_csv(items.iter())?)
    }

    pub async fn fetch_missing(&self) -> StoreResult<Vec<MissingTariff>> {
        let ctx = self.resources.context_for(Some(&catalog::TARIFFS_READ)).await?;
        match self.resources.api().missing(&ctx).await.into_result() {
            Ok(missing) => {
                *self.missing.write().await = missing.clone();
                Ok(missing)
            }
            Err(e) => Err(self.resources.record_failure("missing", e).await),
        }
    }

    pub async fn missing(&self, filter: &MissingTariffFilter) -> Vec<MissingTariff> {
        let missing = self.missing.read().await;
        filter.apply(&missing).into_iter().cloned().collect()
    }

    pub async fn fetch_coverage(&self) -> StoreResult<CoverageStats> {
        let ctx = self.resources.context_for(Some(&catalog::TARIFFS_READ)).await?;
        match self.resources.api().coverage(&ctx).await.into_result() {
            Ok(stats) => {
                *self.coverage.write().await = Some(stats.clone());
                Ok(stats)
            }
            Err(e) => Err(self.resources.record_failure("coverage", e).await),
        }
    }

    pub async fn coverage(&self) -> Option<CoverageStats> {
        self.coverage.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{RecordingNotifier, ToastLevel};
    use crate::testing::{page_meta, session_store};
    use serde_json::json;
    use shipdesk_client::HttpClient;
    use shipdesk_core::PageRequest;
    use shipdesk_tariffs::{RowErrorKind, TariffFilters};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn store(server: &MockServer, perms: &[&str]) -> (TariffStore, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let session = session_store(&server.uri(), perms, notifier.clone()).await;
        let http = HttpClient::new(server.uri());
        let store = TariffStore::new(
            Arc::new(TariffClient::new(http.clone())),
            CityClient::new(http),
            session,
        );
        (store, notifier)
    }

    async fn mount_cities(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/cities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "c-rab", "reference": "RAB", "name": "Rabat" },
                { "id": "c-tng", "reference": "TNG", "name": "Tanger" },
                { "id": "c-fes", "reference": "FES", "name": "Fès" }
            ])))
            .mount(server)
            .await;
    }

    fn tariff(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "pickupCityId": "c-rab", "pickupCityRef": "RAB",
            "destinationCityId": "c-tng", "destinationCityRef": "TNG",
            "deliveryPrice": "25.00", "returnPrice": 20, "refusalPrice": 15,
            "deliveryDelay": 2
        })
    }

    #[tokio::test]
    async fn unknown_pickup_reference_is_a_row_error_and_nothing_is_sent() {
        let server = MockServer::start().await;
        mount_cities(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/tariffs/import"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (store, notifier) = store(&server, &["*"]).await;

        let csv = "pickupCityRef,destinationCityRef,deliveryPrice,returnPrice,refusalPrice,deliveryDelay\n\
                   CAS,RAB,25.00,20.00,15.00,2\n";
        let report = store.import_csv(csv).await.unwrap();

        assert!(report.rows.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line, 2);
        assert_eq!(
            report.errors[0].kind,
            RowErrorKind::UnknownPickupCity { reference: "CAS".into() }
        );
        assert_eq!(notifier.of_level(ToastLevel::Warning).len(), 1);
    }

    #[tokio::test]
    async fn valid_rows_are_sent_and_server_report_is_merged() {
        let server = MockServer::start().await;
        mount_cities(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/tariffs/import"))
            .and(body_partial_json(json!({ "rows": [{ "pickupCityRef": "RAB", "destinationCityRef": "TNG" }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "imported": 1,
                "skipped": 0,
                "warnings": [{ "line": 2, "message": "route already configured" }]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let (store, notifier) = store(&server, &["*"]).await;

        let csv = "pickupCityRef,destinationCityRef,deliveryPrice,returnPrice,refusalPrice,deliveryDelay\n\
                   RAB,TNG,25.00,20.00,15.00,2\n\
                   RAB,XXX,25.00,20.00,15.00,2\n";
        let report = store.import_csv(csv).await.unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.error_lines(), vec![3]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            notifier.of_level(ToastLevel::Warning)[0].message,
            "1 tarif(s) importé(s), 0 ignoré(s), 1 erreur(s)"
        );
        assert!(store.last_import().await.is_some());
    }

    #[tokio::test]
    async fn import_requires_its_permission() {
        let server = MockServer::start().await;
        let (store, _) = store(&server, &["tariffs.read"]).await;

        let err = store.import_csv("whatever").await.unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_delete_keeps_failed_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tariffs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [tariff("a"), tariff("b"), tariff("c")],
                "meta": page_meta(3),
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/tariffs/bulk-delete"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": 1, "failedIds": ["b"] })))
            .expect(1)
            .mount(&server)
            .await;
        let (store, notifier) = store(&server, &["*"]).await;
        store
            .resources()
            .fetch(&TariffFilters::default(), PageRequest::default())
            .await
            .unwrap();

        let outcome = store
            .bulk_delete(&[TariffId::new("a"), TariffId::new("b")])
            .await
            .unwrap();

        assert_eq!(outcome.succeeded, vec![TariffId::new("a")]);
        assert_eq!(outcome.failed[0].0, TariffId::new("b"));
        let ids: Vec<_> = store.resources().items().await.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TariffId::new("b"), TariffId::new("c")]);
        assert_eq!(notifier.of_level(ToastLevel::Warning)[0].message, "1 sur 2 supprimés");
    }

    #[tokio::test]
    async fn invalid_form_is_refused_before_sending() {
        let server = MockServer::start().await;
        let (store, _) = store(&server, &["*"]).await;
        let payload: CreateTariffPayload = serde_json::from_value(json!({
            "pickupCityId": "c-rab", "destinationCityId": "c-tng",
            "deliveryPrice": -1, "returnPrice": 20, "refusalPrice": 15, "deliveryDelay": 2
        }))
        .unwrap();

        let err = store.create(&payload).await.unwrap_err();
        assert!(err.form().unwrap().field("delivery_price").is_some());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_routes_are_filtered_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tariffs/missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "pickupCityId": "c-rab", "pickupCityRef": "RAB", "pickupCityName": "Rabat",
                  "destinationCityId": "c-tng", "destinationCityRef": "TNG", "destinationCityName": "Tanger" },
                { "pickupCityId": "c-fes", "pickupCityRef": "FES", "pickupCityName": "Fès",
                  "destinationCityId": "c-tng", "destinationCityRef": "TNG", "destinationCityName": "Tanger" }
            ])))
            .mount(&server)
            .await;
        let (store, _) = store(&server, &["tariffs.read"]).await;

        assert_eq!(store.fetch_missing().await.unwrap().len(), 2);
        let filter = MissingTariffFilter {
            pickup_city_ref: Some("FES".into()),
            ..Default::default()
        };
        let filtered = store.missing(&filter).await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].pickup_city_ref, "FES");
    }

    #[tokio::test]
    async fn export_uses_cached_tariffs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tariffs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [tariff("a")],
                "meta": page_meta(1),
            })))
            .mount(&server)
            .await;
        let (store, _) = store(&server, &["*"]).await;
        store
            .resources()
            .fetch(&TariffFilters::default(), PageRequest::default())
            .await
            .unwrap();

        let csv = store.export_csv().await.unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(store.template_csv().lines().next().unwrap()));
        assert_eq!(lines.next(), Some("RAB,TNG,25.00,20.00,15.00,2"));
    }
}
