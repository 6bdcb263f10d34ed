//! Store wiring for the terminal front end.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;

use shipdesk_client::{
    AuthClient, CityClient, ClientConfig, ExpeditionClient, HttpClient, SlipClient, TariffClient,
};
use shipdesk_core::{ExpeditionId, SlipId, TenantId};
use shipdesk_expeditions::ReceiveExpeditionPayload;
use shipdesk_slips::{ScanOutcome, SlipKind};
use shipdesk_stores::{
    ExpeditionStore, SessionStore, SlipStore, SqliteSessionPersistence, TariffStore,
    TracingNotifier,
};
use shipdesk_tariffs::{ImportReport, MissingTariffFilter};

pub struct App {
    config: ClientConfig,
    session: Arc<SessionStore>,
}

impl App {
    /// Open the persisted session, if any.
    pub async fn start(config: ClientConfig) -> anyhow::Result<Self> {
        let db_path = config.session_db_path()?;
        let session = SessionStore::new(
            AuthClient::new(HttpClient::new(config.services.auth_url.clone())),
            Arc::new(SqliteSessionPersistence::new(db_path)),
            Arc::new(TracingNotifier),
        );
        let restored = session.restore().await?;
        info!(restored, "session store ready");
        Ok(Self {
            config,
            session: Arc::new(session),
        })
    }

    pub async fn login(&self, tenant: &str, email: &str, password: &str) -> anyhow::Result<()> {
        let tenant: TenantId = tenant.parse()?;
        let session = self.session.login(tenant, email, password).await?;
        println!(
            "{} ({}) connecté, session valide jusqu'à {}",
            session.user.email, session.tenant_id, session.expires_at
        );
        Ok(())
    }

    pub async fn logout(&self) -> anyhow::Result<()> {
        self.session.logout().await?;
        println!("Déconnecté");
        Ok(())
    }

    pub async fn whoami(&self) -> anyhow::Result<()> {
        match self.session.current().await {
            Some(session) => {
                println!("{} ({})", session.user.email, session.tenant_id);
                let mut permissions: Vec<_> = session.permissions.iter().collect();
                permissions.sort();
                for permission in permissions {
                    println!("  {permission}");
                }
            }
            None => println!("Non connecté"),
        }
        Ok(())
    }

    fn tariffs(&self) -> TariffStore {
        let http = HttpClient::new(self.config.services.tariffs_url.clone());
        TariffStore::new(
            Arc::new(TariffClient::new(http.clone())),
            CityClient::new(http),
            self.session.clone(),
        )
    }

    pub async fn import_tariffs(&self, file: &Path) -> anyhow::Result<()> {
        let contents = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("reading {}", file.display()))?;
        let report = self.tariffs().import_csv(&contents).await?;
        for line in report_lines(&report) {
            println!("{line}");
        }
        Ok(())
    }

    pub async fn missing_tariffs(&self, filter: &MissingTariffFilter) -> anyhow::Result<()> {
        let store = self.tariffs();
        store.fetch_missing().await?;
        let missing = store.missing(filter).await;
        for m in &missing {
            println!(
                "{} -> {} {}",
                m.pickup_city_ref,
                m.destination_city_ref,
                m.destination_zone.as_deref().unwrap_or("")
            );
        }
        println!("{} liaison(s) sans tarif", missing.len());
        Ok(())
    }

    pub fn tariff_template(&self) -> String {
        self.tariffs().template_csv()
    }

    pub async fn receive_expedition(&self, id: &str, payload_file: &Path) -> anyhow::Result<()> {
        let raw = tokio::fs::read_to_string(payload_file)
            .await
            .with_context(|| format!("reading {}", payload_file.display()))?;
        let payload: ReceiveExpeditionPayload =
            serde_json::from_str(&raw).context("invalid receive payload")?;

        let http = HttpClient::new(self.config.services.expeditions_url.clone());
        let store =
            ExpeditionStore::new(Arc::new(ExpeditionClient::new(http)), self.session.clone());
        let id: ExpeditionId = id.parse()?;
        store.open_for_receiving(&id).await?;
        let response = store.receive(&id, &payload).await?;
        println!(
            "{} : {} ({} écart(s))",
            response.expedition.reference,
            response.expedition.status.label(),
            response.discrepancies.len()
        );
        Ok(())
    }

    pub async fn scan_parcels(
        &self,
        kind: SlipKind,
        id: &str,
        codes: &[String],
    ) -> anyhow::Result<()> {
        let http = HttpClient::new(self.config.services.slips_url.clone());
        let store = SlipStore::new(
            Arc::new(SlipClient::new(http, kind)),
            self.session.clone(),
        );
        let id: SlipId = id.parse()?;
        let slip = store.open(&id).await?;
        if !slip.status.is_open() {
            bail!("{} {} n'accepte plus de colis", kind.label(), slip.reference);
        }

        let mut added = 0usize;
        for code in codes {
            if let ScanOutcome::Accepted(_) = store.scan(&id, code).await? {
                added += 1;
            }
        }
        println!(
            "{added} colis ajouté(s), {} au total",
            store.scanned_codes(&id).await.len()
        );
        Ok(())
    }
}

/// One line per row error, then per warning. Both already carry their line number.
fn report_lines(report: &ImportReport) -> Vec<String> {
    report
        .errors
        .iter()
        .map(ToString::to_string)
        .chain(report.warnings.iter().map(ToString::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdesk_tariffs::{RowError, RowErrorKind, RowWarning};

    #[test]
    fn report_lines_name_each_line_once() {
        let report = ImportReport {
            errors: vec![RowError {
                line: 2,
                kind: RowErrorKind::UnknownPickupCity {
                    reference: "CAS".into(),
                },
            }],
            warnings: vec![RowWarning {
                line: 3,
                message: "duplicate pair CAS -> RAB skipped".into(),
            }],
            ..Default::default()
        };

        assert_eq!(
            report_lines(&report),
            vec![
                "line 2: unknown pickup city reference 'CAS'".to_string(),
                "line 3: duplicate pair CAS -> RAB skipped".to_string(),
            ]
        );
    }
}
