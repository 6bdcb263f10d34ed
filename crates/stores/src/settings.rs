//! Tenant settings: SMS provider and general settings.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use shipdesk_auth::permissions::catalog;
use shipdesk_client::{
    ApiError, GeneralSettings, SettingsClient, SmsSettings, SmsSettingsClient, TestSmsPayload,
};

use crate::error::{StoreError, StoreResult};
use crate::forms::FormErrors;
use crate::session::SessionStore;

pub struct SettingsStore {
    sms_api: SmsSettingsClient,
    general_api: SettingsClient,
    session: Arc<SessionStore>,
    sms: RwLock<Option<SmsSettings>>,
    general: RwLock<Option<GeneralSettings>>,
    error: RwLock<Option<String>>,
}

impl SettingsStore {
    pub fn new(
        sms_api: SmsSettingsClient,
        general_api: SettingsClient,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            sms_api,
            general_api,
            session,
            sms: RwLock::new(None),
            general: RwLock::new(None),
            error: RwLock::new(None),
        }
    }

    pub async fn sms(&self) -> Option<SmsSettings> {
        self.sms.read().await.clone()
    }

    pub async fn general(&self) -> Option<GeneralSettings> {
        self.general.read().await.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.error.read().await.clone()
    }

    async fn failed(&self, action: &str, error: ApiError) -> StoreError {
        warn!(action, code = %error.code, "{}", error.message);
        *self.error.write().await = Some(error.message.clone());
        self.session.notifier().error(&error.message);
        StoreError::Api(error)
    }

    pub async fn load_sms(&self) -> StoreResult<SmsSettings> {
        let ctx = self
            .session
            .authorize_action("load_sms", Some(&catalog::SETTINGS_READ))
            .await?;
        match self.sms_api.get(&ctx).await.into_result() {
            Ok(settings) => {
                *self.sms.write().await = Some(settings.clone());
                *self.error.write().await = None;
                Ok(settings)
            }
            Err(e) => Err(self.failed("load_sms", e).await),
        }
    }

    pub async fn save_sms(&self, settings: &SmsSettings) -> StoreResult<SmsSettings> {
        let ctx = self
            .session
            .authorize_action("save_sms", Some(&catalog::SETTINGS_UPDATE))
            .await?;
        if settings.enabled && settings.sender_id.trim().is_empty() {
            let mut errors = FormErrors::default();
            errors.add("senderId", "l'expéditeur est requis quand les SMS sont activés");
            return Err(StoreError::Form(errors));
        }
        match self.sms_api.update(&ctx, settings).await.into_result() {
            Ok(saved) => {
                info!(provider = ?saved.provider, enabled = saved.enabled, "sms settings saved");
                *self.sms.write().await = Some(saved.clone());
                *self.error.write().await = None;
                self.session.notifier().success("Paramètres SMS enregistrés");
                Ok(saved)
            }
            Err(e) => Err(self.failed("save_sms", e).await),
        }
    }

    pub async fn send_test_sms(&self, phone: &str, message: &str) -> StoreResult<()> {
        let ctx = self
            .session
            .authorize_action("send_test_sms", Some(&catalog::SETTINGS_UPDATE))
            .await?;
        if phone.trim().is_empty() {
            let mut errors = FormErrors::default();
            errors.add("phone", "numéro requis");
            return Err(StoreError::Form(errors));
        }
        let payload = TestSmsPayload {
            phone: phone.trim().to_string(),
            message: message.to_string(),
        };
        match self.sms_api.send_test(&ctx, &payload).await.into_unit_result() {
            Ok(()) => {
                self.session
                    .notifier()
                    .success(&format!("SMS de test envoyé au {}", payload.phone));
                Ok(())
            }
            Err(e) => Err(self.failed("send_test_sms", e).await),
        }
    }

    pub async fn load_general(&self) -> StoreResult<GeneralSettings> {
        let ctx = self
            .session
            .authorize_action("load_general", Some(&catalog::SETTINGS_READ))
            .await?;
        match self.general_api.get(&ctx).await.into_result() {
            Ok(settings) => {
                *self.general.write().await = Some(settings.clone());
                *self.error.write().await = None;
                Ok(settings)
            }
            Err(e) => Err(self.failed("load_general", e).await),
        }
    }

    pub async fn save_general(&self, settings: &GeneralSettings) -> StoreResult<GeneralSettings> {
        let ctx = self
            .session
            .authorize_action("save_general", Some(&catalog::SETTINGS_UPDATE))
            .await?;
        match self.general_api.update(&ctx, settings).await.into_result() {
            Ok(saved) => {
                info!("general settings saved");
                *self.general.write().await = Some(saved.clone());
                *self.error.write().await = None;
                self.session.notifier().success("Paramètres enregistrés");
                Ok(saved)
            }
            Err(e) => Err(self.failed("save_general", e).await),
        }
    }
}
