use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RequestContext;
use crate::envelope::ApiResponse;
use crate::http::HttpClient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    #[default]
    Twilio,
    Infobip,
    Vonage,
    #[serde(other)]
    Custom,
}

/// SMS notification settings of the tenant.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmsSettings {
    pub enabled: bool,
    pub provider: SmsProvider,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Message templates keyed by event (`delivered`, `returned`, ...).
    pub templates: BTreeMap<String, String>,
}

impl core::fmt::Debug for SmsSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmsSettings")
            .field("enabled", &self.enabled)
            .field("provider", &self.provider)
            .field("sender_id", &self.sender_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("templates", &self.templates)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSmsPayload {
    pub phone: String,
    pub message: String,
}

/// Tenant-wide settings. Keys this client does not model are kept in `extra`
/// so a save does not drop them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub company_name: String,
    pub currency: String,
    pub timezone: String,
    pub default_delivery_delay: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_phone: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct SmsSettingsClient {
    http: HttpClient,
}

impl SmsSettingsClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn get(&self, ctx: &RequestContext) -> ApiResponse<SmsSettings> {
        self.http.get(ctx, "/api/settings/sms").await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        settings: &SmsSettings,
    ) -> ApiResponse<SmsSettings> {
        self.http.put(ctx, "/api/settings/sms", settings).await
    }

    pub async fn send_test(
        &self,
        ctx: &RequestContext,
        payload: &TestSmsPayload,
    ) -> ApiResponse<()> {
        self.http.post(ctx, "/api/settings/sms/test", payload).await
    }
}

#[derive(Debug, Clone)]
pub struct SettingsClient {
    http: HttpClient,
}

impl SettingsClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn get(&self, ctx: &RequestContext) -> ApiResponse<GeneralSettings> {
        self.http.get(ctx, "/api/settings/general").await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        settings: &GeneralSettings,
    ) -> ApiResponse<GeneralSettings> {
        self.http.put(ctx, "/api/settings/general", settings).await
    }
}
