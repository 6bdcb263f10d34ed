//! Client configuration using Figment for layered config merging.
//!
//! Merge order (later overrides earlier): compiled defaults, `shipdesk.toml`
//! in the working directory, then `SHIPDESK_*` environment variables.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shipdesk_observability::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("no data directory available for the session database; set SHIPDESK_SESSION_DB_PATH")]
    NoDataDir,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Figment(Box::new(e))
    }
}

/// Base URL of each backend service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
    pub auth_url: String,
    pub users_url: String,
    pub tariffs_url: String,
    pub expeditions_url: String,
    pub slips_url: String,
    pub invoices_url: String,
    pub stock_url: String,
    pub settings_url: String,
}

impl ServiceEndpoints {
    /// Every service behind one gateway.
    pub fn single(base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        Self {
            auth_url: base.clone(),
            users_url: base.clone(),
            tariffs_url: base.clone(),
            expeditions_url: base.clone(),
            slips_url: base.clone(),
            invoices_url: base.clone(),
            stock_url: base.clone(),
            settings_url: base,
        }
    }
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self::single("http://localhost:3000")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// SQLite file holding the persisted session. Defaults to the platform
    /// data directory.
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub services: ServiceEndpoints,
    pub session: SessionConfig,
    pub log: LogConfig,
}

impl ClientConfig {
    /// Load `./shipdesk.toml` (if present) with env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(build_figment(Path::new("shipdesk.toml")).extract()?)
    }

    /// Load a specific file with env overrides.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        Ok(build_figment(path).extract()?)
    }

    /// Parse TOML content only (no env lookup).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(Figment::new()
            .merge(Serialized::defaults(ClientConfig::default()))
            .merge(Toml::string(content))
            .extract()?)
    }

    pub fn session_db_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.session.db_path {
            Some(path) => Ok(path.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("shipdesk").join("session.db"))
                .ok_or(ConfigError::NoDataDir),
        }
    }
}

fn build_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ClientConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
}

/// `SHIPDESK_SERVICES_SETTINGS_URL` maps to `services.settings_url`. Only the
/// section prefix is split so underscores inside key names survive.
fn env_provider() -> Env {
    Env::prefixed("SHIPDESK_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    key.replacen("services_", "services.", 1)
        .replacen("session_", "session.", 1)
        .replacen("log_", "log.", 1)
}
