//! `shipdesk-client`: typed HTTP access to the back-office services.
//!
//! Every call takes an explicit [`RequestContext`] and returns an
//! [`ApiResponse`]; transport and server failures are folded into the envelope
//! instead of surfacing as Rust errors, so callers branch on one shape.

pub mod api;
pub mod config;
pub mod context;
pub mod crud;
pub mod envelope;
pub mod http;

pub use api::{
    AuthClient, BulkDeleteResult, CancelExpeditionPayload, CityClient, CurrentUser,
    ExpeditionClient, GeneralSettings, InvoiceClient, LoginPayload, PickupCityClient,
    RefreshPayload, SetCookiesPayload, SettingsClient, SlipClient, SmsProvider, SmsSettings,
    SmsSettingsClient, StockClient, TariffClient, TestSmsPayload, UserClient,
    ValidateAccountPayload,
};
pub use config::{ClientConfig, ConfigError, LogConfig, ServiceEndpoints, SessionConfig};
pub use context::RequestContext;
pub use crud::{CrudApi, ListApi};
pub use envelope::{codes, ApiError, ApiResponse, PaginatedResponse};
pub use http::HttpClient;
