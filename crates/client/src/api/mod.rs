//! One client per backend resource group.

mod auth;
mod expeditions;
mod invoices;
mod settings;
mod slips;
mod stock;
mod tariffs;
mod users;

pub use auth::{AuthClient, CurrentUser, LoginPayload, RefreshPayload, SetCookiesPayload};
pub use expeditions::{CancelExpeditionPayload, ExpeditionClient};
pub use invoices::InvoiceClient;
pub use settings::{
    GeneralSettings, SettingsClient, SmsProvider, SmsSettings, SmsSettingsClient, TestSmsPayload,
};
pub use slips::SlipClient;
pub use stock::StockClient;
pub use tariffs::{BulkDeleteResult, CityClient, PickupCityClient, TariffClient};
pub use users::{UserClient, ValidateAccountPayload};
