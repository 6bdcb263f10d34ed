//! `shipdesk-stores`: client-side state of the back office.
//!
//! Each store wraps one API client, keeps the last confirmed server state
//! behind a `tokio::sync::RwLock` and reports outcomes through a [`Notifier`].
//! Caches change only after the service confirms an action.

pub mod error;
pub mod expeditions;
pub mod forms;
pub mod invoices;
pub mod notifier;
pub mod resource;
pub mod session;
pub mod settings;
pub mod slips;
pub mod stock;
pub mod tariffs;
pub mod users;

#[cfg(test)]
mod testing;

pub use error::{StoreError, StoreResult};
pub use expeditions::ExpeditionStore;
pub use forms::{validate_form, FormErrors};
pub use invoices::InvoiceStore;
pub use notifier::{Notifier, RecordingNotifier, Toast, ToastLevel, TracingNotifier};
pub use resource::{BulkOutcome, FetchOutcome, ResourcePermissions, ResourceState, ResourceStore};
pub use session::{
    MemorySessionPersistence, PersistenceError, SessionPersistence, SessionStore,
    SqliteSessionPersistence,
};
pub use settings::SettingsStore;
pub use slips::SlipStore;
pub use stock::StockStore;
pub use tariffs::{pickup_city_store, PickupCityStore, TariffStore};
pub use users::UserStore;
