//! `shipdesk-core`: shared building blocks for the back-office client.
//!
//! Everything here is pure (no IO): identifiers, money, pagination metadata and
//! the `Resource` contract the client-side stores are generic over.

pub mod error;
pub mod id;
pub mod money;
pub mod pagination;
pub mod resource;

pub use error::{DomainError, DomainResult};
pub use id::{
    CityId, ExpeditionId, ExpeditionItemId, InvoiceId, ParcelId, ProductId, SellerId, SlipId,
    StockItemId, TariffId, TenantId, UserId, WarehouseId,
};
pub use money::Money;
pub use pagination::{PageMeta, PageRequest};
pub use resource::Resource;
