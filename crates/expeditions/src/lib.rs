//! Expeditions: inbound shipments from sellers to a warehouse.
//!
//! The expedition service owns the workflow and the reconciliation. This crate
//! models the records, exposes the workflow for display and guards, and builds
//! the receive payload.

pub mod expedition;
pub mod receive;

pub use expedition::{
    Expedition, ExpeditionFilters, ExpeditionItem, ExpeditionStatus, TransportMode,
    UpdateStatusPayload,
};
pub use receive::{
    Discrepancy, ReceiveError, ReceiveExpeditionPayload, ReceiveExpeditionResponse, ReceiveItem,
    StockUpdate,
};
