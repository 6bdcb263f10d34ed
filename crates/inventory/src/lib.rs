//! Warehouse stock as reported by the stock service.
//!
//! Stock is mutated server-side (receiving, shipping, returns). This crate
//! mirrors the records and filters them for display.

pub mod stock;

pub use stock::{StockFilter, StockItem, WarehouseOverview};
