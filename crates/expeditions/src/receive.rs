//! Receive payload and server response.
//!
//! The expedition service reconciles quantities and mutates stock; the client
//! only validates the shape of what it submits and reports what comes back.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shipdesk_core::{ExpeditionItemId, ProductId, WarehouseId};

use crate::expedition::{Expedition, ExpeditionStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReceiveError {
    #[error("expedition is {0} and cannot be received")]
    NotReceivable(ExpeditionStatus),

    #[error("at least one item is required")]
    NoItems,

    #[error("item {0} does not belong to this expedition")]
    UnknownItem(ExpeditionItemId),

    #[error("item {0} appears more than once")]
    DuplicateItem(ExpeditionItemId),

    #[error("receivedBy is required")]
    MissingReceiver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveItem {
    #[serde(rename = "itemId")]
    pub item_id: ExpeditionItemId,
    pub quantity_received: u32,
    pub quantity_defective: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        rename = "photoUrls",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub photo_urls: Vec<String>,
}

impl ReceiveItem {
    pub fn new(item_id: impl Into<ExpeditionItemId>, received: u32, defective: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity_received: received,
            quantity_defective: defective,
            notes: None,
            photo_urls: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveExpeditionPayload {
    pub items: Vec<ReceiveItem>,
    pub received_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_notes: Option<String>,
}

impl ReceiveExpeditionPayload {
    pub fn new(received_by: impl Into<String>, items: Vec<ReceiveItem>) -> Self {
        Self {
            items,
            received_by: received_by.into(),
            received_at: None,
            general_notes: None,
        }
    }

    /// Shape checks against the cached expedition before anything is sent.
    pub fn validate_for(&self, expedition: &Expedition) -> Result<(), ReceiveError> {
        if !expedition.status.allows_receiving() {
            return Err(ReceiveError::NotReceivable(expedition.status));
        }
        if self.items.is_empty() {
            return Err(ReceiveError::NoItems);
        }
        if self.received_by.trim().is_empty() {
            return Err(ReceiveError::MissingReceiver);
        }
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if expedition.item(&item.item_id).is_none() {
                return Err(ReceiveError::UnknownItem(item.item_id.clone()));
            }
            if !seen.insert(&item.item_id) {
                return Err(ReceiveError::DuplicateItem(item.item_id.clone()));
            }
        }
        Ok(())
    }
}

/// A quantity mismatch reported by the expedition service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    pub item_id: ExpeditionItemId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub expected: i64,
    pub actual: i64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl Discrepancy {
    /// Warning text shown to the operator. Numbers are reported verbatim.
    pub fn describe(&self) -> String {
        let name = self
            .product_name
            .as_deref()
            .unwrap_or(self.item_id.as_str());
        format!(
            "Écart sur {name} : attendu {}, reçu {}",
            self.expected, self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub warehouse_id: Option<WarehouseId>,
    pub quantity_added: i64,
    #[serde(default)]
    pub new_quantity: Option<i64>,
}

impl StockUpdate {
    pub fn describe(&self) -> String {
        let name = self
            .product_name
            .as_deref()
            .unwrap_or(self.product_id.as_str());
        match self.new_quantity {
            Some(total) => format!("Stock {name} : +{} (total {total})", self.quantity_added),
            None => format!("Stock {name} : +{}", self.quantity_added),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveExpeditionResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    pub expedition: Expedition,
    #[serde(default)]
    pub stock_updates: Vec<StockUpdate>,
    #[serde(default)]
    pub discrepancies: Vec<Discrepancy>,
}

fn default_true() -> bool {
    true
}
