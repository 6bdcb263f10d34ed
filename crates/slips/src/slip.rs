use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shipdesk_core::{DomainError, Money, ParcelId, Resource, SlipId};

/// Which slip family a record belongs to. Both share one shape and differ only
/// by endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlipKind {
    Delivery,
    Shipping,
}

impl SlipKind {
    /// Collection segment under `/api`.
    pub fn path_segment(self) -> &'static str {
        match self {
            SlipKind::Delivery => "delivery-slips",
            SlipKind::Shipping => "shipping-slips",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SlipKind::Delivery => "Bon de livraison",
            SlipKind::Shipping => "Bon d'expédition",
        }
    }
}

impl core::str::FromStr for SlipKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delivery" | "livraison" => Ok(SlipKind::Delivery),
            "shipping" | "expedition" => Ok(SlipKind::Shipping),
            other => Err(DomainError::validation(format!("unknown slip kind: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlipStatus {
    Pending,
    Shipped,
    Received,
    Cancelled,
}

impl SlipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SlipStatus::Pending => "PENDING",
            SlipStatus::Shipped => "SHIPPED",
            SlipStatus::Received => "RECEIVED",
            SlipStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parcels can only be added or removed while the slip is still open.
    pub fn is_open(self) -> bool {
        matches!(self, SlipStatus::Pending)
    }

    pub fn can_transition_to(self, to: SlipStatus) -> bool {
        use SlipStatus::*;
        matches!(
            (self, to),
            (Pending, Shipped) | (Shipped, Received) | (Pending, Cancelled) | (Shipped, Cancelled)
        )
    }
}

impl core::fmt::Display for SlipStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipItem {
    pub parcel_id: ParcelId,
    /// Code printed on the parcel label; what the scanner reads.
    pub parcel_reference: String,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub value: Money,
    #[serde(default)]
    pub scanned: bool,
    #[serde(default)]
    pub scanned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipSummary {
    pub total_parcels: u32,
    pub scanned_parcels: u32,
    #[serde(default)]
    pub total_value: Money,
}

impl SlipSummary {
    pub fn from_items(items: &[SlipItem]) -> Self {
        Self {
            total_parcels: items.len() as u32,
            scanned_parcels: items.iter().filter(|i| i.scanned).count() as u32,
            total_value: items.iter().map(|i| i.value).sum(),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.total_parcels.saturating_sub(self.scanned_parcels)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slip {
    pub id: SlipId,
    pub reference: String,
    pub status: SlipStatus,
    #[serde(default)]
    pub destination_zone: Option<String>,
    #[serde(default)]
    pub items: Vec<SlipItem>,
    /// Server summary; recomputed from items when the payload omits it.
    #[serde(default)]
    pub summary: Option<SlipSummary>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Slip {
    pub fn summary(&self) -> SlipSummary {
        self.summary
            .unwrap_or_else(|| SlipSummary::from_items(&self.items))
    }

    pub fn scanned_codes(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(|i| i.scanned)
            .map(|i| i.parcel_reference.as_str())
    }

    pub fn item_by_code(&self, code: &str) -> Option<&SlipItem> {
        self.items.iter().find(|i| i.parcel_reference == code)
    }
}

impl Resource for Slip {
    type Id = SlipId;

    fn id(&self) -> &SlipId {
        &self.id
    }

    fn label(&self) -> String {
        self.reference.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddParcelPayload {
    pub parcel_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlipStatusPayload {
    pub status: SlipStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SlipStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}
