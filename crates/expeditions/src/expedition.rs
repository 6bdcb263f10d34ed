use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shipdesk_core::{
    DomainError, DomainResult, ExpeditionId, ExpeditionItemId, ProductId, Resource, SellerId,
    WarehouseId,
};

/// Expedition workflow:
///
/// ```text
/// expedited → prepared → pointed → received
///     └──────────┴──────────┴──→ cancelled
/// ```
///
/// `received` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpeditionStatus {
    Expedited,
    Prepared,
    Pointed,
    Received,
    Cancelled,
}

impl ExpeditionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpeditionStatus::Expedited => "expedited",
            ExpeditionStatus::Prepared => "prepared",
            ExpeditionStatus::Pointed => "pointed",
            ExpeditionStatus::Received => "received",
            ExpeditionStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExpeditionStatus::Received | ExpeditionStatus::Cancelled)
    }

    /// Next step on the linear path, if any.
    pub fn next(self) -> Option<ExpeditionStatus> {
        match self {
            ExpeditionStatus::Expedited => Some(ExpeditionStatus::Prepared),
            ExpeditionStatus::Prepared => Some(ExpeditionStatus::Pointed),
            ExpeditionStatus::Pointed => Some(ExpeditionStatus::Received),
            ExpeditionStatus::Received | ExpeditionStatus::Cancelled => None,
        }
    }

    /// Moves the status menu offers. The expedition service decides for real.
    pub fn can_transition_to(self, to: ExpeditionStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == ExpeditionStatus::Cancelled || self.next() == Some(to)
    }

    /// Whether the receive form may be opened.
    pub fn allows_receiving(self) -> bool {
        !self.is_terminal()
    }

    pub fn label(self) -> &'static str {
        match self {
            ExpeditionStatus::Expedited => "Expédiée",
            ExpeditionStatus::Prepared => "Préparée",
            ExpeditionStatus::Pointed => "Pointée",
            ExpeditionStatus::Received => "Reçue",
            ExpeditionStatus::Cancelled => "Annulée",
        }
    }
}

impl core::fmt::Display for ExpeditionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Road,
    Air,
    Sea,
    Courier,
    #[serde(other)]
    Other,
}

/// One product line of an expedition. Quantities use the service's
/// snake_case field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpeditionItem {
    pub id: ExpeditionItemId,
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    #[serde(rename = "productName", default)]
    pub product_name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub quantity_sent: u32,
    #[serde(default)]
    pub quantity_received: Option<u32>,
    #[serde(default)]
    pub quantity_defective: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expedition {
    pub id: ExpeditionId,
    pub reference: String,
    pub seller_id: SellerId,
    #[serde(default)]
    pub seller_name: Option<String>,
    pub warehouse_id: WarehouseId,
    #[serde(default)]
    pub warehouse_name: Option<String>,
    pub status: ExpeditionStatus,
    #[serde(default)]
    pub transport_mode: Option<TransportMode>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub items: Vec<ExpeditionItem>,
    #[serde(default)]
    pub expected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Expedition {
    pub fn total_sent(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity_sent)).sum()
    }

    pub fn item(&self, id: &ExpeditionItemId) -> Option<&ExpeditionItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Refuse locally when the expedition can no longer be received.
    pub fn ensure_receivable(&self) -> DomainResult<()> {
        if self.status.allows_receiving() {
            Ok(())
        } else {
            Err(DomainError::transition(self.status, ExpeditionStatus::Received))
        }
    }
}

impl Resource for Expedition {
    type Id = ExpeditionId;

    fn id(&self) -> &ExpeditionId {
        &self.id
    }

    fn label(&self) -> String {
        self.reference.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    pub status: ExpeditionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Query filters of the expeditions list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpeditionFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExpeditionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<WarehouseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<SellerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ExpeditionStatus; 5] = [
        ExpeditionStatus::Expedited,
        ExpeditionStatus::Prepared,
        ExpeditionStatus::Pointed,
        ExpeditionStatus::Received,
        ExpeditionStatus::Cancelled,
    ];

    #[test]
    fn linear_path_and_cancel_from_non_terminal() {
        use ExpeditionStatus::*;
        assert!(Expedited.can_transition_to(Prepared));
        assert!(Prepared.can_transition_to(Pointed));
        assert!(Pointed.can_transition_to(Received));
        assert!(!Expedited.can_transition_to(Received));
        assert!(!Pointed.can_transition_to(Prepared));
        for s in [Expedited, Prepared, Pointed] {
            assert!(s.can_transition_to(Cancelled));
        }
    }

    #[test]
    fn terminal_statuses_go_nowhere() {
        for from in [ExpeditionStatus::Received, ExpeditionStatus::Cancelled] {
            for to in ALL {
                assert!(!from.can_transition_to(to));
            }
            assert!(!from.allows_receiving());
        }
    }

    #[test]
    fn wire_shape_mixes_camel_and_snake_case() {
        let exp: Expedition = serde_json::from_value(serde_json::json!({
            "id": "exp-1",
            "reference": "EXP-0001",
            "sellerId": "s-1",
            "warehouseId": "w-1",
            "status": "pointed",
            "transportMode": "drone",
            "items": [{
                "id": "a",
                "productId": "p-1",
                "productName": "Mug",
                "quantity_sent": 10
            }]
        }))
        .unwrap();

        assert_eq!(exp.status, ExpeditionStatus::Pointed);
        assert_eq!(exp.transport_mode, Some(TransportMode::Other));
        assert_eq!(exp.items[0].quantity_sent, 10);
        assert_eq!(exp.items[0].quantity_received, None);
        assert_eq!(exp.total_sent(), 10);
        assert!(exp.ensure_receivable().is_ok());
    }

    #[test]
    fn received_expedition_is_not_receivable() {
        let exp: Expedition = serde_json::from_value(serde_json::json!({
            "id": "exp-1",
            "reference": "EXP-0001",
            "sellerId": "s-1",
            "warehouseId": "w-1",
            "status": "received"
        }))
        .unwrap();
        assert_eq!(
            exp.ensure_receivable(),
            Err(DomainError::transition("received", "received"))
        );
    }
}
