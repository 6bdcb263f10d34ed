use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use shipdesk_core::{CityId, Money, Resource, TariffId};

/// Pricing rule for one pickup city → destination city route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tariff {
    pub id: TariffId,
    pub pickup_city_id: CityId,
    pub pickup_city_ref: String,
    #[serde(default)]
    pub pickup_city_name: Option<String>,
    pub destination_city_id: CityId,
    pub destination_city_ref: String,
    #[serde(default)]
    pub destination_city_name: Option<String>,
    pub delivery_price: Money,
    pub return_price: Money,
    pub refusal_price: Money,
    /// Delivery delay in days.
    pub delivery_delay: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Tariff {
    pub fn route_key(&self) -> (&str, &str) {
        (&self.pickup_city_ref, &self.destination_city_ref)
    }
}

impl Resource for Tariff {
    type Id = TariffId;

    fn id(&self) -> &TariffId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} → {}", self.pickup_city_ref, self.destination_city_ref)
    }
}

fn non_negative(value: &Money) -> Result<(), ValidationError> {
    if value.is_negative() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("price cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTariffPayload {
    pub pickup_city_id: CityId,
    pub destination_city_id: CityId,
    #[validate(custom(function = "non_negative"))]
    pub delivery_price: Money,
    #[validate(custom(function = "non_negative"))]
    pub return_price: Money,
    #[validate(custom(function = "non_negative"))]
    pub refusal_price: Money,
    #[validate(range(max = 60, message = "delivery delay cannot exceed 60 days"))]
    pub delivery_delay: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTariffPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "non_negative"))]
    pub delivery_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "non_negative"))]
    pub return_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "non_negative"))]
    pub refusal_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 60))]
    pub delivery_delay: Option<u32>,
}

/// Query filters of the tariffs list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_city_id: Option<CityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_city_id: Option<CityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}
