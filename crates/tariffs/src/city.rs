use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use shipdesk_core::{CityId, Resource};

/// Destination city known to the tariff service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: CityId,
    /// Short reference code used in CSV imports (e.g. `"CAS"`).
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Resource for City {
    type Id = CityId;

    fn id(&self) -> &CityId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.reference)
    }
}

/// City from which parcels are collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupCity {
    pub id: CityId,
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub tariff_count: u32,
}

impl Resource for PickupCity {
    type Id = CityId;

    fn id(&self) -> &CityId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.reference)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePickupCityPayload {
    #[validate(length(min = 2, max = 10, message = "reference must be 2 to 10 characters"))]
    pub reference: String,
    #[validate(length(min = 1, max = 120, message = "name is required"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePickupCityPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Query filters of the pickup-city list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupCityFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Lookup of city reference codes, built from the cached city list.
#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    by_reference: HashMap<String, CityId>,
}

impl CityDirectory {
    pub fn from_cities<'a>(cities: impl IntoIterator<Item = &'a City>) -> Self {
        let by_reference = cities
            .into_iter()
            .map(|c| (c.reference.trim().to_string(), c.id.clone()))
            .collect();
        Self { by_reference }
    }

    /// Register pickup cities too: a pickup city code is valid on either side.
    pub fn with_pickup_cities<'a>(
        mut self,
        cities: impl IntoIterator<Item = &'a PickupCity>,
    ) -> Self {
        for c in cities {
            self.by_reference
                .entry(c.reference.trim().to_string())
                .or_insert_with(|| c.id.clone());
        }
        self
    }

    /// Exact (case-sensitive) lookup after trimming.
    pub fn resolve(&self, reference: &str) -> Option<&CityId> {
        self.by_reference.get(reference.trim())
    }

    pub fn len(&self) -> usize {
        self.by_reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_reference.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(id: &str, reference: &str) -> City {
        City {
            id: CityId::new(id),
            reference: reference.to_string(),
            name: reference.to_string(),
            zone: None,
            is_active: true,
        }
    }

    #[test]
    fn directory_resolves_trimmed_exact_codes() {
        let cities = [city("c-1", "RAB"), city("c-2", " TNG ")];
        let dir = CityDirectory::from_cities(&cities);
        assert_eq!(dir.resolve("RAB"), Some(&CityId::new("c-1")));
        assert_eq!(dir.resolve(" TNG"), Some(&CityId::new("c-2")));
        assert_eq!(dir.resolve("rab"), None);
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn pickup_city_defaults() {
        let pc: PickupCity = serde_json::from_value(serde_json::json!({
            "id": "p-1",
            "reference": "CAS",
            "name": "Casablanca"
        }))
        .unwrap();
        assert!(pc.is_active);
        assert_eq!(pc.tariff_count, 0);
        assert_eq!(pc.label(), "Casablanca (CAS)");
    }
}
