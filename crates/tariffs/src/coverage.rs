//! Route coverage as reported by the tariff service.
//!
//! The service computes the missing pickup → destination pairs and the
//! coverage ratio. Here they are only filtered and grouped for display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use shipdesk_core::CityId;

/// A city pair with no configured tariff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingTariff {
    pub pickup_city_id: CityId,
    pub pickup_city_ref: String,
    #[serde(default)]
    pub pickup_city_name: String,
    pub destination_city_id: CityId,
    pub destination_city_ref: String,
    #[serde(default)]
    pub destination_city_name: String,
    #[serde(default)]
    pub destination_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageStats {
    pub total_routes: u64,
    pub configured_routes: u64,
    pub missing_routes: u64,
    /// 0–100, as computed server-side.
    pub coverage_percentage: f64,
}

impl CoverageStats {
    pub fn is_complete(&self) -> bool {
        self.missing_routes == 0
    }
}

/// Client-side narrowing of the missing-tariff list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingTariffFilter {
    pub pickup_city_ref: Option<String>,
    pub destination_zone: Option<String>,
    /// Case-insensitive match on either city's name or reference.
    pub search: Option<String>,
}

impl MissingTariffFilter {
    pub fn matches(&self, item: &MissingTariff) -> bool {
        if let Some(pickup) = &self.pickup_city_ref {
            if &item.pickup_city_ref != pickup {
                return false;
            }
        }
        if let Some(zone) = &self.destination_zone {
            if item.destination_zone.as_deref() != Some(zone.as_str()) {
                return false;
            }
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let haystacks = [
                &item.pickup_city_ref,
                &item.pickup_city_name,
                &item.destination_city_ref,
                &item.destination_city_name,
            ];
            if !haystacks.iter().any(|h| h.to_lowercase().contains(&term)) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, items: &'a [MissingTariff]) -> Vec<&'a MissingTariff> {
        items.iter().filter(|i| self.matches(i)).collect()
    }
}

/// Count of missing routes per pickup city reference, sorted by reference.
pub fn missing_by_pickup(items: &[MissingTariff]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item.pickup_city_ref.as_str()).or_insert(0) += 1;
    }
    counts
}
