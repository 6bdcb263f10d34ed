//! Tariff configuration: cities, pickup cities and route pricing.
//!
//! Pricing and route coverage are computed by the tariff service; this crate
//! models what it returns and validates what the back office sends (CSV
//! imports in particular).

pub mod city;
pub mod coverage;
pub mod import;
pub mod tariff;

pub use city::{
    City, CityDirectory, CreatePickupCityPayload, PickupCity, PickupCityFilters,
    UpdatePickupCityPayload,
};
pub use coverage::{missing_by_pickup, CoverageStats, MissingTariff, MissingTariffFilter};
pub use import::{
    export_csv, parse_import, template_csv, ImportError, ImportReport, ImportRow, RowError,
    RowErrorKind, RowWarning, ServerImportReport, ServerRowMessage, CSV_HEADER,
};
pub use tariff::{CreateTariffPayload, Tariff, TariffFilters, UpdateTariffPayload};
