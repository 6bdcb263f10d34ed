//! Bulk tariff import from CSV.
//!
//! Format (header required, exact column order):
//!
//! ```text
//! pickupCityRef,destinationCityRef,deliveryPrice,returnPrice,refusalPrice,deliveryDelay
//! CAS,RAB,25.00,20.00,15.00,2
//! ```
//!
//! Rows are checked against the cached city list before anything is sent.
//! Routes already configured server-side are skipped by the tariff service,
//! which reports them back as warnings.

use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shipdesk_core::{CityId, Money};

use crate::city::CityDirectory;
use crate::tariff::Tariff;

pub const CSV_HEADER: [&str; 6] = [
    "pickupCityRef",
    "destinationCityRef",
    "deliveryPrice",
    "returnPrice",
    "refusalPrice",
    "deliveryDelay",
];

/// File-level failures; the whole import is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("the file is empty")]
    Empty,

    #[error("unexpected header '{found}', expected '{}'", CSV_HEADER.join(","))]
    BadHeader { found: String },

    #[error("the file contains no data rows")]
    NoRows,

    #[error("csv error: {0}")]
    Csv(String),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Csv(err.to_string())
    }
}

/// A validated row, ready to be sent to the tariff service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub line: usize,
    pub pickup_city_ref: String,
    pub destination_city_ref: String,
    pub pickup_city_id: CityId,
    pub destination_city_id: CityId,
    pub delivery_price: Money,
    pub return_price: Money,
    pub refusal_price: Money,
    pub delivery_delay: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowErrorKind {
    ColumnCount { expected: usize, found: usize },
    UnknownPickupCity { reference: String },
    UnknownDestinationCity { reference: String },
    InvalidPrice { field: &'static str, value: String },
    NegativePrice { field: &'static str },
    InvalidDelay { value: String },
    /// Reported by the tariff service for a row that passed local checks.
    Rejected { message: String },
}

/// Row-level error; `line` is 1-based with the header on line 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub line: usize,
    #[serde(flatten)]
    pub kind: RowErrorKind,
}

impl core::fmt::Display for RowError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            RowErrorKind::ColumnCount { expected, found } => {
                write!(f, "expected {expected} columns, found {found}")
            }
            RowErrorKind::UnknownPickupCity { reference } => {
                write!(f, "unknown pickup city reference '{reference}'")
            }
            RowErrorKind::UnknownDestinationCity { reference } => {
                write!(f, "unknown destination city reference '{reference}'")
            }
            RowErrorKind::InvalidPrice { field, value } => {
                write!(f, "{field} '{value}' is not a valid amount")
            }
            RowErrorKind::NegativePrice { field } => write!(f, "{field} cannot be negative"),
            RowErrorKind::InvalidDelay { value } => {
                write!(f, "deliveryDelay '{value}' is not a number of days")
            }
            RowErrorKind::Rejected { message } => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub line: usize,
    pub message: String,
}

impl core::fmt::Display for RowWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Outcome of local validation, later merged with the server's report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub rows: Vec<ImportRow>,
    pub errors: Vec<RowError>,
    pub warnings: Vec<RowWarning>,
    pub total_rows: usize,
}

impl ImportReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Lines that carry at least one error, deduplicated and sorted.
    pub fn error_lines(&self) -> Vec<usize> {
        let mut lines: Vec<usize> = self.errors.iter().map(|e| e.line).collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }

    /// Fold in the tariff service's answer for the rows that were sent.
    pub fn merge_server_report(&mut self, server: &ServerImportReport) {
        for e in &server.errors {
            self.errors.push(RowError {
                line: e.line.unwrap_or(0),
                kind: RowErrorKind::Rejected {
                    message: e.message.clone(),
                },
            });
        }
        for w in &server.warnings {
            self.warnings.push(RowWarning {
                line: w.line.unwrap_or(0),
                message: w.message.clone(),
            });
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRowMessage {
    #[serde(default)]
    pub line: Option<usize>,
    pub message: String,
}

/// Body returned by `POST /api/tariffs/import`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerImportReport {
    #[serde(default)]
    pub imported: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub errors: Vec<ServerRowMessage>,
    #[serde(default)]
    pub warnings: Vec<ServerRowMessage>,
}

/// Parse and validate an import file against the known city references.
pub fn parse_import<R: Read>(
    reader: R,
    cities: &CityDirectory,
) -> Result<ImportReport, ImportError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header = csv.headers()?.clone();
    if header.is_empty() || header.iter().all(str::is_empty) {
        return Err(ImportError::Empty);
    }
    let normalized: Vec<&str> = header
        .iter()
        .enumerate()
        .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{feff}') } else { h })
        .collect();
    if normalized != CSV_HEADER {
        return Err(ImportError::BadHeader {
            found: normalized.join(","),
        });
    }

    let mut report = ImportReport::default();
    let mut seen_routes: HashMap<(String, String), usize> = HashMap::new();

    for (index, record) in csv.records().enumerate() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(index + 2);
        report.total_rows += 1;

        if record.len() != CSV_HEADER.len() {
            report.errors.push(RowError {
                line,
                kind: RowErrorKind::ColumnCount {
                    expected: CSV_HEADER.len(),
                    found: record.len(),
                },
            });
            continue;
        }

        let mut row_errors = Vec::new();
        let pickup_ref = &record[0];
        let destination_ref = &record[1];

        let pickup_id = cities.resolve(pickup_ref).cloned();
        if pickup_id.is_none() {
            row_errors.push(RowErrorKind::UnknownPickupCity {
                reference: pickup_ref.to_string(),
            });
        }
        let destination_id = cities.resolve(destination_ref).cloned();
        if destination_id.is_none() {
            row_errors.push(RowErrorKind::UnknownDestinationCity {
                reference: destination_ref.to_string(),
            });
        }

        let delivery = parse_price(&record[2], CSV_HEADER[2], &mut row_errors);
        let ret = parse_price(&record[3], CSV_HEADER[3], &mut row_errors);
        let refusal = parse_price(&record[4], CSV_HEADER[4], &mut row_errors);
        let delay = match record[5].parse::<u32>() {
            Ok(d) => Some(d),
            Err(_) => {
                row_errors.push(RowErrorKind::InvalidDelay {
                    value: record[5].to_string(),
                });
                None
            }
        };

        match (pickup_id, destination_id, delivery, ret, refusal, delay) {
            (
                Some(pickup_city_id),
                Some(destination_city_id),
                Some(delivery_price),
                Some(return_price),
                Some(refusal_price),
                Some(delivery_delay),
            ) if row_errors.is_empty() =>
            {
                let key = (pickup_ref.to_string(), destination_ref.to_string());
                if let Some(first_line) = seen_routes.get(&key) {
                    report.warnings.push(RowWarning {
                        line,
                        message: format!(
                            "duplicate route {pickup_ref} → {destination_ref} \
                             (first on line {first_line}), skipped"
                        ),
                    });
                    continue;
                }
                seen_routes.insert(key, line);
                report.rows.push(ImportRow {
                    line,
                    pickup_city_ref: pickup_ref.to_string(),
                    destination_city_ref: destination_ref.to_string(),
                    pickup_city_id,
                    destination_city_id,
                    delivery_price,
                    return_price,
                    refusal_price,
                    delivery_delay,
                });
            }
            _ => {
                report
                    .errors
                    .extend(row_errors.into_iter().map(|kind| RowError { line, kind }));
            }
        }
    }

    if report.total_rows == 0 {
        return Err(ImportError::NoRows);
    }

    tracing::debug!(
        rows = report.rows.len(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "tariff import validated"
    );
    Ok(report)
}

fn parse_price(raw: &str, field: &'static str, errors: &mut Vec<RowErrorKind>) -> Option<Money> {
    match Money::parse_decimal(raw) {
        Ok(m) if m.is_negative() => {
            errors.push(RowErrorKind::NegativePrice { field });
            None
        }
        Ok(m) => Some(m),
        Err(_) => {
            errors.push(RowErrorKind::InvalidPrice {
                field,
                value: raw.to_string(),
            });
            None
        }
    }
}

/// Header plus one example row.
pub fn template_csv() -> String {
    format!("{}\nCAS,RAB,25.00,20.00,15.00,2\n", CSV_HEADER.join(","))
}

/// Export tariffs in the import format.
pub fn export_csv<'a>(
    tariffs: impl IntoIterator<Item = &'a Tariff>,
) -> Result<String, ImportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for t in tariffs {
        writer.write_record([
            t.pickup_city_ref.clone(),
            t.destination_city_ref.clone(),
            t.delivery_price.to_string(),
            t.return_price.to_string(),
            t.refusal_price.to_string(),
            t.delivery_delay.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ImportError::Csv(e.to_string()))
}
