//! Invoicing ("factures") issued to sellers for a billing period.
//!
//! Amounts and statuses are computed by the invoicing service; this crate
//! mirrors them and derives the summaries the back office displays.

pub mod invoice;

pub use invoice::{
    BillingPeriod, GenerateInvoicePayload, Invoice, InvoiceFilters, InvoiceStatus,
    MarkPaidPayload, PendingSummary,
};
