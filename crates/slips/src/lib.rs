//! Delivery and shipping slips ("bons de livraison" / "bons d'expédition").

pub mod scan;
pub mod slip;

pub use scan::{ScanOutcome, ScanSession};
pub use slip::{
    AddParcelPayload, Slip, SlipFilters, SlipItem, SlipKind, SlipStatus, SlipSummary,
    UpdateSlipStatusPayload,
};
