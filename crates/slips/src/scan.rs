//! Scan session: which parcel codes have already been recorded on a slip.
//!
//! Duplicate detection happens here, before any request, so a double scan never
//! reaches the slip service.

use std::collections::HashSet;

use crate::slip::Slip;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// New code, trimmed; the caller should submit it.
    Accepted(String),
    AlreadyScanned(String),
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    scanned_codes: HashSet<String>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the session with the parcels the slip already marks as scanned.
    pub fn from_slip(slip: &Slip) -> Self {
        Self {
            scanned_codes: slip.scanned_codes().map(str::to_string).collect(),
        }
    }

    /// Classifies a raw scanner read without recording it.
    pub fn check(&self, raw: &str) -> ScanOutcome {
        let code = raw.trim();
        if code.is_empty() {
            ScanOutcome::Empty
        } else if self.scanned_codes.contains(code) {
            ScanOutcome::AlreadyScanned(code.to_string())
        } else {
            ScanOutcome::Accepted(code.to_string())
        }
    }

    /// Records a code after the server accepted it.
    pub fn confirm(&mut self, code: &str) -> bool {
        self.scanned_codes.insert(code.trim().to_string())
    }

    /// Drops a code after the server removed the parcel.
    pub fn forget(&mut self, code: &str) -> bool {
        self.scanned_codes.remove(code.trim())
    }

    /// Re-seeds from a fresh server copy, keeping codes confirmed in this session.
    pub fn sync_with(&mut self, slip: &Slip) {
        self.scanned_codes
            .extend(slip.scanned_codes().map(str::to_string));
    }

    pub fn contains(&self, code: &str) -> bool {
        self.scanned_codes.contains(code.trim())
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.scanned_codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scanned_codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scanned_codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn slip() -> Slip {
        serde_json::from_value(json!({
            "id": "bl-1",
            "reference": "BL-0001",
            "status": "PENDING",
            "items": [
                { "parcelId": "p1", "parcelReference": "PARCEL123", "scanned": true },
                { "parcelId": "p2", "parcelReference": "PARCEL456", "scanned": false }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn slip_seed_marks_scanned_parcels_only() {
        let session = ScanSession::from_slip(&slip());
        assert!(session.contains("PARCEL123"));
        assert!(!session.contains("PARCEL456"));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn duplicates_and_blanks_are_not_accepted() {
        let session = ScanSession::from_slip(&slip());
        assert_eq!(
            session.check("  PARCEL123\n"),
            ScanOutcome::AlreadyScanned("PARCEL123".into())
        );
        assert_eq!(session.check("   "), ScanOutcome::Empty);
        assert_eq!(
            session.check(" PARCEL456 "),
            ScanOutcome::Accepted("PARCEL456".into())
        );
    }

    #[test]
    fn confirm_then_forget() {
        let mut session = ScanSession::new();
        assert!(session.confirm("A1"));
        assert!(!session.confirm(" A1 "));
        assert_eq!(session.check("A1"), ScanOutcome::AlreadyScanned("A1".into()));
        assert!(session.forget("A1"));
        assert_eq!(session.check("A1"), ScanOutcome::Accepted("A1".into()));
    }

    proptest! {
        #[test]
        fn confirmed_codes_are_always_duplicates(code in "[A-Z0-9]{1,16}", pad in " {0,3}") {
            let mut session = ScanSession::new();
            prop_assert_eq!(session.check(&code), ScanOutcome::Accepted(code.clone()));
            session.confirm(&code);
            let padded = format!("{pad}{code}{pad}");
            prop_assert_eq!(session.check(&padded), ScanOutcome::AlreadyScanned(code));
        }
    }
}
