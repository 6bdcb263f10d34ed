//! Strongly-typed identifiers.
//!
//! The backend owns identity; ids arrive as opaque strings and are never
//! generated client-side.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! string_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(String);

        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, ": empty")));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

string_id!(
    /// Tenant (isolated customer account) scoping all data and permissions.
    TenantId,
    "TenantId"
);
string_id!(UserId, "UserId");
string_id!(CityId, "CityId");
string_id!(TariffId, "TariffId");
string_id!(ExpeditionId, "ExpeditionId");
string_id!(
    /// Line item inside an expedition (the `itemId` of a receive payload).
    ExpeditionItemId,
    "ExpeditionItemId"
);
string_id!(SlipId, "SlipId");
string_id!(ParcelId, "ParcelId");
string_id!(InvoiceId, "InvoiceId");
string_id!(SellerId, "SellerId");
string_id!(WarehouseId, "WarehouseId");
string_id!(ProductId, "ProductId");
string_id!(StockItemId, "StockItemId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_rejects_empty() {
        let id: TariffId = "  t-1 ".parse().unwrap();
        assert_eq!(id.as_str(), "t-1");
        assert!("   ".parse::<TariffId>().is_err());
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = ExpeditionId::new("exp-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"exp-42\"");
        let back: ExpeditionId = serde_json::from_str("\"exp-42\"").unwrap();
        assert_eq!(back, id);
    }
}
