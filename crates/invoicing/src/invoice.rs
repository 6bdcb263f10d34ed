use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shipdesk_core::{DomainError, DomainResult, InvoiceId, Money, Resource, SellerId};

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Brouillon",
            InvoiceStatus::Pending => "En attente",
            InvoiceStatus::Paid => "Payée",
            InvoiceStatus::Cancelled => "Annulée",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive date range an invoice covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BillingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::validation(format!(
                "billing period ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Invoice ("facture") issued to a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub reference: String,
    pub seller_id: SellerId,
    #[serde(default)]
    pub seller_name: Option<String>,
    pub status: InvoiceStatus,
    pub period: BillingPeriod,
    /// Collected cash-on-delivery amounts for the period.
    pub gross_amount: Money,
    /// Delivery, return and refusal fees charged.
    pub fees_amount: Money,
    /// What the platform owes the seller.
    pub net_amount: Money,
    #[serde(default)]
    pub parcel_count: u32,
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Amount still to be paid out.
    pub fn outstanding_amount(&self) -> Money {
        match self.status {
            InvoiceStatus::Pending => self.net_amount,
            _ => Money::ZERO,
        }
    }

    /// Only pending invoices can be paid.
    pub fn can_accept_payment(&self) -> bool {
        self.status == InvoiceStatus::Pending
    }

    pub fn can_cancel(&self) -> bool {
        matches!(self.status, InvoiceStatus::Draft | InvoiceStatus::Pending)
    }

    pub fn ensure_payable(&self) -> DomainResult<()> {
        if self.can_accept_payment() {
            Ok(())
        } else {
            Err(DomainError::transition(self.status, InvoiceStatus::Paid))
        }
    }

    pub fn ensure_cancellable(&self) -> DomainResult<()> {
        if self.can_cancel() {
            Ok(())
        } else {
            Err(DomainError::transition(self.status, InvoiceStatus::Cancelled))
        }
    }
}

impl Resource for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &InvoiceId {
        &self.id
    }

    fn label(&self) -> String {
        self.reference.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoicePayload {
    pub seller_id: SellerId,
    pub period: BillingPeriod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidPayload {
    pub paid_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<SellerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Count and total of invoices awaiting payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSummary {
    pub count: usize,
    pub outstanding: Money,
}

impl PendingSummary {
    pub fn from_invoices<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> Self {
        invoices
            .into_iter()
            .filter(|inv| inv.status == InvoiceStatus::Pending)
            .fold(Self::default(), |mut acc, inv| {
                acc.count += 1;
                acc.outstanding += inv.outstanding_amount();
                acc
            })
    }
}
