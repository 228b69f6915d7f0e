//! Invoice model
//!
//! Table: invoices

use chrono::{DateTime, NaiveDate, Utc};
use ch_core::traits::{Id, Identifiable, ProjectScoped, Timestamped};
use serde::{Deserialize, Serialize};

/// Invoice workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Submitted,
    Validated,
    Accounted,
    Rejected,
}

impl InvoiceStatus {
    /// Only validated and accounted invoices count toward billed totals
    pub fn is_billable(&self) -> bool {
        matches!(self, Self::Validated | Self::Accounted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Validated => "validated",
            Self::Accounted => "accounted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "validated" => Some(Self::Validated),
            "accounted" => Some(Self::Accounted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Invoice entity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Option<Id>,
    pub project_id: Id,
    pub reference: String,
    pub status: InvoiceStatus,
    pub total_amount: f64,
    pub invoice_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Invoice {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl ProjectScoped for Invoice {
    fn project_id(&self) -> Option<Id> {
        Some(self.project_id)
    }
}

impl Timestamped for Invoice {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billable_statuses() {
        assert!(InvoiceStatus::Validated.is_billable());
        assert!(InvoiceStatus::Accounted.is_billable());
        assert!(!InvoiceStatus::Draft.is_billable());
        assert!(!InvoiceStatus::Submitted.is_billable());
        assert!(!InvoiceStatus::Rejected.is_billable());
    }

    #[test]
    fn test_invoice_scoping() {
        let invoice = Invoice {
            project_id: 7,
            ..Default::default()
        };
        assert_eq!(ProjectScoped::project_id(&invoice), Some(7));
        assert!(invoice.is_new_record());
        assert!(Timestamped::created_at(&invoice).is_none());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Submitted,
            InvoiceStatus::Validated,
            InvoiceStatus::Accounted,
            InvoiceStatus::Rejected,
        ] {
            assert_eq!(InvoiceStatus::parse(status.as_str()), Some(status));
        }
    }
}
