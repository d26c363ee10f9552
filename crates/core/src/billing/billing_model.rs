//! Invoice domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::children::{Child, ParentSummary};
use crate::errors::{Result, ValidationError};
use crate::parents::Parent;
use crate::utils::serde_input::{
    deserialize_date, deserialize_decimal, deserialize_null_as_empty, deserialize_option_date,
};
use crate::utils::text::full_name;

/// Status of an invoice. Read case-insensitively from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    Paid,
    Draft,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Overdue => "Overdue",
        }
    }

    /// Unpaid and overdue invoices still expect payment.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, InvoiceStatus::Unpaid | InvoiceStatus::Overdue)
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "draft" => Ok(InvoiceStatus::Draft),
            "overdue" => Ok(InvoiceStatus::Overdue),
            _ => Err(format!("Unknown invoice status '{}'", s)),
        }
    }
}

impl TryFrom<String> for InvoiceStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InvoiceStatus> for String {
    fn from(status: InvoiceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub amount: Decimal,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// An invoice row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub child_id: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub invoice_date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub amount_due: Decimal,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_by_staff_id: Option<String>,
}

/// Form payload for a new invoice. The amount due is derived from the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceInput {
    pub child_id: String,
    pub invoice_number: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub invoice_date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl InvoiceInput {
    /// Exact sum of the item amounts.
    pub fn amount_due(&self) -> Decimal {
        self.items.iter().map(|item| item.amount).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.child_id.trim().is_empty() {
            return Err(ValidationError::MissingField("Child".to_string()).into());
        }
        if self.invoice_number.trim().is_empty() {
            return Err(ValidationError::MissingField("Invoice number".to_string()).into());
        }
        if self.items.iter().any(|item| item.description.trim().is_empty()) {
            return Err(ValidationError::MissingField("Item description".to_string()).into());
        }
        Ok(())
    }
}

/// Billing contact printed on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillTo {
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub province_state: Option<String>,
    pub postal_code: Option<String>,
}

impl BillTo {
    /// Address lines in print order, skipping blanks.
    pub fn lines(&self) -> Vec<String> {
        let locality = [
            self.city.as_deref(),
            self.province_state.as_deref(),
            self.postal_code.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ");
        [
            Some(self.name.clone()),
            self.address_line1.clone(),
            Some(locality),
            self.email.clone(),
            self.phone_number.clone(),
        ]
        .into_iter()
        .flatten()
        .filter(|line| !line.trim().is_empty())
        .collect()
    }
}

impl From<&ParentSummary> for BillTo {
    fn from(parent: &ParentSummary) -> Self {
        Self {
            name: parent.full_name(),
            email: parent.email.clone(),
            phone_number: None,
            address_line1: None,
            city: None,
            province_state: None,
            postal_code: None,
        }
    }
}

impl From<&Parent> for BillTo {
    fn from(parent: &Parent) -> Self {
        Self {
            name: full_name(parent.first_name.as_deref(), parent.last_name.as_deref()),
            email: parent.email.clone(),
            phone_number: parent.phone_number.clone(),
            address_line1: parent.address_line1.clone(),
            city: parent.city.clone(),
            province_state: parent.province_state.clone(),
            postal_code: parent.postal_code.clone(),
        }
    }
}

/// An invoice with its child and billed parent resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetails {
    pub invoice: Invoice,
    pub child: Child,
    pub bill_to: Option<BillTo>,
    /// Set when the parent lookup faulted; the details are still usable.
    pub parent_lookup_error: Option<String>,
}
