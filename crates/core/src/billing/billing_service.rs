use std::sync::Arc;

use log::{debug, error};
use rust_decimal::Decimal;
use serde::Serialize;

use super::billing_model::{BillTo, Invoice, InvoiceDetails, InvoiceInput};
use crate::backend::{RecordStore, Repository, Table};
use crate::children::Child;
use crate::errors::{Error, Result};
use crate::parents::Parent;
use crate::session::CurrentUser;

#[derive(Serialize)]
struct InvoiceRecord {
    #[serde(flatten)]
    input: InvoiceInput,
    amount_due: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_by_staff_id: Option<String>,
}

/// Service for creating invoices and resolving who they bill.
pub struct InvoiceService {
    invoices: Repository,
    parents: Repository,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            invoices: Repository::new(store.clone(), Table::Invoices),
            parents: Repository::new(store, Table::Parents),
        }
    }

    /// Creates an invoice whose amount due is the exact sum of its items.
    ///
    /// Staff actors are recorded as the creator; other actors leave the
    /// column unset.
    pub async fn create_invoice(
        &self,
        input: InvoiceInput,
        actor: Option<&CurrentUser>,
    ) -> Result<()> {
        input.validate()?;
        let amount_due = input.amount_due();
        let created_by_staff_id = actor
            .filter(|user| user.is_staff())
            .and_then(|user| user.staff_id.clone());
        debug!(
            "Creating invoice {} for child {} ({} items, total {})",
            input.invoice_number,
            input.child_id,
            input.items.len(),
            amount_due
        );
        let record = InvoiceRecord {
            input,
            amount_due,
            created_by_staff_id,
        };
        self.invoices.insert(&record).await?;
        Ok(())
    }

    /// Resolves the child and billed parent for `invoice`.
    ///
    /// `child` is the cached child row for the invoice. The embedded parent
    /// on the child is used when present; otherwise the primary parent is
    /// looked up once. A failed parent lookup leaves `bill_to` empty and is
    /// reported through `parent_lookup_error`.
    pub async fn invoice_details(
        &self,
        invoice: Invoice,
        child: Option<Child>,
    ) -> Result<InvoiceDetails> {
        let child = child
            .filter(|c| c.id == invoice.child_id)
            .ok_or_else(|| Error::NotFound("Child record not found for invoice.".to_string()))?;

        let mut parent_lookup_error = None;
        let bill_to = match (&child.parent, &child.primary_parent_id) {
            (Some(summary), _) => Some(BillTo::from(summary)),
            (None, Some(parent_id)) => {
                match self.parents.find_by::<Parent>("id", parent_id).await {
                    Ok(parent) => parent.as_ref().map(BillTo::from),
                    Err(e) => {
                        error!("Failed to load parent {} for invoice: {}", parent_id, e);
                        parent_lookup_error = Some(e.user_message());
                        None
                    }
                }
            }
            (None, None) => None,
        };

        Ok(InvoiceDetails {
            invoice,
            child,
            bill_to,
            parent_lookup_error,
        })
    }
}
