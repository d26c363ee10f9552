//! Billing module - invoices, invoice details and PDF export.

mod billing_model;
mod billing_service;
mod invoice_document;
mod pdf;


pub use billing_model::{
    BillTo, Invoice, InvoiceDetails, InvoiceInput, InvoiceItem, InvoiceStatus,
};
pub use billing_service::InvoiceService;
pub use invoice_document::{format_money, InvoiceDocument};
pub use pdf::PdfPage;
