//! Printable invoice layout.

use rust_decimal::Decimal;
use serde::Serialize;

use super::billing_model::InvoiceDetails;
use super::pdf::{render_pages, wrap_text, PdfPage, PAGE_HEIGHT, PAGE_WIDTH};
use crate::constants::MONEY_DISPLAY_SCALE;

const MARGIN: f32 = 56.0;
const LINE: f32 = 16.0;
const TOP: f32 = PAGE_HEIGHT - MARGIN - 10.0;
/// Lowest baseline for body text; the footer sits below it.
const BOTTOM: f32 = MARGIN + LINE * 1.5;
const AMOUNT_COLUMN: f32 = 100.0;

/// Formats a money amount without changing its value. Amounts with fewer
/// than two decimal places are padded with zeros; longer scales are kept.
pub fn format_money(amount: Decimal) -> String {
    let mut value = amount;
    if value.scale() < MONEY_DISPLAY_SCALE {
        value.rescale(MONEY_DISPLAY_SCALE);
    }
    format!("${}", value)
}

/// Everything printed on an exported invoice, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    pub issuer: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: Option<String>,
    pub status: String,
    pub bill_to: Vec<String>,
    pub child_name: String,
    pub items: Vec<(String, String)>,
    pub total: String,
    pub notes: Option<String>,
    pub footer: String,
}

impl InvoiceDocument {
    pub fn from_details(details: &InvoiceDetails, issuer: &str) -> Self {
        let invoice = &details.invoice;
        Self {
            issuer: issuer.to_string(),
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: invoice.invoice_date.format("%Y-%m-%d").to_string(),
            due_date: invoice.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            status: invoice.status.to_string(),
            bill_to: details
                .bill_to
                .as_ref()
                .map(|b| b.lines())
                .unwrap_or_default(),
            child_name: details.child.name.clone(),
            items: invoice
                .items
                .iter()
                .map(|item| (item.description.clone(), format_money(item.amount)))
                .collect(),
            total: format_money(invoice.amount_due),
            notes: invoice
                .notes
                .clone()
                .filter(|n| !n.trim().is_empty()),
            footer: format!("Thank you for choosing {}!", issuer),
        }
    }

    /// Suggested download name, e.g. `invoice_INV-001.pdf`.
    pub fn file_name(&self) -> String {
        let safe: String = self
            .invoice_number
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("invoice_{}.pdf", safe)
    }

    pub fn to_pdf(&self) -> Vec<u8> {
        let right = PAGE_WIDTH - MARGIN;
        let mut layout = Layout::new(&self.footer);

        layout.page.text(MARGIN, layout.y, 20.0, true, &self.issuer);
        layout.page.text_right(right, layout.y, 20.0, true, "INVOICE");
        layout.y -= LINE * 2.0;

        let mut header = vec![
            format!("Invoice #: {}", self.invoice_number),
            format!("Date: {}", self.invoice_date),
        ];
        if let Some(due) = &self.due_date {
            header.push(format!("Due Date: {}", due));
        }
        header.push(format!("Status: {}", self.status));
        for line in &header {
            layout.page.text(MARGIN, layout.y, 10.0, false, line);
            layout.y -= LINE;
        }
        layout.y -= LINE * 0.5;

        layout.reserve(LINE * (self.bill_to.len() as f32 + 2.0));
        layout.page.text(MARGIN, layout.y, 11.0, true, "Bill To:");
        layout.y -= LINE;
        for line in &self.bill_to {
            layout.page.text(MARGIN, layout.y, 10.0, false, line);
            layout.y -= LINE;
        }
        layout
            .page
            .text(MARGIN, layout.y, 10.0, false, &format!("Child: {}", self.child_name));
        layout.y -= LINE * 1.5;

        layout.reserve(LINE * 2.0);
        item_table_header(&mut layout, right);
        let description_width = right - MARGIN - AMOUNT_COLUMN;
        for (description, amount) in &self.items {
            let lines = wrap_text(description, description_width, 10.0);
            if layout.reserve(LINE * lines.len() as f32) {
                item_table_header(&mut layout, right);
            }
            for (index, line) in lines.iter().enumerate() {
                layout.page.text(MARGIN, layout.y, 10.0, false, line);
                if index == 0 {
                    layout.page.text_right(right, layout.y, 10.0, false, amount);
                }
                layout.y -= LINE;
            }
        }

        layout.reserve(LINE * 1.5);
        layout.page.line(MARGIN, layout.y + 10.0, right, layout.y + 10.0);
        layout.y -= 4.0;
        layout.page.text_right(
            right,
            layout.y,
            12.0,
            true,
            &format!("Total Due: {}", self.total),
        );
        layout.y -= LINE * 2.0;

        if let Some(notes) = &self.notes {
            layout.reserve(LINE * 2.0);
            layout.page.text(MARGIN, layout.y, 11.0, true, "Notes:");
            layout.y -= LINE;
            for line in notes.lines().flat_map(|l| wrap_text(l, right - MARGIN, 10.0)) {
                layout.reserve(LINE);
                layout.page.text(MARGIN, layout.y, 10.0, false, &line);
                layout.y -= LINE;
            }
        }

        render_pages(&layout.finish())
    }
}

fn item_table_header(layout: &mut Layout, right: f32) {
    layout.page.text(MARGIN, layout.y, 11.0, true, "Description");
    layout.page.text_right(right, layout.y, 11.0, true, "Amount");
    layout.y -= 6.0;
    layout.page.line(MARGIN, layout.y, right, layout.y);
    layout.y -= LINE;
}

/// Cursor over a growing list of pages. Every page gets the footer.
struct Layout<'a> {
    pages: Vec<PdfPage>,
    page: PdfPage,
    y: f32,
    footer: &'a str,
}

impl<'a> Layout<'a> {
    fn new(footer: &'a str) -> Self {
        Self {
            pages: Vec::new(),
            page: PdfPage::new(),
            y: TOP,
            footer,
        }
    }

    /// Starts a new page unless `height` more points fit above the footer.
    /// Returns whether a page break happened.
    fn reserve(&mut self, height: f32) -> bool {
        if self.y - height + LINE >= BOTTOM {
            return false;
        }
        let full = std::mem::take(&mut self.page);
        self.close(full);
        self.y = TOP;
        true
    }

    fn close(&mut self, mut page: PdfPage) {
        page.text(MARGIN, MARGIN, 9.0, false, self.footer);
        self.pages.push(page);
    }

    fn finish(mut self) -> Vec<PdfPage> {
        let last = std::mem::take(&mut self.page);
        self.close(last);
        self.pages
    }
}
