//! Presentation of a cost breakdown: inline chart, HTML page and file exports.
//!
//! Amounts stay `Decimal` until they reach one of these renderers; each output
//! formats them for its own medium.

use crate::config::{Currency, CurrencySettings};
use crate::currency::{format_ascii, format_for};
use crate::error::AppError;
use crate::models::{CostLineItem, DateRange, ExportFormat, ExportRequest, ExportedFile};
use rust_decimal::Decimal;
use tracing::info;

pub mod chart;
pub mod html;
pub mod pdf;
pub mod xlsx;

pub const REPORT_TITLE: &str = "AWS Cost Report";

/// Display row shared by the HTML table and the PDF table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub service: String,
    pub primary: String,
    pub secondary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolSet {
    Unicode,
    Ascii,
}

pub fn table_rows(
    items: &[CostLineItem],
    currency: &CurrencySettings,
    symbols: SymbolSet,
) -> Vec<TableRow> {
    let fmt = |amount: Decimal, c: &Currency| match symbols {
        SymbolSet::Unicode => format_for(amount, c),
        SymbolSet::Ascii => format_ascii(amount, c),
    };
    items
        .iter()
        .map(|item| TableRow {
            service: item.service.clone(),
            primary: fmt(item.amount_primary, &currency.primary),
            secondary: fmt(item.amount_secondary, &currency.secondary),
        })
        .collect()
}

pub fn column_headers(currency: &CurrencySettings) -> [String; 3] {
    [
        "Service".to_string(),
        format!("Cost ({})", currency.primary.code),
        format!("Cost ({})", currency.secondary.code),
    ]
}

pub fn export_filename(range: &DateRange, format: ExportFormat) -> String {
    format!("AWS_Cost_{}_{}.{}", range.start, range.end, format.extension())
}

pub fn export(
    format: ExportFormat,
    request: &ExportRequest,
    currency: &CurrencySettings,
) -> Result<ExportedFile, AppError> {
    if request.line_items.is_empty() {
        return Err(AppError::EmptyReport);
    }

    let bytes = match format {
        ExportFormat::Spreadsheet => xlsx::render_spreadsheet(&request.line_items, currency)?,
        ExportFormat::Document => pdf::render_document(request, currency)?,
    };

    let filename = export_filename(&request.range, format);
    info!(%filename, rows = request.line_items.len(), size = bytes.len(), "report exported");

    Ok(ExportedFile {
        filename,
        content_type: format.content_type(),
        bytes,
    })
}
