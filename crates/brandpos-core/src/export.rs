//! # Export Module
//!
//! Renders a sale selection as a downloadable CSV or spreadsheet file.
//!
//! ## Columns
//! ```text
//! ┌──────────┬───────┬──────────┬───────────┬────────────┬──────────────┬─────────────────┬─────────┐
//! │ Date     │ Brand │ Quantity │ Sale Type │ Unit Price │ Total Amount │ Amount Received │ Balance │
//! ├──────────┼───────┼──────────┼───────────┼────────────┼──────────────┼─────────────────┼─────────┤
//! │ 15       │ 20    │ 10       │ 15        │ 12         │ 15           │ 18              │ 12      │  ← xlsx widths
//! └──────────┴───────┴──────────┴───────────┴────────────┴──────────────┴─────────────────┴─────────┘
//! ```
//!
//! Rendering happens entirely in memory; the server streams the returned
//! bytes as an attachment.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::money::Money;
use crate::report::day_key;
use crate::types::SaleView;

/// Column headers, in output order.
pub const HEADERS: [&str; 8] = [
    "Date",
    "Brand",
    "Quantity",
    "Sale Type",
    "Unit Price",
    "Total Amount",
    "Amount Received",
    "Balance",
];

/// Spreadsheet column widths, aligned with [`HEADERS`].
pub const COLUMN_WIDTHS: [f64; 8] = [15.0, 20.0, 10.0, 15.0, 12.0, 15.0, 18.0, 12.0];

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Sales Report";

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// =============================================================================
// Errors
// =============================================================================

/// Rendering failures. These never depend on user input.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Format
// =============================================================================

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Spreadsheet,
}

impl ExportFormat {
    /// `excel` / `xlsx` select the spreadsheet; anything else is CSV.
    pub fn parse(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some("excel") | Some("xlsx") => ExportFormat::Spreadsheet,
            _ => ExportFormat::Csv,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_CONTENT_TYPE,
            ExportFormat::Spreadsheet => XLSX_CONTENT_TYPE,
        }
    }

    /// Download filename. Only the CSV name carries the export date.
    pub fn filename(&self, period: &str, today: NaiveDate) -> String {
        match self {
            ExportFormat::Csv => {
                format!("sales_report_{}_{}.csv", period, today.format("%Y-%m-%d"))
            }
            ExportFormat::Spreadsheet => format!("sales_report_{}.xlsx", period),
        }
    }
}

/// A rendered file ready to send.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

// =============================================================================
// Rows
// =============================================================================

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub date: String,
    pub brand: String,
    pub quantity: i64,
    pub sale_type: &'static str,
    /// `None` when the quantity is zero.
    pub unit_price: Option<Money>,
    pub total_amount: Money,
    pub amount_received: Money,
    pub balance: Money,
}

impl ExportRow {
    pub fn from_view(view: &SaleView) -> Self {
        let sale = &view.sale;
        Self {
            date: day_key(sale.date),
            brand: view.brand_name().to_string(),
            quantity: sale.quantity,
            sale_type: sale.sale_type.label(),
            unit_price: sale.total_amount().divide_by_quantity(sale.quantity),
            total_amount: sale.total_amount(),
            amount_received: sale.amount_received(),
            balance: sale.balance(),
        }
    }

    /// Text cells in [`HEADERS`] order.
    fn text_cells(&self) -> [String; 8] {
        [
            self.date.clone(),
            self.brand.clone(),
            self.quantity.to_string(),
            self.sale_type.to_string(),
            self.unit_price
                .map(|p| p.to_decimal_string())
                .unwrap_or_default(),
            self.total_amount.to_decimal_string(),
            self.amount_received.to_decimal_string(),
            self.balance.to_decimal_string(),
        ]
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders `sales` in the requested format.
///
/// ## Example
/// ```rust
/// use brandpos_core::export::{format_report, ExportFormat};
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// let file = format_report(&[], ExportFormat::Csv, "week", today).unwrap();
/// assert_eq!(file.filename, "sales_report_week_2024-05-01.csv");
/// assert_eq!(file.content_type, "text/csv");
/// ```
pub fn format_report(
    sales: &[SaleView],
    format: ExportFormat,
    period: &str,
    today: NaiveDate,
) -> Result<ExportFile, ExportError> {
    let rows: Vec<ExportRow> = sales.iter().map(ExportRow::from_view).collect();

    let bytes = match format {
        ExportFormat::Csv => render_csv(&rows)?,
        ExportFormat::Spreadsheet => render_xlsx(&rows)?,
    };

    Ok(ExportFile {
        bytes,
        filename: format.filename(period, today),
        content_type: format.content_type(),
    })
}

/// Header line followed by one record per row.
pub fn render_csv(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record(row.text_cells())?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Single-sheet workbook with a bold header row.
///
/// Amounts are written as numbers so the sheet can sum them; an
/// undefined unit price is left blank.
pub fn render_xlsx(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (header, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.set_column_width(col, width)?;
        sheet.write_string_with_format(0, col, *header, &bold)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.date)?;
        sheet.write_string(r, 1, &row.brand)?;
        sheet.write_number(r, 2, row.quantity as f64)?;
        sheet.write_string(r, 3, row.sale_type)?;
        if let Some(unit) = row.unit_price {
            sheet.write_number(r, 4, unit.to_f64())?;
        }
        sheet.write_number(r, 5, row.total_amount.to_f64())?;
        sheet.write_number(r, 6, row.amount_received.to_f64())?;
        sheet.write_number(r, 7, row.balance.to_f64())?;
    }

    Ok(workbook.save_to_buffer()?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BrandSummary, Sale, SaleType};
    use chrono::{TimeZone, Utc};

    fn view(brand: Option<&str>, quantity: i64, total: i64, received: i64) -> SaleView {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        SaleView {
            sale: Sale {
                id: "s".into(),
                brand_id: "b".into(),
                quantity,
                total_amount_cents: total,
                amount_received_cents: received,
                change_given_cents: received - total,
                sale_type: SaleType::for_quantity(quantity),
                date,
                created_at: date,
                updated_at: date,
            },
            brand: brand.map(|name| BrandSummary {
                id: "b".into(),
                name: name.into(),
                price_cents: 0,
                stock: 0,
            }),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(ExportFormat::parse(None), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(Some("excel")), ExportFormat::Spreadsheet);
        assert_eq!(ExportFormat::parse(Some("pdf")), ExportFormat::Csv);
        assert_eq!(
            ExportFormat::Spreadsheet.filename("month", today()),
            "sales_report_month.xlsx"
        );
    }

    #[test]
    fn test_row_values() {
        let row = ExportRow::from_view(&view(Some("Marlboro"), 3, 1000, 1200));
        assert_eq!(row.date, "2024-05-01");
        assert_eq!(row.sale_type, "Multi-Product");
        assert_eq!(row.unit_price, Some(Money::from_cents(333)));
        assert_eq!(row.balance.to_decimal_string(), "2.00");

        let zero = ExportRow::from_view(&view(None, 0, 1000, 1000));
        assert_eq!(zero.brand, "Unknown");
        assert_eq!(zero.unit_price, None);
    }

    #[test]
    fn test_csv_layout() {
        let sales = vec![
            view(Some("Marlboro"), 2, 2000, 2500),
            view(Some("Pall Mall, Red"), 1, 550, 550),
        ];
        let file = format_report(&sales, ExportFormat::Csv, "day", today()).unwrap();
        let text = String::from_utf8(file.bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Date,Brand,Quantity,Sale Type,Unit Price,Total Amount,Amount Received,Balance"
        );
        assert_eq!(
            lines[1],
            "2024-05-01,Marlboro,2,Multi-Product,10.00,20.00,25.00,5.00"
        );
        assert_eq!(
            lines[2],
            "2024-05-01,\"Pall Mall, Red\",1,Single Product,5.50,5.50,5.50,0.00"
        );
        assert_eq!(file.filename, "sales_report_day_2024-05-02.csv");
    }

    #[test]
    fn test_csv_balance_matches_amounts() {
        let sales = vec![
            view(Some("A"), 1, 999, 1000),
            view(Some("B"), 4, 1234, 2000),
        ];
        let rows: Vec<ExportRow> = sales.iter().map(ExportRow::from_view).collect();
        let bytes = render_csv(&rows).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        for record in reader.records() {
            let record = record.unwrap();
            let total: f64 = record[5].parse().unwrap();
            let received: f64 = record[6].parse().unwrap();
            let balance = &record[7];
            assert_eq!(balance, format!("{:.2}", received - total));
        }
    }

    #[test]
    fn test_xlsx_is_a_zip_archive() {
        let sales = vec![view(Some("A"), 1, 500, 500), view(None, 0, 100, 100)];
        let file = format_report(&sales, ExportFormat::Spreadsheet, "year", today()).unwrap();
        assert_eq!(&file.bytes[..2], b"PK");
        assert_eq!(file.content_type, XLSX_CONTENT_TYPE);
    }
}
