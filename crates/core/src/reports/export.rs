//! CSV export of the revenue report.

use chrono::NaiveDate;
use thiserror::Error;

use crate::invoice::effective_status;

use super::types::InvoiceRow;

const REVENUE_COLUMNS: [&str; 9] = [
    "Invoice Number",
    "Client",
    "Issue Date",
    "Due Date",
    "Subtotal (SAR)",
    "VAT (SAR)",
    "Total (SAR)",
    "Status",
    "Payment Date",
];

/// Errors raised while rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv rendering failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer flush failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output was not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Renders invoice rows as the revenue CSV attachment.
///
/// One record per invoice, dates as `YYYY-MM-DD`, amounts with two
/// fractional digits, empty fields for missing dates. Status is the
/// effective status as of `today`.
///
/// # Errors
///
/// Returns `ExportError` if CSV serialization fails.
pub fn revenue_csv(invoices: &[InvoiceRow], today: NaiveDate) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REVENUE_COLUMNS)?;

    for invoice in invoices {
        let status = effective_status(invoice.status, invoice.due_date, today);
        writer.write_record([
            invoice.invoice_number.as_str(),
            invoice.client_name.as_str(),
            &invoice.issue_date.format("%Y-%m-%d").to_string(),
            &invoice
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            &format!("{:.2}", invoice.subtotal),
            &format!("{:.2}", invoice.vat_amount),
            &format!("{:.2}", invoice.total_amount),
            status.as_str(),
            &invoice
                .payment_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Suggested download filename for a revenue export.
#[must_use]
pub fn revenue_csv_filename(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "revenue_report_{}_to_{}.csv",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceStatus;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_header_matches_expected_columns() {
        let csv = revenue_csv(&[], day(2026, 3, 1)).unwrap();
        assert_eq!(
            csv.lines().next().unwrap(),
            "Invoice Number,Client,Issue Date,Due Date,Subtotal (SAR),VAT (SAR),Total (SAR),Status,Payment Date"
        );
    }

    #[test]
    fn test_row_formatting() {
        let rows = vec![InvoiceRow {
            invoice_number: "INV-000001".to_string(),
            client_name: "Al Noor Trading".to_string(),
            issue_date: day(2026, 2, 1),
            due_date: Some(day(2026, 2, 15)),
            subtotal: dec!(1000.00),
            vat_amount: dec!(150.00),
            total_amount: dec!(1150.00),
            status: InvoiceStatus::Paid,
            payment_date: Some(day(2026, 2, 10)),
        }];
        let csv = revenue_csv(&rows, day(2026, 3, 1)).unwrap();
        let record = csv.lines().nth(1).unwrap();
        assert_eq!(
            record,
            "INV-000001,Al Noor Trading,2026-02-01,2026-02-15,1000.00,150.00,1150.00,paid,2026-02-10"
        );
    }

    #[test]
    fn test_missing_dates_are_blank_and_lapsed_unpaid_reports_overdue() {
        let rows = vec![InvoiceRow {
            invoice_number: "INV-000002".to_string(),
            client_name: "Desert Rose LLC".to_string(),
            issue_date: day(2026, 1, 1),
            due_date: Some(day(2026, 1, 31)),
            subtotal: dec!(500.00),
            vat_amount: dec!(75.00),
            total_amount: dec!(575.00),
            status: InvoiceStatus::Unpaid,
            payment_date: None,
        }];
        let csv = revenue_csv(&rows, day(2026, 3, 1)).unwrap();
        let record = csv.lines().nth(1).unwrap();
        assert!(record.ends_with(",overdue,"));
    }

    #[test]
    fn test_many_rows_flush_cleanly() {
        let rows: Vec<InvoiceRow> = (1..=50)
            .map(|n| InvoiceRow {
                invoice_number: format!("INV-{n:06}"),
                client_name: format!("Client {n}"),
                issue_date: day(2026, 1, 1),
                due_date: None,
                subtotal: dec!(100.00),
                vat_amount: dec!(15.00),
                total_amount: dec!(115.00),
                status: InvoiceStatus::Unpaid,
                payment_date: None,
            })
            .collect();
        let csv = revenue_csv(&rows, day(2026, 1, 2)).unwrap();
        assert_eq!(csv.lines().count(), 51);
    }

    #[test]
    fn test_filename() {
        assert_eq!(
            revenue_csv_filename(day(2026, 3, 1), day(2026, 3, 31)),
            "revenue_report_2026-03-01_to_2026-03-31.csv"
        );
    }
}
