//! Report input rows and output shapes.
//!
//! Inputs are materialized rows handed over by the repositories; reports
//! never touch the database themselves.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::invoice::InvoiceStatus;
use crate::task::TaskStatus;

/// An invoice row as the revenue report consumes it.
#[derive(Debug, Clone)]
pub struct InvoiceRow {
    pub invoice_number: String,
    pub client_name: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
    pub payment_date: Option<NaiveDate>,
}

/// Revenue summed for one calendar month.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MonthlyRevenue {
    /// Month key in `YYYY-MM` form.
    pub month: String,
    pub paid_total: Decimal,
    pub invoice_count: u64,
}

/// Revenue summed for one client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClientRevenue {
    pub client_name: String,
    pub paid_total: Decimal,
    pub outstanding_total: Decimal,
    pub invoice_count: u64,
}

/// The revenue report.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Sum of totals of paid invoices.
    pub total_paid: Decimal,
    /// Sum of totals of unpaid and overdue invoices.
    pub total_outstanding: Decimal,
    /// VAT collected on paid invoices.
    pub vat_collected: Decimal,
    pub paid_count: u64,
    pub unpaid_count: u64,
    /// Overdue by effective status: stored overdue plus lapsed unpaid.
    pub overdue_count: u64,
    pub by_month: Vec<MonthlyRevenue>,
    pub by_client: Vec<ClientRevenue>,
}

/// A VAT filing row as the VAT report consumes it.
#[derive(Debug, Clone)]
pub struct VatFilingRow {
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub output_vat: Decimal,
    pub input_vat: Decimal,
    pub net_vat: Decimal,
}

/// The VAT report: totals over a period's filings.
#[derive(Debug, Clone, Serialize)]
pub struct VatReport {
    pub filing_count: u64,
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub total_output_vat: Decimal,
    pub total_input_vat: Decimal,
    pub total_net_vat: Decimal,
}

/// A Zakat declaration row as the Zakat report consumes it.
#[derive(Debug, Clone)]
pub struct ZakatFilingRow {
    pub hijri_year: String,
    pub total_assets: Decimal,
    pub liabilities: Decimal,
    pub net_wealth: Decimal,
    pub zakat_due: Decimal,
}

/// Zakat figures summed for one Hijri year.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ZakatYearSummary {
    pub hijri_year: String,
    pub total_assets: Decimal,
    pub liabilities: Decimal,
    pub net_wealth: Decimal,
    pub zakat_due: Decimal,
    pub filing_count: u64,
}

/// The Zakat report.
#[derive(Debug, Clone, Serialize)]
pub struct ZakatReport {
    pub by_year: Vec<ZakatYearSummary>,
    pub total_zakat_due: Decimal,
}

/// A task row as the task report consumes it.
#[derive(Debug, Clone)]
pub struct TaskRow {
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub task_type: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Task counts broken down by type.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskTypeCount {
    pub task_type: String,
    pub count: u64,
}

/// The task workload report.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    /// Open tasks whose due date has passed.
    pub overdue: u64,
    pub by_type: Vec<TaskTypeCount>,
}
