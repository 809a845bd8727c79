//! Revenue, VAT, Zakat, and task reporting.
//!
//! Reports are pure reductions over rows the repositories materialize.
//! PDF rendering stays outside this crate; CSV export lives here.

mod export;
mod service;
mod types;

pub use export::{ExportError, revenue_csv, revenue_csv_filename};
pub use service::ReportService;
pub use types::{
    ClientRevenue, InvoiceRow, MonthlyRevenue, RevenueReport, TaskReport, TaskRow, TaskTypeCount,
    VatFilingRow, VatReport, ZakatFilingRow, ZakatReport, ZakatYearSummary,
};
