//! Dashboard headline counters.
//!
//! Like the reports, these are pure reductions over rows the repositories
//! materialize. The recency lists shown next to the counters (recent
//! invoices, upcoming tasks) are assembled at the query layer.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::invoice::{InvoiceStatus, effective_status};
use crate::reports::{InvoiceRow, TaskRow};
use crate::task::TaskStatus;

/// The counters shown at the top of the dashboard.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_clients: u64,
    pub total_invoices: u64,
    /// Totals of paid invoices issued in the current calendar month.
    pub monthly_revenue: Decimal,
    /// Tasks still pending or in progress.
    pub pending_tasks: u64,
    /// Invoices overdue by effective status as of today.
    pub overdue_invoices: u64,
    /// Sum of totals across all invoices not yet paid.
    pub unpaid_amount: Decimal,
}

/// Computes the dashboard counters as of `today`.
///
/// Rows arrive already narrowed to the caller's scope, so a Client-role
/// user's dashboard only ever counts their own records.
#[must_use]
pub fn summarize(
    invoices: &[InvoiceRow],
    tasks: &[TaskRow],
    total_clients: u64,
    today: NaiveDate,
) -> DashboardStats {
    let month_start = today.with_day(1).unwrap_or(today);

    let mut monthly_revenue = Decimal::ZERO;
    let mut unpaid_amount = Decimal::ZERO;
    let mut overdue_invoices = 0u64;
    for invoice in invoices {
        match invoice.status {
            InvoiceStatus::Paid => {
                if invoice.issue_date >= month_start {
                    monthly_revenue += invoice.total_amount;
                }
            }
            InvoiceStatus::Unpaid | InvoiceStatus::Overdue => {
                unpaid_amount += invoice.total_amount;
            }
        }
        if effective_status(invoice.status, invoice.due_date, today) == InvoiceStatus::Overdue {
            overdue_invoices += 1;
        }
    }

    let pending_tasks = tasks
        .iter()
        .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress))
        .count() as u64;

    DashboardStats {
        total_clients,
        total_invoices: invoices.len() as u64,
        monthly_revenue,
        pending_tasks,
        overdue_invoices,
        unpaid_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(
        status: InvoiceStatus,
        issue: NaiveDate,
        due: Option<NaiveDate>,
        total: Decimal,
    ) -> InvoiceRow {
        InvoiceRow {
            invoice_number: "INV-000001".to_string(),
            client_name: String::new(),
            issue_date: issue,
            due_date: due,
            subtotal: total,
            vat_amount: Decimal::ZERO,
            total_amount: total,
            status,
            payment_date: None,
        }
    }

    fn task(status: TaskStatus) -> TaskRow {
        TaskRow {
            status,
            due_date: None,
            task_type: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_monthly_revenue_counts_only_paid_in_current_month() {
        let today = day(2026, 8, 23);
        let rows = vec![
            invoice(InvoiceStatus::Paid, day(2026, 8, 5), None, dec!(1150.00)),
            // Paid, but issued last month.
            invoice(InvoiceStatus::Paid, day(2026, 7, 30), None, dec!(575.00)),
            // Issued this month, not paid.
            invoice(InvoiceStatus::Unpaid, day(2026, 8, 10), None, dec!(230.00)),
        ];
        let stats = summarize(&rows, &[], 3, today);
        assert_eq!(stats.monthly_revenue, dec!(1150.00));
        assert_eq!(stats.total_invoices, 3);
        assert_eq!(stats.total_clients, 3);
    }

    #[test]
    fn test_unpaid_amount_spans_all_periods() {
        let today = day(2026, 8, 23);
        let rows = vec![
            invoice(InvoiceStatus::Unpaid, day(2026, 3, 1), None, dec!(100.00)),
            invoice(InvoiceStatus::Overdue, day(2026, 4, 1), None, dec!(200.00)),
            invoice(InvoiceStatus::Paid, day(2026, 5, 1), None, dec!(400.00)),
        ];
        let stats = summarize(&rows, &[], 1, today);
        assert_eq!(stats.unpaid_amount, dec!(300.00));
    }

    #[test]
    fn test_overdue_is_derived_from_due_date() {
        let today = day(2026, 8, 23);
        let rows = vec![
            // Stored unpaid, due date lapsed: counts as overdue.
            invoice(
                InvoiceStatus::Unpaid,
                day(2026, 7, 1),
                Some(day(2026, 7, 31)),
                dec!(100.00),
            ),
            // Due in the future.
            invoice(
                InvoiceStatus::Unpaid,
                day(2026, 8, 1),
                Some(day(2026, 9, 30)),
                dec!(100.00),
            ),
            // Paid never reports overdue, even lapsed.
            invoice(
                InvoiceStatus::Paid,
                day(2026, 6, 1),
                Some(day(2026, 6, 30)),
                dec!(100.00),
            ),
        ];
        let stats = summarize(&rows, &[], 1, today);
        assert_eq!(stats.overdue_invoices, 1);
    }

    #[test]
    fn test_pending_tasks_exclude_completed() {
        let tasks = vec![
            task(TaskStatus::Pending),
            task(TaskStatus::InProgress),
            task(TaskStatus::Completed),
        ];
        let stats = summarize(&[], &tasks, 0, day(2026, 8, 23));
        assert_eq!(stats.pending_tasks, 2);
    }

    #[test]
    fn test_empty_scope_yields_zeroes() {
        let stats = summarize(&[], &[], 0, day(2026, 8, 23));
        assert_eq!(stats.total_invoices, 0);
        assert_eq!(stats.monthly_revenue, Decimal::ZERO);
        assert_eq!(stats.unpaid_amount, Decimal::ZERO);
        assert_eq!(stats.overdue_invoices, 0);
        assert_eq!(stats.pending_tasks, 0);
    }
}
