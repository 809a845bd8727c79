//! Report generation service.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::invoice::{InvoiceStatus, effective_status};
use crate::task::TaskStatus;

use super::types::{
    ClientRevenue, InvoiceRow, MonthlyRevenue, RevenueReport, TaskReport, TaskRow, TaskTypeCount,
    VatFilingRow, VatReport, ZakatFilingRow, ZakatReport, ZakatYearSummary,
};

/// Service for generating financial and workload reports.
pub struct ReportService;

impl ReportService {
    /// Generates the revenue report from invoice rows.
    ///
    /// Overdue counting uses the effective status, so an unpaid invoice
    /// whose due date lies before `today` counts as overdue even when the
    /// stored status still says unpaid.
    #[must_use]
    pub fn revenue(
        invoices: &[InvoiceRow],
        period_start: NaiveDate,
        period_end: NaiveDate,
        today: NaiveDate,
    ) -> RevenueReport {
        let mut total_paid = Decimal::ZERO;
        let mut total_outstanding = Decimal::ZERO;
        let mut vat_collected = Decimal::ZERO;
        let mut paid_count = 0u64;
        let mut unpaid_count = 0u64;
        let mut overdue_count = 0u64;

        let mut months: BTreeMap<String, MonthlyRevenue> = BTreeMap::new();
        let mut clients: BTreeMap<String, ClientRevenue> = BTreeMap::new();

        for invoice in invoices {
            let status = effective_status(invoice.status, invoice.due_date, today);

            let client = clients
                .entry(invoice.client_name.clone())
                .or_insert_with(|| ClientRevenue {
                    client_name: invoice.client_name.clone(),
                    paid_total: Decimal::ZERO,
                    outstanding_total: Decimal::ZERO,
                    invoice_count: 0,
                });
            client.invoice_count += 1;

            match status {
                InvoiceStatus::Paid => {
                    total_paid += invoice.total_amount;
                    vat_collected += invoice.vat_amount;
                    paid_count += 1;
                    client.paid_total += invoice.total_amount;

                    let key = invoice.issue_date.format("%Y-%m").to_string();
                    let month = months.entry(key.clone()).or_insert_with(|| MonthlyRevenue {
                        month: key,
                        paid_total: Decimal::ZERO,
                        invoice_count: 0,
                    });
                    month.paid_total += invoice.total_amount;
                    month.invoice_count += 1;
                }
                InvoiceStatus::Unpaid => {
                    total_outstanding += invoice.total_amount;
                    unpaid_count += 1;
                    client.outstanding_total += invoice.total_amount;
                }
                InvoiceStatus::Overdue => {
                    total_outstanding += invoice.total_amount;
                    overdue_count += 1;
                    client.outstanding_total += invoice.total_amount;
                }
            }
        }

        RevenueReport {
            period_start,
            period_end,
            total_paid,
            total_outstanding,
            vat_collected,
            paid_count,
            unpaid_count,
            overdue_count,
            by_month: months.into_values().collect(),
            by_client: clients.into_values().collect(),
        }
    }

    /// Totals VAT filings over a period.
    #[must_use]
    pub fn vat(filings: &[VatFilingRow]) -> VatReport {
        VatReport {
            filing_count: filings.len() as u64,
            total_sales: filings.iter().map(|f| f.total_sales).sum(),
            total_purchases: filings.iter().map(|f| f.total_purchases).sum(),
            total_output_vat: filings.iter().map(|f| f.output_vat).sum(),
            total_input_vat: filings.iter().map(|f| f.input_vat).sum(),
            total_net_vat: filings.iter().map(|f| f.net_vat).sum(),
        }
    }

    /// Totals Zakat declarations per Hijri year.
    #[must_use]
    pub fn zakat(filings: &[ZakatFilingRow]) -> ZakatReport {
        let mut years: BTreeMap<String, ZakatYearSummary> = BTreeMap::new();
        let mut total_zakat_due = Decimal::ZERO;

        for filing in filings {
            total_zakat_due += filing.zakat_due;
            let year = years
                .entry(filing.hijri_year.clone())
                .or_insert_with(|| ZakatYearSummary {
                    hijri_year: filing.hijri_year.clone(),
                    total_assets: Decimal::ZERO,
                    liabilities: Decimal::ZERO,
                    net_wealth: Decimal::ZERO,
                    zakat_due: Decimal::ZERO,
                    filing_count: 0,
                });
            year.total_assets += filing.total_assets;
            year.liabilities += filing.liabilities;
            year.net_wealth += filing.net_wealth;
            year.zakat_due += filing.zakat_due;
            year.filing_count += 1;
        }

        ZakatReport {
            by_year: years.into_values().collect(),
            total_zakat_due,
        }
    }

    /// Counts tasks by status, lapsed due date, and type.
    #[must_use]
    pub fn tasks(tasks: &[TaskRow], today: NaiveDate) -> TaskReport {
        let mut pending = 0u64;
        let mut in_progress = 0u64;
        let mut completed = 0u64;
        let mut overdue = 0u64;
        let mut types: BTreeMap<String, u64> = BTreeMap::new();

        for task in tasks {
            match task.status {
                TaskStatus::Pending => pending += 1,
                TaskStatus::InProgress => in_progress += 1,
                TaskStatus::Completed => completed += 1,
            }
            if task.status != TaskStatus::Completed
                && task.due_date.is_some_and(|due| due < today)
            {
                overdue += 1;
            }
            let name = task.task_type.clone().unwrap_or_else(|| "General".to_string());
            *types.entry(name).or_insert(0) += 1;
        }

        TaskReport {
            pending,
            in_progress,
            completed,
            overdue,
            by_type: types
                .into_iter()
                .map(|(task_type, count)| TaskTypeCount { task_type, count })
                .collect(),
        }
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
        number: &str,
        client: &str,
        issued: NaiveDate,
        due: Option<NaiveDate>,
        total: Decimal,
        vat: Decimal,
        status: InvoiceStatus,
    ) -> InvoiceRow {
        InvoiceRow {
            invoice_number: number.to_string(),
            client_name: client.to_string(),
            issue_date: issued,
            due_date: due,
            subtotal: total - vat,
            vat_amount: vat,
            total_amount: total,
            status,
            payment_date: None,
        }
    }

    #[test]
    fn test_revenue_report_splits_paid_and_outstanding() {
        let today = day(2026, 3, 15);
        let rows = vec![
            invoice(
                "INV-000001",
                "Al Noor Trading",
                day(2026, 3, 1),
                None,
                dec!(1150.00),
                dec!(150.00),
                InvoiceStatus::Paid,
            ),
            invoice(
                "INV-000002",
                "Al Noor Trading",
                day(2026, 3, 5),
                Some(day(2026, 4, 1)),
                dec!(575.00),
                dec!(75.00),
                InvoiceStatus::Unpaid,
            ),
            // lapsed due date: stored unpaid, reports overdue
            invoice(
                "INV-000003",
                "Desert Rose LLC",
                day(2026, 2, 1),
                Some(day(2026, 3, 1)),
                dec!(230.00),
                dec!(30.00),
                InvoiceStatus::Unpaid,
            ),
        ];

        let report = ReportService::revenue(&rows, day(2026, 2, 1), day(2026, 3, 31), today);

        assert_eq!(report.total_paid, dec!(1150.00));
        assert_eq!(report.total_outstanding, dec!(805.00));
        assert_eq!(report.vat_collected, dec!(150.00));
        assert_eq!(report.paid_count, 1);
        assert_eq!(report.unpaid_count, 1);
        assert_eq!(report.overdue_count, 1);

        assert_eq!(report.by_month.len(), 1);
        assert_eq!(report.by_month[0].month, "2026-03");
        assert_eq!(report.by_month[0].paid_total, dec!(1150.00));

        assert_eq!(report.by_client.len(), 2);
        let al_noor = &report.by_client[0];
        assert_eq!(al_noor.client_name, "Al Noor Trading");
        assert_eq!(al_noor.paid_total, dec!(1150.00));
        assert_eq!(al_noor.outstanding_total, dec!(575.00));
    }

    #[test]
    fn test_revenue_report_empty() {
        let report =
            ReportService::revenue(&[], day(2026, 3, 1), day(2026, 3, 31), day(2026, 3, 31));
        assert_eq!(report.total_paid, dec!(0));
        assert_eq!(report.overdue_count, 0);
        assert!(report.by_month.is_empty());
        assert!(report.by_client.is_empty());
    }

    #[test]
    fn test_vat_report_totals() {
        let rows = vec![
            VatFilingRow {
                total_sales: dec!(10000),
                total_purchases: dec!(4000),
                output_vat: dec!(1500),
                input_vat: dec!(600),
                net_vat: dec!(900),
            },
            VatFilingRow {
                total_sales: dec!(5000),
                total_purchases: dec!(1000),
                output_vat: dec!(750),
                input_vat: dec!(150),
                net_vat: dec!(600),
            },
        ];
        let report = ReportService::vat(&rows);
        assert_eq!(report.filing_count, 2);
        assert_eq!(report.total_sales, dec!(15000));
        assert_eq!(report.total_output_vat, dec!(2250));
        assert_eq!(report.total_net_vat, dec!(1500));
    }

    #[test]
    fn test_zakat_report_groups_by_year() {
        let rows = vec![
            ZakatFilingRow {
                hijri_year: "1447H".to_string(),
                total_assets: dec!(100000),
                liabilities: dec!(10000),
                net_wealth: dec!(90000),
                zakat_due: dec!(2250.00),
            },
            ZakatFilingRow {
                hijri_year: "1447H".to_string(),
                total_assets: dec!(60000),
                liabilities: dec!(0),
                net_wealth: dec!(60000),
                zakat_due: dec!(1500.00),
            },
            ZakatFilingRow {
                hijri_year: "1446H".to_string(),
                total_assets: dec!(40000),
                liabilities: dec!(0),
                net_wealth: dec!(40000),
                zakat_due: dec!(0),
            },
        ];
        let report = ReportService::zakat(&rows);
        assert_eq!(report.total_zakat_due, dec!(3750.00));
        assert_eq!(report.by_year.len(), 2);
        let y1447 = report
            .by_year
            .iter()
            .find(|y| y.hijri_year == "1447H")
            .unwrap();
        assert_eq!(y1447.filing_count, 2);
        assert_eq!(y1447.zakat_due, dec!(3750.00));
    }

    #[test]
    fn test_task_report_counts() {
        let today = day(2026, 3, 15);
        let rows = vec![
            TaskRow {
                status: TaskStatus::Pending,
                due_date: Some(day(2026, 3, 1)),
                task_type: Some("VAT Filing".to_string()),
                completed_at: None,
            },
            TaskRow {
                status: TaskStatus::InProgress,
                due_date: Some(day(2026, 4, 1)),
                task_type: None,
                completed_at: None,
            },
            // lapsed but completed, not overdue
            TaskRow {
                status: TaskStatus::Completed,
                due_date: Some(day(2026, 3, 1)),
                task_type: Some("Zakat Filing".to_string()),
                completed_at: None,
            },
        ];
        let report = ReportService::tasks(&rows, today);
        assert_eq!(report.pending, 1);
        assert_eq!(report.in_progress, 1);
        assert_eq!(report.completed, 1);
        assert_eq!(report.overdue, 1);
        assert_eq!(
            report.by_type,
            vec![
                TaskTypeCount {
                    task_type: "General".to_string(),
                    count: 1
                },
                TaskTypeCount {
                    task_type: "VAT Filing".to_string(),
                    count: 1
                },
                TaskTypeCount {
                    task_type: "Zakat Filing".to_string(),
                    count: 1
                },
            ]
        );
    }
}
