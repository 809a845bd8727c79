//! Reporting routes: revenue, VAT, Zakat, tasks, and CSV export.
//!
//! Handlers materialize rows through the repositories and hand them to
//! the report reducers; all scoping happens at the query layer.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::Deserialize;

use crate::{
    AppState,
    error::{ApiError, ApiResult, validation},
    middleware::auth::AuthUser,
};
use muhasib_core::reports::{
    InvoiceRow, ReportService, RevenueReport, TaskReport, TaskRow, VatFilingRow, VatReport,
    ZakatFilingRow, ZakatReport, revenue_csv, revenue_csv_filename,
};
use muhasib_db::{FilingRepository, InvoiceRepository, TaskRepository};
use muhasib_db::entities::{clients, invoices};
use muhasib_db::repositories::{InvoiceFilter, TaskFilter};
use muhasib_shared::AppError;

/// Creates reporting routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/revenue", get(revenue_report))
        .route("/reports/revenue/export", get(revenue_export))
        .route("/reports/vat", get(vat_report))
        .route("/reports/zakat", get(zakat_report))
        .route("/reports/tasks", get(task_report))
}

/// Period selection for the revenue report. Defaults to the current
/// calendar month.
#[derive(Debug, Deserialize)]
struct PeriodQuery {
    period_start: Option<NaiveDate>,
    period_end: Option<NaiveDate>,
}

impl PeriodQuery {
    fn resolve(&self, today: NaiveDate) -> ApiResult<(NaiveDate, NaiveDate)> {
        let start = self
            .period_start
            .or_else(|| today.with_day(1))
            .ok_or_else(|| validation("invalid period start"))?;
        let end = self
            .period_end
            .or_else(|| last_day_of_month(today))
            .ok_or_else(|| validation("invalid period end"))?;
        if end < start {
            return Err(validation("period end must not precede period start"));
        }
        Ok((start, end))
    }
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    let next_month = if first.month() == 12 {
        first.with_year(first.year() + 1)?.with_month(1)?
    } else {
        first.with_month(first.month() + 1)?
    };
    next_month.checked_sub_days(Days::new(1))
}

pub(crate) fn invoice_row(
    (invoice, client): (invoices::Model, Option<clients::Model>),
) -> InvoiceRow {
    InvoiceRow {
        invoice_number: invoice.invoice_number,
        client_name: client.map_or_else(String::new, |c| c.name),
        issue_date: invoice.issue_date,
        due_date: invoice.due_date,
        subtotal: invoice.subtotal,
        vat_amount: invoice.vat_amount,
        total_amount: invoice.total_amount,
        status: invoice.status.into(),
        payment_date: invoice.payment_date,
    }
}

async fn period_invoices(
    state: &AppState,
    principal: &muhasib_core::access::Principal,
    start: NaiveDate,
    end: NaiveDate,
) -> ApiResult<Vec<InvoiceRow>> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let filter = InvoiceFilter {
        issued_from: Some(start),
        issued_to: Some(end),
        ..InvoiceFilter::default()
    };
    let rows = repo.list_all(principal.client_scope(), &filter).await?;
    Ok(rows.into_iter().map(invoice_row).collect())
}

/// GET /reports/revenue - Revenue summary over the period.
async fn revenue_report(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<RevenueReport>> {
    let today = Utc::now().date_naive();
    let (start, end) = query.resolve(today)?;
    let rows = period_invoices(&state, &principal, start, end).await?;

    Ok(Json(ReportService::revenue(&rows, start, end, today)))
}

/// GET /reports/revenue/export - Revenue rows as a CSV attachment.
async fn revenue_export(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let (start, end) = query.resolve(today)?;
    let rows = period_invoices(&state, &principal, start, end).await?;

    let csv = revenue_csv(&rows, today)
        .map_err(|e| ApiError(AppError::Internal(e.to_string())))?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                revenue_csv_filename(start, end)
            ),
        ),
    ];
    Ok((headers, csv))
}

/// GET /reports/vat - Totals over the caller's visible VAT returns.
async fn vat_report(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<VatReport>> {
    let repo = FilingRepository::new((*state.db).clone());
    let rows: Vec<VatFilingRow> = repo
        .list_vat(principal.client_scope())
        .await?
        .into_iter()
        .map(|f| VatFilingRow {
            total_sales: f.total_sales,
            total_purchases: f.total_purchases,
            output_vat: f.output_vat,
            input_vat: f.input_vat,
            net_vat: f.net_vat,
        })
        .collect();

    Ok(Json(ReportService::vat(&rows)))
}

/// GET /reports/zakat - Zakat declarations grouped by Hijri year.
async fn zakat_report(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<ZakatReport>> {
    let repo = FilingRepository::new((*state.db).clone());
    let rows: Vec<ZakatFilingRow> = repo
        .list_zakat(principal.client_scope())
        .await?
        .into_iter()
        .map(|f| ZakatFilingRow {
            hijri_year: f.hijri_year,
            total_assets: f.total_assets,
            liabilities: f.liabilities,
            net_wealth: f.net_wealth,
            zakat_due: f.zakat_due,
        })
        .collect();

    Ok(Json(ReportService::zakat(&rows)))
}

/// GET /reports/tasks - Workload counts over the caller's visible tasks.
async fn task_report(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<TaskReport>> {
    let repo = TaskRepository::new((*state.db).clone());
    let rows: Vec<TaskRow> = repo
        .list(&principal, &TaskFilter::default())
        .await?
        .into_iter()
        .map(|t| TaskRow {
            status: t.status.into(),
            due_date: t.due_date,
            task_type: t.task_type,
            completed_at: t.completed_at.map(Into::into),
        })
        .collect();

    Ok(Json(ReportService::tasks(&rows, Utc::now().date_naive())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        let d = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        assert_eq!(
            last_day_of_month(d),
            NaiveDate::from_ymd_opt(2026, 2, 28)
        );

        let december = NaiveDate::from_ymd_opt(2026, 12, 5).unwrap();
        assert_eq!(
            last_day_of_month(december),
            NaiveDate::from_ymd_opt(2026, 12, 31)
        );
    }

    #[test]
    fn test_period_defaults_to_current_month() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let query = PeriodQuery {
            period_start: None,
            period_end: None,
        };
        let (start, end) = query.resolve(today).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 8, 31).unwrap());
    }

    #[test]
    fn test_inverted_period_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let query = PeriodQuery {
            period_start: NaiveDate::from_ymd_opt(2026, 8, 10),
            period_end: NaiveDate::from_ymd_opt(2026, 8, 1),
        };
        assert!(query.resolve(today).is_err());
    }
}
