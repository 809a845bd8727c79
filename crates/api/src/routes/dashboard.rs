//! Dashboard route: headline counters plus recency lists.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;

use crate::{AppState, error::ApiResult, middleware::auth::AuthUser};
use muhasib_core::dashboard::{self, DashboardStats};
use muhasib_core::reports::TaskRow;
use muhasib_db::entities::{sea_orm_active_enums::TaskStatus, tasks};
use muhasib_db::repositories::{InvoiceFilter, TaskFilter};
use muhasib_db::{ClientRepository, InvoiceRepository, TaskRepository};

use super::invoices::InvoiceResponse;
use super::reports::invoice_row;

const RECENT_LIMIT: usize = 5;

/// Creates the dashboard route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(summary))
}

/// The dashboard payload: counters plus the five most recent invoices
/// and the five nearest open tasks.
#[derive(Debug, Serialize)]
struct DashboardResponse {
    stats: DashboardStats,
    recent_invoices: Vec<InvoiceResponse>,
    upcoming_tasks: Vec<tasks::Model>,
}

/// GET /dashboard - Summary over the caller's visible records.
async fn summary(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<DashboardResponse>> {
    let today = Utc::now().date_naive();
    let scope = principal.client_scope();

    let total_clients = ClientRepository::new((*state.db).clone())
        .count(scope)
        .await?;

    let invoice_repo = InvoiceRepository::new((*state.db).clone());
    let mut invoices = invoice_repo
        .list_all(scope, &InvoiceFilter::default())
        .await?;

    let task_repo = TaskRepository::new((*state.db).clone());
    let visible_tasks = task_repo.list(&principal, &TaskFilter::default()).await?;

    let invoice_rows: Vec<_> = invoices
        .iter()
        .map(|(inv, client)| invoice_row((inv.clone(), client.clone())))
        .collect();
    let task_rows: Vec<TaskRow> = visible_tasks
        .iter()
        .map(|t| TaskRow {
            status: t.status.into(),
            due_date: t.due_date,
            task_type: t.task_type.clone(),
            completed_at: t.completed_at.map(Into::into),
        })
        .collect();

    let stats = dashboard::summarize(&invoice_rows, &task_rows, total_clients, today);

    invoices.sort_by(|(a, _), (b, _)| b.created_at.cmp(&a.created_at));
    let recent_invoices = invoices
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|(inv, client)| InvoiceResponse::new(inv, client.as_ref()))
        .collect();

    let mut open_tasks: Vec<tasks::Model> = visible_tasks
        .into_iter()
        .filter(|t| {
            matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress)
                && t.due_date.is_some_and(|due| due >= today)
        })
        .collect();
    open_tasks.sort_by_key(|t| t.due_date);
    open_tasks.truncate(RECENT_LIMIT);

    Ok(Json(DashboardResponse {
        stats,
        recent_invoices,
        upcoming_tasks: open_tasks,
    }))
}
