//! Invoice management routes: headers, line items, and attachments.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiResult, validation},
    middleware::auth::AuthUser,
    routes::clients::read_file_field,
};
use muhasib_core::access::{self, Resource};
use muhasib_core::invoice::{self, InvoiceStatus as CoreInvoiceStatus};
use muhasib_core::storage::UploadContext;
use muhasib_core::tax::saudi_vat_rate;
use muhasib_db::InvoiceRepository;
use muhasib_db::entities::{
    clients, invoice_attachments, invoice_items, invoices,
    sea_orm_active_enums::InvoiceStatus,
};
use muhasib_db::repositories::{AttachmentInput, InvoiceFilter, InvoiceInput, ItemInput};
use muhasib_shared::types::{PageRequest, PageResponse};

/// Creates invoice management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/suggest-number", get(suggest_number))
        .route(
            "/invoices/{id}",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/{id}/pay", post(mark_paid))
        .route("/invoices/{id}/items", get(list_items).post(add_item))
        .route(
            "/invoices/{id}/items/{item_id}",
            axum::routing::put(update_item).delete(delete_item),
        )
        .route(
            "/invoices/{id}/attachments",
            get(list_attachments).post(upload_attachment),
        )
        .route(
            "/invoices/{id}/attachments/{attachment_id}",
            delete(delete_attachment),
        )
        .route(
            "/invoices/{id}/attachments/{attachment_id}/download",
            get(download_attachment),
        )
}

/// Query parameters for the invoice list.
#[derive(Debug, Deserialize)]
struct ListInvoicesQuery {
    search: Option<String>,
    status: Option<InvoiceStatus>,
    client_id: Option<Uuid>,
    issued_from: Option<NaiveDate>,
    issued_to: Option<NaiveDate>,
    #[serde(flatten)]
    page: PageRequest,
}

/// Request body for creating or updating an invoice.
#[derive(Debug, Deserialize)]
struct InvoiceRequest {
    invoice_number: String,
    client_id: Uuid,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    description: Option<String>,
    #[serde(default)]
    subtotal: Decimal,
    vat_rate: Option<Decimal>,
    #[serde(default = "default_invoice_status")]
    status: InvoiceStatus,
    notes: Option<String>,
    #[serde(default)]
    items: Vec<ItemRequest>,
}

fn default_invoice_status() -> InvoiceStatus {
    InvoiceStatus::Unpaid
}

/// Request body for a line item.
#[derive(Debug, Deserialize)]
struct ItemRequest {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
}

impl From<ItemRequest> for ItemInput {
    fn from(r: ItemRequest) -> Self {
        Self {
            description: r.description,
            quantity: r.quantity,
            unit_price: r.unit_price,
        }
    }
}

/// Request body for marking an invoice paid.
#[derive(Debug, Deserialize, Default)]
struct MarkPaidRequest {
    payment_date: Option<NaiveDate>,
}

/// Invoice enriched with its client name and the due-date-aware status.
///
/// `overdue` is never trusted from storage; it is derived against today
/// on every read.
#[derive(Debug, Serialize)]
pub(crate) struct InvoiceResponse {
    #[serde(flatten)]
    invoice: invoices::Model,
    client_name: Option<String>,
    effective_status: &'static str,
}

impl InvoiceResponse {
    pub(crate) fn new(invoice: invoices::Model, client: Option<&clients::Model>) -> Self {
        let today = Utc::now().date_naive();
        let effective = invoice::effective_status(
            CoreInvoiceStatus::from(invoice.status),
            invoice.due_date,
            today,
        );
        Self {
            invoice,
            client_name: client.map(|c| c.name.clone()),
            effective_status: effective.as_str(),
        }
    }
}

fn invoice_input(payload: InvoiceRequest) -> ApiResult<(InvoiceInput, Vec<ItemInput>)> {
    if payload.invoice_number.trim().is_empty() {
        return Err(validation("invoice number is required"));
    }

    let items = payload.items.into_iter().map(Into::into).collect();
    let input = InvoiceInput {
        invoice_number: payload.invoice_number,
        client_id: payload.client_id,
        issue_date: payload.issue_date,
        due_date: payload.due_date,
        description: payload.description,
        subtotal: payload.subtotal,
        vat_rate: payload.vat_rate.unwrap_or_else(saudi_vat_rate),
        status: payload.status,
        notes: payload.notes,
    };
    Ok((input, items))
}

/// GET /invoices - List invoices in the caller's scope.
async fn list_invoices(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(query): Query<ListInvoicesQuery>,
) -> ApiResult<Json<PageResponse<InvoiceResponse>>> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let filter = InvoiceFilter {
        search: query.search,
        status: query.status,
        client_id: query.client_id,
        issued_from: query.issued_from,
        issued_to: query.issued_to,
    };
    let (rows, total) = repo
        .list(principal.client_scope(), &filter, query.page)
        .await?;

    let data = rows
        .into_iter()
        .map(|(inv, client)| InvoiceResponse::new(inv, client.as_ref()))
        .collect();

    Ok(Json(PageResponse::new(
        data,
        query.page.page,
        query.page.per_page,
        total,
    )))
}

/// GET /invoices/suggest-number - Next free invoice number. Staff only.
async fn suggest_number(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    access::ensure(access::can_mutate(&principal, Resource::Invoices))?;

    let repo = InvoiceRepository::new((*state.db).clone());
    let number = repo.suggest_number().await?;
    Ok(Json(serde_json::json!({ "invoice_number": number })))
}

/// GET /invoices/{id} - Fetch one invoice, scope-checked.
async fn get_invoice(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InvoiceResponse>> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = repo.get(principal.client_scope(), id).await?;
    Ok(Json(InvoiceResponse::new(invoice, None)))
}

/// POST /invoices - Create an invoice with optional items. Staff only.
async fn create_invoice(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<InvoiceRequest>,
) -> ApiResult<(StatusCode, Json<InvoiceResponse>)> {
    access::ensure(access::can_mutate(&principal, Resource::Invoices))?;

    let (input, items) = invoice_input(payload)?;
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = repo.create(input, items, principal.user_id).await?;
    info!(invoice_id = %invoice.id, number = %invoice.invoice_number, "invoice created");

    Ok((StatusCode::CREATED, Json(InvoiceResponse::new(invoice, None))))
}

/// PUT /invoices/{id} - Update invoice header fields. Staff only.
async fn update_invoice(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoiceRequest>,
) -> ApiResult<Json<InvoiceResponse>> {
    access::ensure(access::can_mutate(&principal, Resource::Invoices))?;

    let (input, _) = invoice_input(payload)?;
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = repo.update(id, input).await?;
    Ok(Json(InvoiceResponse::new(invoice, None)))
}

/// DELETE /invoices/{id} - Delete an invoice. Staff only.
async fn delete_invoice(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    access::ensure(access::can_mutate(&principal, Resource::Invoices))?;

    let repo = InvoiceRepository::new((*state.db).clone());
    let paths = repo.delete(id).await?;
    info!(invoice_id = %id, attachments = paths.len(), "invoice deleted");

    for path in paths {
        if let Err(e) = state.storage.delete(&path).await {
            warn!(error = %e, path = %path, "failed to remove stored attachment");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /invoices/{id}/pay - Mark an invoice paid. Staff only.
///
/// Defaults the payment date to today when the body omits it.
async fn mark_paid(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<MarkPaidRequest>>,
) -> ApiResult<Json<InvoiceResponse>> {
    access::ensure(access::can_mutate(&principal, Resource::Invoices))?;

    let payment_date = payload
        .and_then(|Json(p)| p.payment_date)
        .unwrap_or_else(|| Utc::now().date_naive());

    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = repo.mark_paid(id, payment_date).await?;
    info!(invoice_id = %id, %payment_date, "invoice marked paid");

    Ok(Json(InvoiceResponse::new(invoice, None)))
}

/// GET /invoices/{id}/items - List line items.
async fn list_items(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<invoice_items::Model>>> {
    let repo = InvoiceRepository::new((*state.db).clone());
    repo.get(principal.client_scope(), id).await?;

    Ok(Json(repo.list_items(id).await?))
}

/// POST /invoices/{id}/items - Add a line item. Staff only.
///
/// Returns the recalculated invoice.
async fn add_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemRequest>,
) -> ApiResult<(StatusCode, Json<InvoiceResponse>)> {
    access::ensure(access::can_mutate(&principal, Resource::Invoices))?;

    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = repo.add_item(id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse::new(invoice, None))))
}

/// PUT /invoices/{id}/items/{item_id} - Update a line item. Staff only.
async fn update_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ItemRequest>,
) -> ApiResult<Json<InvoiceResponse>> {
    access::ensure(access::can_mutate(&principal, Resource::Invoices))?;

    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = repo.update_item(id, item_id, payload.into()).await?;
    Ok(Json(InvoiceResponse::new(invoice, None)))
}

/// DELETE /invoices/{id}/items/{item_id} - Remove a line item. Staff only.
async fn delete_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<InvoiceResponse>> {
    access::ensure(access::can_mutate(&principal, Resource::Invoices))?;

    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = repo.delete_item(id, item_id).await?;
    Ok(Json(InvoiceResponse::new(invoice, None)))
}

/// GET /invoices/{id}/attachments - List attachments.
async fn list_attachments(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<invoice_attachments::Model>>> {
    let repo = InvoiceRepository::new((*state.db).clone());
    repo.get(principal.client_scope(), id).await?;

    Ok(Json(repo.list_attachments(id).await?))
}

/// POST /invoices/{id}/attachments - Upload an attachment. Staff only.
async fn upload_attachment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<invoice_attachments::Model>)> {
    access::ensure(access::can_mutate(&principal, Resource::Invoices))?;

    let repo = InvoiceRepository::new((*state.db).clone());
    repo.get(principal.client_scope(), id).await?;

    let (original_name, content) = read_file_field(&mut multipart).await?;
    let size = i64::try_from(content.len()).unwrap_or(i64::MAX);

    let stored = state
        .storage
        .save(
            UploadContext::Documents,
            &format!("invoices/{id}"),
            &original_name,
            content,
        )
        .await?;

    let attachment = repo
        .add_attachment(
            id,
            AttachmentInput {
                original_name: stored.original_name,
                stored_name: stored.stored_name,
                file_path: stored.path.clone(),
                file_size: size,
                uploaded_by: principal.user_id,
            },
        )
        .await;

    let attachment = match attachment {
        Ok(a) => a,
        Err(e) => {
            // The row failed; drop the orphaned file before surfacing.
            if let Err(cleanup) = state.storage.delete(&stored.path).await {
                warn!(error = %cleanup, path = %stored.path, "orphaned upload left behind");
            }
            return Err(e.into());
        }
    };

    info!(invoice_id = %id, attachment_id = %attachment.id, "attachment uploaded");
    Ok((StatusCode::CREATED, Json(attachment)))
}

/// GET /invoices/{id}/attachments/{attachment_id}/download - Stream an
/// attachment back with its original name.
async fn download_attachment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((id, attachment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let repo = InvoiceRepository::new((*state.db).clone());
    repo.get(principal.client_scope(), id).await?;

    let attachment = repo
        .list_attachments(id)
        .await?
        .into_iter()
        .find(|a| a.id == attachment_id)
        .ok_or_else(|| {
            crate::error::ApiError(muhasib_shared::AppError::NotFound(format!(
                "attachment not found: {attachment_id}"
            )))
        })?;

    let content = state.storage.read(&attachment.file_path).await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment.original_name),
        ),
    ];

    Ok((headers, content))
}

/// DELETE /invoices/{id}/attachments/{attachment_id} - Remove an
/// attachment. Staff only.
async fn delete_attachment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((id, attachment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    access::ensure(access::can_mutate(&principal, Resource::Invoices))?;

    let repo = InvoiceRepository::new((*state.db).clone());
    let path = repo.delete_attachment(id, attachment_id).await?;

    if let Err(e) = state.storage.delete(&path).await {
        warn!(error = %e, path = %path, "failed to remove stored attachment");
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn request(number: &str, vat_rate: Option<Decimal>) -> InvoiceRequest {
        InvoiceRequest {
            invoice_number: number.to_string(),
            client_id: Uuid::new_v4(),
            issue_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            due_date: None,
            description: None,
            subtotal: dec!(1000),
            vat_rate,
            status: InvoiceStatus::Unpaid,
            notes: None,
            items: Vec::new(),
        }
    }

    #[test]
    fn test_vat_rate_defaults_to_statutory() {
        let (input, _) = invoice_input(request("INV-000001", None)).unwrap();
        assert_eq!(input.vat_rate, dec!(15.00));
    }

    #[test]
    fn test_explicit_vat_rate_kept() {
        let (input, _) = invoice_input(request("INV-000002", Some(dec!(5.00)))).unwrap();
        assert_eq!(input.vat_rate, dec!(5.00));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_blank_invoice_number_rejected(#[case] number: &str) {
        assert!(invoice_input(request(number, None)).is_err());
    }
}
