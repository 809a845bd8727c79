//! Client management routes, including document uploads.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiResult, validation},
    middleware::auth::AuthUser,
};
use muhasib_core::access::{self, Resource};
use muhasib_core::storage::UploadContext;
use muhasib_db::ClientRepository;
use muhasib_db::entities::{client_documents, clients, sea_orm_active_enums::ClientStatus};
use muhasib_db::repositories::{ClientInput, DocumentInput};
use muhasib_shared::types::{PageRequest, PageResponse};

/// Creates client management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
        .route(
            "/clients/{id}/documents",
            get(list_documents).post(upload_document),
        )
        .route(
            "/clients/{id}/documents/{document_id}",
            delete(delete_document),
        )
        .route(
            "/clients/{id}/documents/{document_id}/download",
            get(download_document),
        )
}

/// Query parameters for the client list.
#[derive(Debug, Deserialize)]
struct ListClientsQuery {
    search: Option<String>,
    status: Option<ClientStatus>,
    #[serde(flatten)]
    page: PageRequest,
}

/// Request body for creating or updating a client.
#[derive(Debug, Deserialize)]
struct ClientRequest {
    name: String,
    name_ar: Option<String>,
    cr_number: Option<String>,
    vat_number: Option<String>,
    contact_person: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    #[serde(default = "default_status")]
    status: ClientStatus,
    notes: Option<String>,
}

fn default_status() -> ClientStatus {
    ClientStatus::Active
}

impl From<ClientRequest> for ClientInput {
    fn from(r: ClientRequest) -> Self {
        Self {
            name: r.name,
            name_ar: r.name_ar,
            cr_number: r.cr_number,
            vat_number: r.vat_number,
            contact_person: r.contact_person,
            email: r.email,
            phone: r.phone,
            address: r.address,
            status: r.status,
            notes: r.notes,
        }
    }
}

/// GET /clients - List clients in the caller's scope.
async fn list_clients(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(query): Query<ListClientsQuery>,
) -> ApiResult<Json<PageResponse<clients::Model>>> {
    let repo = ClientRepository::new((*state.db).clone());
    let (rows, total) = repo
        .list(
            principal.client_scope(),
            query.search.as_deref(),
            query.status,
            query.page,
        )
        .await?;

    Ok(Json(PageResponse::new(
        rows,
        query.page.page,
        query.page.per_page,
        total,
    )))
}

/// GET /clients/{id} - Fetch one client, scope-checked.
async fn get_client(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<clients::Model>> {
    let repo = ClientRepository::new((*state.db).clone());
    let client = repo.get(principal.client_scope(), id).await?;
    Ok(Json(client))
}

/// POST /clients - Create a client. Staff only.
async fn create_client(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<ClientRequest>,
) -> ApiResult<(StatusCode, Json<clients::Model>)> {
    access::ensure(access::can_mutate(&principal, Resource::Clients))?;

    if payload.name.trim().is_empty() {
        return Err(validation("client name is required"));
    }

    let repo = ClientRepository::new((*state.db).clone());
    let client = repo.create(payload.into(), principal.user_id).await?;
    info!(client_id = %client.id, "client created");

    Ok((StatusCode::CREATED, Json(client)))
}

/// PUT /clients/{id} - Update a client. Staff only.
async fn update_client(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientRequest>,
) -> ApiResult<Json<clients::Model>> {
    access::ensure(access::can_mutate(&principal, Resource::Clients))?;

    if payload.name.trim().is_empty() {
        return Err(validation("client name is required"));
    }

    let repo = ClientRepository::new((*state.db).clone());
    let client = repo.update(id, payload.into()).await?;
    Ok(Json(client))
}

/// DELETE /clients/{id} - Delete a client and its documents. Staff only.
///
/// Rows are removed first in one transaction; stored files are cleaned
/// up afterwards on a best-effort basis.
async fn delete_client(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    access::ensure(access::can_mutate(&principal, Resource::Clients))?;

    let repo = ClientRepository::new((*state.db).clone());
    let paths = repo.delete(id).await?;
    info!(client_id = %id, documents = paths.len(), "client deleted");

    for path in paths {
        if let Err(e) = state.storage.delete(&path).await {
            warn!(error = %e, path = %path, "failed to remove stored document");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /clients/{id}/documents - List a client's documents.
async fn list_documents(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<client_documents::Model>>> {
    let repo = ClientRepository::new((*state.db).clone());
    // Scope check via get; clients can only reach their own record.
    repo.get(principal.client_scope(), id).await?;

    Ok(Json(repo.list_documents(id).await?))
}

/// POST /clients/{id}/documents - Upload a document. Staff only.
async fn upload_document(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<client_documents::Model>)> {
    access::ensure(access::can_mutate(&principal, Resource::Clients))?;

    let repo = ClientRepository::new((*state.db).clone());
    repo.get(principal.client_scope(), id).await?;

    let (original_name, content) = read_file_field(&mut multipart).await?;
    let size = i64::try_from(content.len()).unwrap_or(i64::MAX);

    let stored = state
        .storage
        .save(
            UploadContext::Documents,
            &format!("documents/{id}"),
            &original_name,
            content,
        )
        .await?;

    let document = repo
        .add_document(
            id,
            DocumentInput {
                original_name: stored.original_name,
                stored_name: stored.stored_name,
                file_path: stored.path.clone(),
                file_size: size,
                uploaded_by: principal.user_id,
            },
        )
        .await;

    let document = match document {
        Ok(d) => d,
        Err(e) => {
            // The row failed; drop the orphaned file before surfacing.
            if let Err(cleanup) = state.storage.delete(&stored.path).await {
                warn!(error = %cleanup, path = %stored.path, "orphaned upload left behind");
            }
            return Err(e.into());
        }
    };

    info!(client_id = %id, document_id = %document.id, "document uploaded");
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /clients/{id}/documents/{document_id}/download - Stream a document
/// back with its original name.
async fn download_document(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((id, document_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let repo = ClientRepository::new((*state.db).clone());
    repo.get(principal.client_scope(), id).await?;

    let document = repo
        .list_documents(id)
        .await?
        .into_iter()
        .find(|d| d.id == document_id)
        .ok_or_else(|| {
            crate::error::ApiError(muhasib_shared::AppError::NotFound(format!(
                "document not found: {document_id}"
            )))
        })?;

    let content = state.storage.read(&document.file_path).await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.original_name),
        ),
    ];

    Ok((headers, content))
}

/// DELETE /clients/{id}/documents/{document_id} - Remove a document. Staff only.
async fn delete_document(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((id, document_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    access::ensure(access::can_mutate(&principal, Resource::Clients))?;

    let repo = ClientRepository::new((*state.db).clone());
    let path = repo.delete_document(id, document_id).await?;

    if let Err(e) = state.storage.delete(&path).await {
        warn!(error = %e, path = %path, "failed to remove stored document");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Pulls the `file` field out of a multipart body.
pub(crate) async fn read_file_field(
    multipart: &mut Multipart,
) -> ApiResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| validation(&format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| validation("file field has no filename"))?;
        let content = field
            .bytes()
            .await
            .map_err(|e| validation(&format!("failed to read upload: {e}")))?;
        return Ok((original_name, content.to_vec()));
    }
    Err(validation("multipart body has no file field"))
}
