//! Firm settings routes. Staff only.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    AppState,
    error::{ApiResult, validation},
    middleware::auth::AuthUser,
    routes::clients::read_file_field,
};
use muhasib_core::access::{self, Resource};
use muhasib_core::storage::UploadContext;
use muhasib_db::CompanyRepository;
use muhasib_db::entities::companies;
use muhasib_db::repositories::CompanyInput;

const LOGO_FOLDER: &str = "logos";

/// Creates firm settings routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/company", get(get_company).put(update_company))
        .route("/company/logo", post(upload_logo))
}

/// Request body for updating the firm settings.
#[derive(Debug, Deserialize)]
struct CompanyRequest {
    name: String,
    name_ar: Option<String>,
    cr_number: Option<String>,
    vat_number: Option<String>,
    iban: Option<String>,
    address: Option<String>,
    address_ar: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

/// GET /company - Fetch the firm settings. Staff only.
async fn get_company(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<companies::Model>> {
    access::ensure(access::can_view(&principal, Resource::Company))?;

    let repo = CompanyRepository::new((*state.db).clone());
    Ok(Json(repo.get_or_create().await?))
}

/// PUT /company - Update the firm settings. Staff only.
async fn update_company(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<CompanyRequest>,
) -> ApiResult<Json<companies::Model>> {
    access::ensure(access::can_mutate(&principal, Resource::Company))?;

    if payload.name.trim().is_empty() {
        return Err(validation("company name is required"));
    }

    let repo = CompanyRepository::new((*state.db).clone());
    let company = repo
        .update(CompanyInput {
            name: payload.name,
            name_ar: payload.name_ar,
            cr_number: payload.cr_number,
            vat_number: payload.vat_number,
            iban: payload.iban,
            address: payload.address,
            address_ar: payload.address_ar,
            phone: payload.phone,
            email: payload.email,
        })
        .await?;

    Ok(Json(company))
}

/// POST /company/logo - Replace the firm logo. Staff only.
///
/// The previous logo file is removed after the new one is recorded.
async fn upload_logo(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<companies::Model>> {
    access::ensure(access::can_mutate(&principal, Resource::Company))?;

    let (original_name, content) = read_file_field(&mut multipart).await?;

    let stored = state
        .storage
        .save(UploadContext::Logos, LOGO_FOLDER, &original_name, content)
        .await?;

    let repo = CompanyRepository::new((*state.db).clone());
    let previous = repo.set_logo(Some(stored.stored_name.clone())).await?;

    if let Some(previous) = previous {
        let path = format!("{LOGO_FOLDER}/{previous}");
        if let Err(e) = state.storage.delete(&path).await {
            warn!(error = %e, path = %path, "failed to remove previous logo");
        }
    }

    info!(logo = %stored.stored_name, "company logo replaced");
    Ok(Json(repo.get_or_create().await?))
}
