//! VAT return and Zakat declaration routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiResult, forbidden, validation},
    middleware::auth::AuthUser,
};
use muhasib_core::access;
use muhasib_core::tax::{current_hijri_year, hijri_year_label, saudi_vat_rate};
use muhasib_db::FilingRepository;
use muhasib_db::entities::{vat_calculations, zakat_calculations};
use muhasib_db::repositories::{CreateVatInput, CreateZakatInput};

/// Creates filing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/filings/vat", get(list_vat).post(create_vat))
        .route("/filings/vat/{id}", get(get_vat))
        .route("/filings/vat/{id}/submit", post(submit_vat))
        .route("/filings/zakat", get(list_zakat).post(create_zakat))
        .route("/filings/zakat/{id}", get(get_zakat))
        .route("/filings/zakat/{id}/submit", post(submit_zakat))
}

/// Request body for a VAT return.
#[derive(Debug, Deserialize)]
struct VatRequest {
    period_start: NaiveDate,
    period_end: NaiveDate,
    total_sales: Decimal,
    total_purchases: Decimal,
    notes: Option<String>,
    client_id: Option<Uuid>,
}

/// Request body for a Zakat declaration.
#[derive(Debug, Deserialize)]
struct ZakatRequest {
    /// Defaults to the current Hijri year when omitted.
    hijri_year: Option<String>,
    #[serde(default)]
    cash_and_deposits: Decimal,
    #[serde(default)]
    trade_goods: Decimal,
    #[serde(default)]
    receivables: Decimal,
    #[serde(default)]
    investments: Decimal,
    #[serde(default)]
    liabilities: Decimal,
    notes: Option<String>,
    client_id: Option<Uuid>,
}

/// GET /filings/vat - List VAT returns in the caller's scope.
async fn list_vat(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<Vec<vat_calculations::Model>>> {
    let repo = FilingRepository::new((*state.db).clone());
    Ok(Json(repo.list_vat(principal.client_scope()).await?))
}

/// GET /filings/vat/{id} - Fetch one VAT return, scope-checked.
async fn get_vat(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<vat_calculations::Model>> {
    let repo = FilingRepository::new((*state.db).clone());
    Ok(Json(repo.get_vat(principal.client_scope(), id).await?))
}

/// POST /filings/vat - Create a draft VAT return. Staff only.
///
/// Output, input, and net VAT are derived from the sales and purchase
/// figures at the statutory rate; the caller never supplies them.
async fn create_vat(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<VatRequest>,
) -> ApiResult<(StatusCode, Json<vat_calculations::Model>)> {
    if !principal.role.is_staff() {
        return Err(forbidden("only staff can create filings"));
    }
    if payload.period_end < payload.period_start {
        return Err(validation("period end must not precede period start"));
    }

    let repo = FilingRepository::new((*state.db).clone());
    let filing = repo
        .create_vat(
            CreateVatInput {
                period_start: payload.period_start,
                period_end: payload.period_end,
                total_sales: payload.total_sales,
                total_purchases: payload.total_purchases,
                notes: payload.notes,
                client_id: payload.client_id,
            },
            saudi_vat_rate(),
            principal.user_id,
        )
        .await?;

    info!(filing_id = %filing.id, "VAT return drafted");
    Ok((StatusCode::CREATED, Json(filing)))
}

/// POST /filings/vat/{id}/submit - Submit a draft return. Staff only.
async fn submit_vat(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<vat_calculations::Model>> {
    access::ensure(access::can_submit_filing(&principal))?;

    let repo = FilingRepository::new((*state.db).clone());
    // Scope check first so a foreign id reads as missing, not forbidden.
    repo.get_vat(principal.client_scope(), id).await?;
    let filing = repo.submit_vat(id).await?;

    info!(filing_id = %id, "VAT return submitted");
    Ok(Json(filing))
}

/// GET /filings/zakat - List Zakat declarations in the caller's scope.
async fn list_zakat(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<Vec<zakat_calculations::Model>>> {
    let repo = FilingRepository::new((*state.db).clone());
    Ok(Json(repo.list_zakat(principal.client_scope()).await?))
}

/// GET /filings/zakat/{id} - Fetch one Zakat declaration, scope-checked.
async fn get_zakat(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<zakat_calculations::Model>> {
    let repo = FilingRepository::new((*state.db).clone());
    Ok(Json(repo.get_zakat(principal.client_scope(), id).await?))
}

/// POST /filings/zakat - Create a draft Zakat declaration. Staff only.
async fn create_zakat(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<ZakatRequest>,
) -> ApiResult<(StatusCode, Json<zakat_calculations::Model>)> {
    if !principal.role.is_staff() {
        return Err(forbidden("only staff can create filings"));
    }

    let hijri_year = payload
        .hijri_year
        .unwrap_or_else(|| hijri_year_label(current_hijri_year()));

    let repo = FilingRepository::new((*state.db).clone());
    let filing = repo
        .create_zakat(
            CreateZakatInput {
                hijri_year,
                cash_and_deposits: payload.cash_and_deposits,
                trade_goods: payload.trade_goods,
                receivables: payload.receivables,
                investments: payload.investments,
                liabilities: payload.liabilities,
                notes: payload.notes,
                client_id: payload.client_id,
            },
            state.config.zakat.nisab_threshold,
            principal.user_id,
        )
        .await?;

    info!(filing_id = %filing.id, "Zakat declaration drafted");
    Ok((StatusCode::CREATED, Json(filing)))
}

/// POST /filings/zakat/{id}/submit - Submit a draft declaration. Staff only.
async fn submit_zakat(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<zakat_calculations::Model>> {
    access::ensure(access::can_submit_filing(&principal))?;

    let repo = FilingRepository::new((*state.db).clone());
    repo.get_zakat(principal.client_scope(), id).await?;
    let filing = repo.submit_zakat(id).await?;

    info!(filing_id = %id, "Zakat declaration submitted");
    Ok(Json(filing))
}
