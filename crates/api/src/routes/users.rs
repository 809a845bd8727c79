//! User management routes. Admin only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiResult, validation},
    middleware::auth::AuthUser,
};
use muhasib_core::access::{self, Resource, Role};
use muhasib_core::auth::hash_password;
use muhasib_db::repositories::CreateUserInput;
use muhasib_db::{UserRepository, entities::users};
use muhasib_shared::AppError;

/// Creates user management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/staff", get(list_staff))
        .route("/users/{id}/toggle-active", post(toggle_active))
}

/// Request to create a user account.
#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    username: String,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    role: Role,
}

/// GET /users - List all user accounts.
async fn list_users(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<Vec<users::Model>>> {
    access::ensure(access::can_view(&principal, Resource::Users))?;

    let repo = UserRepository::new((*state.db).clone());
    Ok(Json(repo.list().await?))
}

/// GET /users/staff - List staff accounts for task assignment.
async fn list_staff(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<Vec<users::Model>>> {
    access::ensure(access::can_view(&principal, Resource::Users))?;

    let repo = UserRepository::new((*state.db).clone());
    Ok(Json(repo.list_staff().await?))
}

/// POST /users - Create a user account.
async fn create_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<users::Model>)> {
    access::ensure(access::can_mutate(&principal, Resource::Users))?;

    if payload.password.len() < 8 {
        return Err(validation("password must be at least 8 characters"));
    }

    let password_hash = hash_password(&payload.password)
        .map_err(|e| crate::error::ApiError(AppError::Internal(e.to_string())))?;

    let repo = UserRepository::new((*state.db).clone());
    let user = repo
        .create(CreateUserInput {
            username: payload.username,
            email: payload.email,
            password_hash,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            role: payload.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /users/{id}/toggle-active - Flip an account's active flag.
///
/// An admin cannot deactivate their own account.
async fn toggle_active(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<users::Model>> {
    access::ensure(access::can_toggle_user_status(&principal, id))?;

    let repo = UserRepository::new((*state.db).clone());
    Ok(Json(repo.toggle_active(id).await?))
}
