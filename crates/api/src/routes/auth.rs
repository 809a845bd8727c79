//! Authentication routes.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use muhasib_core::auth::verify_password;
use muhasib_db::UserRepository;
use muhasib_shared::JwtError;
use muhasib_shared::auth::{LoginRequest, LoginResponse, UserInfo};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid username or password"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred during login"
        })),
    )
        .into_response()
}

/// POST /auth/login - Authenticate by username or email and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_login(&payload.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(login = %payload.username, "login attempt for unknown user");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "database error during login");
            return internal_error();
        }
    };

    if !user.is_active {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "account_disabled",
                "message": "This account has been disabled"
            })),
        )
            .into_response();
    }

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "failed login attempt");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "password verification error");
            return internal_error();
        }
    }

    let role: muhasib_core::access::Role = user.role.into();
    let access_token = match state.jwt_service.generate_access_token(user.id, role.as_str()) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "failed to generate access token");
            return internal_error();
        }
    };
    let refresh_token = match state
        .jwt_service
        .generate_refresh_token(user.id, role.as_str())
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "failed to generate refresh token");
            return internal_error();
        }
    };

    if let Err(e) = user_repo.record_login(user.id).await {
        // Login still succeeds; the stamp is advisory
        error!(error = %e, "failed to record login timestamp");
    }

    let response = LoginResponse {
        user: UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: role.as_str().to_string(),
        },
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/refresh - Exchange a refresh token for a new access token.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(e) => {
            let (error, message) = match e {
                JwtError::Expired => ("token_expired", "Refresh token has expired"),
                _ => ("invalid_token", "Invalid refresh token"),
            };
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response();
        }
    };

    // The account may have been disabled since the refresh token was issued.
    let user_repo = UserRepository::new((*state.db).clone());
    match user_repo.find_by_id(claims.user_id()).await {
        Ok(Some(user)) if user.is_active => {}
        Ok(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "account_disabled",
                    "message": "This account is no longer active"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "database error during token refresh");
            return internal_error();
        }
    }

    let access_token = match state
        .jwt_service
        .generate_access_token(claims.user_id(), &claims.role)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "failed to generate access token");
            return internal_error();
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "access_token": access_token,
            "expires_in": state.jwt_service.access_token_expires_in()
        })),
    )
        .into_response()
}
