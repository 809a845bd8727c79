//! Authentication middleware for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::AppState;
use muhasib_core::access::{Principal, Role};
use muhasib_db::UserRepository;
use muhasib_shared::JwtError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

fn unauthorized(error: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Authentication middleware that validates JWT tokens and resolves the
/// caller's principal.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. For Client-role users, resolves the linked client record so the
///    visibility scope is always current, never stale claims
/// 4. Stores the `Principal` in request extensions for handlers
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return unauthorized(
            "missing_token",
            "Authorization header with Bearer token is required",
        );
    };

    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(JwtError::Expired) => {
            return unauthorized("token_expired", "Token has expired");
        }
        Err(_) => {
            return unauthorized("invalid_token", "Invalid or malformed token");
        }
    };

    let Some(role) = Role::parse(&claims.role) else {
        return unauthorized("invalid_token", "Token carries an unknown role");
    };

    // The linked client is looked up per request rather than trusted from
    // the token, so relinking a client account takes effect immediately.
    let client_id = if role == Role::Client {
        let users = UserRepository::new((*state.db).clone());
        match users.linked_client_id(claims.user_id()).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "failed to resolve linked client");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "internal_error",
                        "message": "An error occurred while authenticating"
                    })),
                )
                    .into_response();
            }
        }
    } else {
        None
    };

    request
        .extensions_mut()
        .insert(Principal::new(claims.user_id(), role, client_id));
    next.run(request).await
}

/// Extractor for the authenticated principal.
///
/// Use this in handlers to get the caller's identity and scope:
///
/// ```ignore
/// async fn handler(AuthUser(principal): AuthUser) -> impl IntoResponse {
///     let scope = principal.client_scope();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    /// Returns the authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> uuid::Uuid {
        self.0.user_id
    }

    /// Returns the authenticated user's role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.0.role
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "unauthorized",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}
