//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Response types

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use muhasib_core::storage::DocumentStorage;
use muhasib_shared::{AppConfig, JwtService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Document file store.
    pub storage: Arc<DocumentStorage>,
    /// Loaded application configuration.
    pub config: Arc<AppConfig>,
}

/// Multipart framing (boundaries, part headers) consumes body bytes on
/// top of the file itself, so the HTTP limit carries headroom past the
/// configured upload cap. Files over the cap still fail the store's own
/// size check.
const BODY_LIMIT_HEADROOM: usize = 64 * 1024;

fn upload_body_limit(max_upload_bytes: u64) -> DefaultBodyLimit {
    let limit = usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_HEADROOM);
    DefaultBodyLimit::max(limit)
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(upload_body_limit(state.config.uploads.max_size_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Multipart;
    use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
    use axum::routing::post;
    use tower::ServiceExt;

    const CAP: u64 = 16 * 1024 * 1024;
    const BOUNDARY: &str = "test-boundary";

    async fn consume(mut multipart: Multipart) -> StatusCode {
        loop {
            match multipart.next_field().await {
                Ok(Some(field)) => {
                    if field.bytes().await.is_err() {
                        return StatusCode::PAYLOAD_TOO_LARGE;
                    }
                }
                Ok(None) => return StatusCode::OK,
                Err(e) => return e.status(),
            }
        }
    }

    fn limited_router() -> Router {
        Router::new()
            .route("/upload", post(consume))
            .layer(upload_body_limit(CAP))
    }

    fn multipart_request(file_bytes: usize) -> Request<Body> {
        let mut body = Vec::with_capacity(file_bytes + 512);
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"big.pdf\"\r\n\
                 Content-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.resize(body.len() + file_bytes, b'a');
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_between_two_and_sixteen_megabytes_passes() {
        let response = limited_router()
            .oneshot(multipart_request(3 * 1024 * 1024))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_at_the_cap_passes() {
        let response = limited_router()
            .oneshot(multipart_request(16 * 1024 * 1024))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_far_over_the_cap_is_rejected() {
        let response = limited_router()
            .oneshot(multipart_request(18 * 1024 * 1024))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
