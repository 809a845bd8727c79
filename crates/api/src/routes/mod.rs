//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod auth;
pub mod clients;
pub mod company;
pub mod dashboard;
pub mod filings;
pub mod health;
pub mod invoices;
pub mod reports;
pub mod tasks;
pub mod users;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(users::routes())
        .merge(dashboard::routes())
        .merge(clients::routes())
        .merge(invoices::routes())
        .merge(filings::routes())
        .merge(tasks::routes())
        .merge(reports::routes())
        .merge(company::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
