//! Shared types, errors, and configuration for Muhasib.
//!
//! This crate provides common types used across all other crates:
//! - SAR money helpers with decimal precision
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - JWT claims and token handling
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
