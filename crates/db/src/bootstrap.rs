//! Startup bootstrap.
//!
//! Ensures the default admin account exists. Safe to run on every boot.

use sea_orm::DatabaseConnection;
use tracing::info;

use muhasib_core::access::Role;
use muhasib_core::auth::{PasswordError, hash_password};

use crate::repositories::{CreateUserInput, UserError, UserRepository};

/// Default admin credentials, meant to be changed after first login.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Error types for bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Creates the default admin account if no user carries its username.
///
/// Idempotent: a second run finds the account and does nothing.
///
/// # Errors
///
/// Returns an error if the lookup, hashing, or insert fails.
pub async fn ensure_default_admin(db: &DatabaseConnection) -> Result<(), BootstrapError> {
    let users = UserRepository::new(db.clone());

    if users.find_by_login(DEFAULT_ADMIN_USERNAME).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
    users
        .create(CreateUserInput {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password_hash,
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            phone: None,
            role: Role::Admin,
        })
        .await?;

    info!(username = DEFAULT_ADMIN_USERNAME, "created default admin account");
    Ok(())
}
