//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use muhasib_core::access::Role;

use crate::entities::{clients, sea_orm_active_enums::UserRole, users};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("user not found: {0}")]
    NotFound(Uuid),

    /// Username already registered.
    #[error("username already taken")]
    DuplicateUsername,

    /// Email already registered.
    #[error("email already registered")]
    DuplicateEmail,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by username or email, for login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<users::Model>, UserError> {
        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(login))
                    .add(users::Column::Email.eq(login)),
            )
            .one(&self.db)
            .await?;
        Ok(user)
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Creates a new user after checking username and email uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateUsername` or `DuplicateEmail` before any write,
    /// or a database error.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        let username_taken = users::Entity::find()
            .filter(users::Column::Username.eq(&input.username))
            .count(&self.db)
            .await?
            > 0;
        if username_taken {
            return Err(UserError::DuplicateUsername);
        }

        let email_taken = users::Entity::find()
            .filter(users::Column::Email.eq(&input.email))
            .count(&self.db)
            .await?
            > 0;
        if email_taken {
            return Err(UserError::DuplicateEmail);
        }

        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            phone: Set(input.phone),
            role: Set(input.role.into()),
            is_active: Set(true),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(user.insert(&self.db).await?)
    }

    /// Lists all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<users::Model>, UserError> {
        Ok(users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Lists staff users (admins and accountants), for task assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_staff(&self) -> Result<Vec<users::Model>, UserError> {
        Ok(users::Entity::find()
            .filter(users::Column::Role.is_in([UserRole::Admin, UserRole::Accountant]))
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await?)
    }

    /// Stamps a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn record_login(&self, user_id: Uuid) -> Result<(), UserError> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        let mut active: users::ActiveModel = user.into();
        active.last_login = Set(Some(chrono::Utc::now().into()));
        active.update(&self.db).await?;
        Ok(())
    }

    /// Flips a user's active flag and returns the updated record.
    ///
    /// A deactivated user fails the `is_active` check at login and at
    /// token refresh; existing access tokens lapse on their own.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user does not exist, or an error if
    /// the update fails.
    pub async fn toggle_active(&self, id: Uuid) -> Result<users::Model, UserError> {
        let user = users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let was_active = user.is_active;
        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(!was_active);
        Ok(active.update(&self.db).await?)
    }

    /// Resolves the client record linked to a Client-role user.
    ///
    /// Returns `None` when no client record points at the user; callers
    /// treat that as an empty visibility scope, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn linked_client_id(&self, user_id: Uuid) -> Result<Option<Uuid>, UserError> {
        let client = clients::Entity::find()
            .filter(clients::Column::CreatedBy.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(client.map(|c| c.id))
    }
}
