//! Client repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use muhasib_core::access::ClientScope;
use muhasib_shared::types::PageRequest;

use crate::entities::{client_documents, clients, sea_orm_active_enums::ClientStatus};

/// Error types for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Client not found or not visible in the caller's scope.
    #[error("client not found: {0}")]
    NotFound(Uuid),

    /// Document not found.
    #[error("document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating or updating a client.
#[derive(Debug, Clone)]
pub struct ClientInput {
    pub name: String,
    pub name_ar: Option<String>,
    pub cr_number: Option<String>,
    pub vat_number: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: ClientStatus,
    pub notes: Option<String>,
}

/// Input for recording an uploaded client document.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub original_name: String,
    pub stored_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub uploaded_by: Uuid,
}

/// Client repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn scope_condition(scope: ClientScope) -> Option<Condition> {
        match scope {
            ClientScope::All => Some(Condition::all()),
            ClientScope::Own(id) => Some(Condition::all().add(clients::Column::Id.eq(id))),
            ClientScope::Empty => None,
        }
    }

    /// Lists clients visible in the caller's scope, with optional name
    /// search and status filter.
    ///
    /// An empty scope yields an empty page, never an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        scope: ClientScope,
        search: Option<&str>,
        status: Option<ClientStatus>,
        page: PageRequest,
    ) -> Result<(Vec<clients::Model>, u64), ClientError> {
        let Some(mut condition) = Self::scope_condition(scope) else {
            return Ok((Vec::new(), 0));
        };

        if let Some(term) = search {
            let pattern = format!("%{term}%");
            condition = condition.add(
                Condition::any()
                    .add(clients::Column::Name.like(&pattern))
                    .add(clients::Column::NameAr.like(&pattern))
                    .add(clients::Column::CrNumber.like(&pattern)),
            );
        }
        if let Some(status) = status {
            condition = condition.add(clients::Column::Status.eq(status));
        }

        let query = clients::Entity::find().filter(condition);
        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_asc(clients::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Counts clients visible in the caller's scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self, scope: ClientScope) -> Result<u64, ClientError> {
        let Some(condition) = Self::scope_condition(scope) else {
            return Ok(0);
        };
        Ok(clients::Entity::find()
            .filter(condition)
            .count(&self.db)
            .await?)
    }

    /// Fetches one client, scope-checked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the client does not exist or lies outside
    /// the caller's scope.
    pub async fn get(&self, scope: ClientScope, id: Uuid) -> Result<clients::Model, ClientError> {
        let Some(condition) = Self::scope_condition(scope) else {
            return Err(ClientError::NotFound(id));
        };

        clients::Entity::find_by_id(id)
            .filter(condition)
            .one(&self.db)
            .await?
            .ok_or(ClientError::NotFound(id))
    }

    /// Creates a client record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        &self,
        input: ClientInput,
        created_by: Uuid,
    ) -> Result<clients::Model, ClientError> {
        let now = chrono::Utc::now().into();
        let client = clients::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            name_ar: Set(input.name_ar),
            cr_number: Set(input.cr_number),
            vat_number: Set(input.vat_number),
            contact_person: Set(input.contact_person),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            status: Set(input.status),
            notes: Set(input.notes),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(client.insert(&self.db).await?)
    }

    /// Updates a client record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the client does not exist.
    pub async fn update(&self, id: Uuid, input: ClientInput) -> Result<clients::Model, ClientError> {
        let client = clients::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ClientError::NotFound(id))?;

        let mut active: clients::ActiveModel = client.into();
        active.name = Set(input.name);
        active.name_ar = Set(input.name_ar);
        active.cr_number = Set(input.cr_number);
        active.vat_number = Set(input.vat_number);
        active.contact_person = Set(input.contact_person);
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.address = Set(input.address);
        active.status = Set(input.status);
        active.notes = Set(input.notes);
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a client and its document rows in one transaction.
    ///
    /// Returns the stored file paths of the removed documents so the
    /// caller can clean up the file store after the transaction has
    /// committed. Rows go first; a mid-failure rolls back with no files
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the client does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<Vec<String>, ClientError> {
        let txn = self.db.begin().await?;

        let client = clients::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ClientError::NotFound(id))?;

        let documents = client_documents::Entity::find()
            .filter(client_documents::Column::ClientId.eq(id))
            .all(&txn)
            .await?;
        let paths: Vec<String> = documents.iter().map(|d| d.file_path.clone()).collect();

        client_documents::Entity::delete_many()
            .filter(client_documents::Column::ClientId.eq(id))
            .exec(&txn)
            .await?;
        client.delete(&txn).await?;

        txn.commit().await?;
        Ok(paths)
    }

    /// Records an uploaded document against a client.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the client does not exist.
    pub async fn add_document(
        &self,
        client_id: Uuid,
        input: DocumentInput,
    ) -> Result<client_documents::Model, ClientError> {
        clients::Entity::find_by_id(client_id)
            .one(&self.db)
            .await?
            .ok_or(ClientError::NotFound(client_id))?;

        let document = client_documents::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(client_id),
            original_name: Set(input.original_name),
            stored_name: Set(input.stored_name),
            file_path: Set(input.file_path),
            file_size: Set(input.file_size),
            uploaded_by: Set(input.uploaded_by),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(document.insert(&self.db).await?)
    }

    /// Lists a client's documents, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_documents(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<client_documents::Model>, ClientError> {
        Ok(client_documents::Entity::find()
            .filter(client_documents::Column::ClientId.eq(client_id))
            .order_by_desc(client_documents::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Deletes one document row, returning its stored path for file
    /// cleanup.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` if no such document exists under the
    /// client.
    pub async fn delete_document(
        &self,
        client_id: Uuid,
        document_id: Uuid,
    ) -> Result<String, ClientError> {
        let document = client_documents::Entity::find_by_id(document_id)
            .filter(client_documents::Column::ClientId.eq(client_id))
            .one(&self.db)
            .await?
            .ok_or(ClientError::DocumentNotFound(document_id))?;

        let path = document.file_path.clone();
        document.delete(&self.db).await?;
        Ok(path)
    }
}
