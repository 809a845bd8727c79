//! Company repository for the singleton firm settings row.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::companies;

/// Error types for company operations.
#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for updating the firm settings.
#[derive(Debug, Clone)]
pub struct CompanyInput {
    pub name: String,
    pub name_ar: Option<String>,
    pub cr_number: Option<String>,
    pub vat_number: Option<String>,
    pub iban: Option<String>,
    pub address: Option<String>,
    pub address_ar: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Company repository for the settings singleton.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches the settings row, creating a blank one on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or insert fails.
    pub async fn get_or_create(&self) -> Result<companies::Model, CompanyError> {
        let existing = companies::Entity::find()
            .order_by_asc(companies::Column::CreatedAt)
            .one(&self.db)
            .await?;
        if let Some(company) = existing {
            return Ok(company);
        }

        let now = chrono::Utc::now().into();
        let company = companies::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(String::new()),
            name_ar: Set(None),
            cr_number: Set(None),
            vat_number: Set(None),
            iban: Set(None),
            address: Set(None),
            address_ar: Set(None),
            phone: Set(None),
            email: Set(None),
            logo_filename: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(company.insert(&self.db).await?)
    }

    /// Updates the firm settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update(&self, input: CompanyInput) -> Result<companies::Model, CompanyError> {
        let company = self.get_or_create().await?;

        let mut active: companies::ActiveModel = company.into();
        active.name = Set(input.name);
        active.name_ar = Set(input.name_ar);
        active.cr_number = Set(input.cr_number);
        active.vat_number = Set(input.vat_number);
        active.iban = Set(input.iban);
        active.address = Set(input.address);
        active.address_ar = Set(input.address_ar);
        active.phone = Set(input.phone);
        active.email = Set(input.email);
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Replaces the logo filename, returning the previous one so the old
    /// file can be cleaned up.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn set_logo(
        &self,
        logo_filename: Option<String>,
    ) -> Result<Option<String>, CompanyError> {
        let company = self.get_or_create().await?;
        let previous = company.logo_filename.clone();

        let mut active: companies::ActiveModel = company.into();
        active.logo_filename = Set(logo_filename);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await?;

        Ok(previous)
    }
}
