//! Filing repository for VAT returns and Zakat declarations.
//!
//! Figures are always derived by the tax calculator from the raw inputs;
//! callers never hand in precomputed amounts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use muhasib_core::access::ClientScope;
use muhasib_core::tax::{self, FilingStatus as CoreFilingStatus, TaxError};

use crate::entities::{sea_orm_active_enums::FilingStatus, vat_calculations, zakat_calculations};

/// Error types for filing operations.
#[derive(Debug, thiserror::Error)]
pub enum FilingError {
    /// Filing not found or not visible in the caller's scope.
    #[error("filing not found: {0}")]
    NotFound(Uuid),

    /// The filing is not in a state that permits the transition.
    #[error(transparent)]
    Transition(#[from] tax::FilingError),

    /// The figures failed domain validation.
    #[error(transparent)]
    Calculation(#[from] TaxError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a VAT return.
#[derive(Debug, Clone)]
pub struct CreateVatInput {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub notes: Option<String>,
    pub client_id: Option<Uuid>,
}

/// Input for creating a Zakat declaration.
#[derive(Debug, Clone)]
pub struct CreateZakatInput {
    pub hijri_year: String,
    pub cash_and_deposits: Decimal,
    pub trade_goods: Decimal,
    pub receivables: Decimal,
    pub investments: Decimal,
    pub liabilities: Decimal,
    pub notes: Option<String>,
    pub client_id: Option<Uuid>,
}

/// Filing repository for VAT and Zakat calculations.
#[derive(Debug, Clone)]
pub struct FilingRepository {
    db: DatabaseConnection,
}

impl FilingRepository {
    /// Creates a new filing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a VAT return as a draft.
    ///
    /// Output and input VAT are derived from sales and purchases at the
    /// given percent rate; net VAT is their difference.
    ///
    /// # Errors
    ///
    /// Returns a calculation error for negative inputs or a database
    /// error.
    pub async fn create_vat(
        &self,
        input: CreateVatInput,
        vat_rate: Decimal,
        created_by: Uuid,
    ) -> Result<vat_calculations::Model, FilingError> {
        let output = tax::compute_vat(input.total_sales, vat_rate)?;
        let input_side = tax::compute_vat(input.total_purchases, vat_rate)?;
        let net_vat = output.vat_amount - input_side.vat_amount;

        let now = chrono::Utc::now().into();
        let model = vat_calculations::ActiveModel {
            id: Set(Uuid::new_v4()),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            total_sales: Set(input.total_sales),
            total_purchases: Set(input.total_purchases),
            output_vat: Set(output.vat_amount),
            input_vat: Set(input_side.vat_amount),
            net_vat: Set(net_vat),
            status: Set(FilingStatus::Draft),
            notes: Set(input.notes),
            client_id: Set(input.client_id),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Creates a Zakat declaration as a draft.
    ///
    /// # Errors
    ///
    /// Returns a calculation error for negative inputs or a database
    /// error.
    pub async fn create_zakat(
        &self,
        input: CreateZakatInput,
        nisab: Decimal,
        created_by: Uuid,
    ) -> Result<zakat_calculations::Model, FilingError> {
        let total_assets = tax::zakat_asset_total(
            input.cash_and_deposits,
            input.trade_goods,
            input.receivables,
            input.investments,
        )?;
        let assessment = tax::compute_zakat(total_assets, input.liabilities, nisab)?;

        let now = chrono::Utc::now().into();
        let model = zakat_calculations::ActiveModel {
            id: Set(Uuid::new_v4()),
            hijri_year: Set(input.hijri_year),
            cash_and_deposits: Set(input.cash_and_deposits),
            trade_goods: Set(input.trade_goods),
            receivables: Set(input.receivables),
            investments: Set(input.investments),
            total_assets: Set(total_assets),
            liabilities: Set(input.liabilities),
            net_wealth: Set(assessment.net_wealth),
            zakat_due: Set(assessment.zakat_due),
            nisab_threshold: Set(nisab),
            status: Set(FilingStatus::Draft),
            notes: Set(input.notes),
            client_id: Set(input.client_id),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Lists VAT returns visible in the caller's scope, newest first.
    ///
    /// A Client-scope caller sees only returns attached to their client;
    /// firm-internal returns (no client) stay staff-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_vat(
        &self,
        scope: ClientScope,
    ) -> Result<Vec<vat_calculations::Model>, FilingError> {
        let condition = match scope {
            ClientScope::All => Condition::all(),
            ClientScope::Own(id) => {
                Condition::all().add(vat_calculations::Column::ClientId.eq(id))
            }
            ClientScope::Empty => return Ok(Vec::new()),
        };

        Ok(vat_calculations::Entity::find()
            .filter(condition)
            .order_by_desc(vat_calculations::Column::PeriodEnd)
            .all(&self.db)
            .await?)
    }

    /// Lists Zakat declarations visible in the caller's scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_zakat(
        &self,
        scope: ClientScope,
    ) -> Result<Vec<zakat_calculations::Model>, FilingError> {
        let condition = match scope {
            ClientScope::All => Condition::all(),
            ClientScope::Own(id) => {
                Condition::all().add(zakat_calculations::Column::ClientId.eq(id))
            }
            ClientScope::Empty => return Ok(Vec::new()),
        };

        Ok(zakat_calculations::Entity::find()
            .filter(condition)
            .order_by_desc(zakat_calculations::Column::HijriYear)
            .all(&self.db)
            .await?)
    }

    /// Fetches one VAT return, scope-checked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the return does not exist or lies outside
    /// the caller's scope.
    pub async fn get_vat(
        &self,
        scope: ClientScope,
        id: Uuid,
    ) -> Result<vat_calculations::Model, FilingError> {
        let filing = vat_calculations::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FilingError::NotFound(id))?;

        if !scope.permits(filing.client_id) {
            return Err(FilingError::NotFound(id));
        }
        Ok(filing)
    }

    /// Fetches one Zakat declaration, scope-checked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the declaration does not exist or lies
    /// outside the caller's scope.
    pub async fn get_zakat(
        &self,
        scope: ClientScope,
        id: Uuid,
    ) -> Result<zakat_calculations::Model, FilingError> {
        let filing = zakat_calculations::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FilingError::NotFound(id))?;

        if !scope.permits(filing.client_id) {
            return Err(FilingError::NotFound(id));
        }
        Ok(filing)
    }

    /// Submits a draft VAT return.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a transition error when the return is not a
    /// draft.
    pub async fn submit_vat(&self, id: Uuid) -> Result<vat_calculations::Model, FilingError> {
        let filing = vat_calculations::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FilingError::NotFound(id))?;

        let next = CoreFilingStatus::from(filing.status).submit()?;

        let mut active: vat_calculations::ActiveModel = filing.into();
        active.status = Set(next.into());
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Submits a draft Zakat declaration.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a transition error when the declaration is
    /// not a draft.
    pub async fn submit_zakat(&self, id: Uuid) -> Result<zakat_calculations::Model, FilingError> {
        let filing = zakat_calculations::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FilingError::NotFound(id))?;

        let next = CoreFilingStatus::from(filing.status).submit()?;

        let mut active: zakat_calculations::ActiveModel = filing.into();
        active.status = Set(next.into());
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }
}
