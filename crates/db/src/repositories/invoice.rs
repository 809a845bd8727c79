//! Invoice repository for database operations.
//!
//! Every item mutation runs inside a transaction that ends with a full
//! recalculation of the invoice's figures, so stored totals never drift
//! from the line items.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use muhasib_core::access::ClientScope;
use muhasib_core::invoice::{self, InvoiceTotals};
use muhasib_shared::types::PageRequest;

use crate::entities::{
    clients, invoice_attachments, invoice_items, invoices,
    sea_orm_active_enums::InvoiceStatus,
};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found or not visible in the caller's scope.
    #[error("invoice not found: {0}")]
    NotFound(Uuid),

    /// Invoice number already in use.
    #[error("invoice number already in use: {0}")]
    DuplicateNumber(String),

    /// Line item not found.
    #[error("invoice item not found: {0}")]
    ItemNotFound(Uuid),

    /// Attachment not found.
    #[error("attachment not found: {0}")]
    AttachmentNotFound(Uuid),

    /// The figures failed domain validation.
    #[error(transparent)]
    Calculation(#[from] invoice::InvoiceError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating or updating an invoice.
#[derive(Debug, Clone)]
pub struct InvoiceInput {
    pub invoice_number: String,
    pub client_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    /// Used as the subtotal while the invoice has no line items.
    pub subtotal: Decimal,
    pub vat_rate: Decimal,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
}

/// Input for a line item.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Input for recording an uploaded attachment.
#[derive(Debug, Clone)]
pub struct AttachmentInput {
    pub original_name: String,
    pub stored_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub uploaded_by: Uuid,
}

/// Filters for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub search: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<Uuid>,
    pub issued_from: Option<NaiveDate>,
    pub issued_to: Option<NaiveDate>,
}

/// Invoice repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn scope_condition(scope: ClientScope) -> Option<Condition> {
        match scope {
            ClientScope::All => Some(Condition::all()),
            ClientScope::Own(id) => {
                Some(Condition::all().add(invoices::Column::ClientId.eq(id)))
            }
            ClientScope::Empty => None,
        }
    }

    /// Lists invoices visible in the caller's scope together with their
    /// client, newest issue date first.
    ///
    /// An empty scope yields an empty page, never an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        scope: ClientScope,
        filter: &InvoiceFilter,
        page: PageRequest,
    ) -> Result<(Vec<(invoices::Model, Option<clients::Model>)>, u64), InvoiceError> {
        let Some(mut condition) = Self::scope_condition(scope) else {
            return Ok((Vec::new(), 0));
        };

        if let Some(term) = &filter.search {
            let pattern = format!("%{term}%");
            condition = condition.add(
                Condition::any()
                    .add(invoices::Column::InvoiceNumber.like(&pattern))
                    .add(invoices::Column::Description.like(&pattern)),
            );
        }
        if let Some(status) = filter.status {
            condition = condition.add(invoices::Column::Status.eq(status));
        }
        if let Some(client_id) = filter.client_id {
            condition = condition.add(invoices::Column::ClientId.eq(client_id));
        }
        if let Some(from) = filter.issued_from {
            condition = condition.add(invoices::Column::IssueDate.gte(from));
        }
        if let Some(to) = filter.issued_to {
            condition = condition.add(invoices::Column::IssueDate.lte(to));
        }

        let total = invoices::Entity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await?;
        let rows = invoices::Entity::find()
            .filter(condition)
            .find_also_related(clients::Entity)
            .order_by_desc(invoices::Column::IssueDate)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Lists every invoice matching the filter, unpaginated, for report
    /// reductions and CSV export.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(
        &self,
        scope: ClientScope,
        filter: &InvoiceFilter,
    ) -> Result<Vec<(invoices::Model, Option<clients::Model>)>, InvoiceError> {
        let Some(mut condition) = Self::scope_condition(scope) else {
            return Ok(Vec::new());
        };

        if let Some(status) = filter.status {
            condition = condition.add(invoices::Column::Status.eq(status));
        }
        if let Some(client_id) = filter.client_id {
            condition = condition.add(invoices::Column::ClientId.eq(client_id));
        }
        if let Some(from) = filter.issued_from {
            condition = condition.add(invoices::Column::IssueDate.gte(from));
        }
        if let Some(to) = filter.issued_to {
            condition = condition.add(invoices::Column::IssueDate.lte(to));
        }

        Ok(invoices::Entity::find()
            .filter(condition)
            .find_also_related(clients::Entity)
            .order_by_desc(invoices::Column::IssueDate)
            .all(&self.db)
            .await?)
    }

    /// Fetches one invoice, scope-checked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the invoice does not exist or lies outside
    /// the caller's scope.
    pub async fn get(&self, scope: ClientScope, id: Uuid) -> Result<invoices::Model, InvoiceError> {
        let Some(condition) = Self::scope_condition(scope) else {
            return Err(InvoiceError::NotFound(id));
        };

        invoices::Entity::find_by_id(id)
            .filter(condition)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))
    }

    /// Suggests the next invoice number from the current row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn suggest_number(&self) -> Result<String, InvoiceError> {
        let count = invoices::Entity::find().count(&self.db).await?;
        Ok(invoice::suggest_invoice_number(count + 1))
    }

    /// Creates an invoice with optional line items in one transaction.
    ///
    /// The invoice number is checked for uniqueness before any row is
    /// written. Totals are derived by the aggregator, never trusted from
    /// the caller.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNumber` on a number collision, a calculation
    /// error for negative figures, or a database error.
    pub async fn create(
        &self,
        input: InvoiceInput,
        items: Vec<ItemInput>,
        created_by: Uuid,
    ) -> Result<invoices::Model, InvoiceError> {
        self.ensure_number_free(&input.invoice_number, None).await?;

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();
        let invoice_id = Uuid::new_v4();

        let mut item_totals = Vec::with_capacity(items.len());
        let mut item_models = Vec::with_capacity(items.len());
        for item in items {
            let total_price = invoice::line_total(item.quantity, item.unit_price)?;
            item_totals.push(total_price);
            item_models.push(invoice_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_id: Set(invoice_id),
                description: Set(item.description),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                total_price: Set(total_price),
                created_at: Set(now),
            });
        }

        let mut totals = InvoiceTotals {
            subtotal: input.subtotal,
            vat_rate: input.vat_rate,
            vat_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
        };
        invoice::recalculate(&mut totals, &item_totals)?;

        let model = invoices::ActiveModel {
            id: Set(invoice_id),
            invoice_number: Set(input.invoice_number),
            client_id: Set(input.client_id),
            issue_date: Set(input.issue_date),
            due_date: Set(input.due_date),
            description: Set(input.description),
            subtotal: Set(totals.subtotal),
            vat_rate: Set(totals.vat_rate),
            vat_amount: Set(totals.vat_amount),
            total_amount: Set(totals.total_amount),
            status: Set(input.status),
            payment_date: Set(None),
            notes: Set(input.notes),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&txn).await?;

        if !item_models.is_empty() {
            invoice_items::Entity::insert_many(item_models)
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(created)
    }

    /// Updates an invoice's header fields and recalculates.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `DuplicateNumber` if the new number collides
    /// with another invoice, or a database error.
    pub async fn update(
        &self,
        id: Uuid,
        input: InvoiceInput,
    ) -> Result<invoices::Model, InvoiceError> {
        self.ensure_number_free(&input.invoice_number, Some(id))
            .await?;

        let txn = self.db.begin().await?;

        let existing = invoices::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let mut active: invoices::ActiveModel = existing.into();
        active.invoice_number = Set(input.invoice_number);
        active.client_id = Set(input.client_id);
        active.issue_date = Set(input.issue_date);
        active.due_date = Set(input.due_date);
        active.description = Set(input.description);
        active.subtotal = Set(input.subtotal);
        active.vat_rate = Set(input.vat_rate);
        active.status = Set(input.status);
        active.notes = Set(input.notes);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&txn).await?;

        let updated = Self::recalculate_in(&txn, id).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes an invoice. Items and attachments go with it via FK
    /// cascade; the attachments' stored paths are returned for file
    /// cleanup after commit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the invoice does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<Vec<String>, InvoiceError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let paths: Vec<String> = invoice_attachments::Entity::find()
            .filter(invoice_attachments::Column::InvoiceId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|a| a.file_path)
            .collect();

        invoice.delete(&txn).await?;
        txn.commit().await?;
        Ok(paths)
    }

    /// Marks an invoice paid as of `payment_date`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the invoice does not exist.
    pub async fn mark_paid(
        &self,
        id: Uuid,
        payment_date: NaiveDate,
    ) -> Result<invoices::Model, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(InvoiceStatus::Paid);
        active.payment_date = Set(Some(payment_date));
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Lists an invoice's line items in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_items(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<invoice_items::Model>, InvoiceError> {
        Ok(invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_items::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Adds a line item and recalculates the invoice in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing invoice or a calculation error
    /// for negative figures.
    pub async fn add_item(
        &self,
        invoice_id: Uuid,
        item: ItemInput,
    ) -> Result<invoices::Model, InvoiceError> {
        let total_price = invoice::line_total(item.quantity, item.unit_price)?;
        let txn = self.db.begin().await?;

        invoices::Entity::find_by_id(invoice_id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_id))?;

        let model = invoice_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            description: Set(item.description),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            total_price: Set(total_price),
            created_at: Set(chrono::Utc::now().into()),
        };
        model.insert(&txn).await?;

        let updated = Self::recalculate_in(&txn, invoice_id).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Updates a line item and recalculates the invoice in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` or a calculation error.
    pub async fn update_item(
        &self,
        invoice_id: Uuid,
        item_id: Uuid,
        item: ItemInput,
    ) -> Result<invoices::Model, InvoiceError> {
        let total_price = invoice::line_total(item.quantity, item.unit_price)?;
        let txn = self.db.begin().await?;

        let existing = invoice_items::Entity::find_by_id(item_id)
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .one(&txn)
            .await?
            .ok_or(InvoiceError::ItemNotFound(item_id))?;

        let mut active: invoice_items::ActiveModel = existing.into();
        active.description = Set(item.description);
        active.quantity = Set(item.quantity);
        active.unit_price = Set(item.unit_price);
        active.total_price = Set(total_price);
        active.update(&txn).await?;

        let updated = Self::recalculate_in(&txn, invoice_id).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a line item and recalculates the invoice in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if no such item exists under the invoice.
    pub async fn delete_item(
        &self,
        invoice_id: Uuid,
        item_id: Uuid,
    ) -> Result<invoices::Model, InvoiceError> {
        let txn = self.db.begin().await?;

        let existing = invoice_items::Entity::find_by_id(item_id)
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .one(&txn)
            .await?
            .ok_or(InvoiceError::ItemNotFound(item_id))?;
        existing.delete(&txn).await?;

        let updated = Self::recalculate_in(&txn, invoice_id).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Records an uploaded attachment against an invoice.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the invoice does not exist.
    pub async fn add_attachment(
        &self,
        invoice_id: Uuid,
        input: AttachmentInput,
    ) -> Result<invoice_attachments::Model, InvoiceError> {
        invoices::Entity::find_by_id(invoice_id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_id))?;

        let attachment = invoice_attachments::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            original_name: Set(input.original_name),
            stored_name: Set(input.stored_name),
            file_path: Set(input.file_path),
            file_size: Set(input.file_size),
            uploaded_by: Set(input.uploaded_by),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(attachment.insert(&self.db).await?)
    }

    /// Lists an invoice's attachments, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_attachments(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<invoice_attachments::Model>, InvoiceError> {
        Ok(invoice_attachments::Entity::find()
            .filter(invoice_attachments::Column::InvoiceId.eq(invoice_id))
            .order_by_desc(invoice_attachments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Deletes one attachment row, returning its stored path for file
    /// cleanup.
    ///
    /// # Errors
    ///
    /// Returns `AttachmentNotFound` if no such attachment exists under
    /// the invoice.
    pub async fn delete_attachment(
        &self,
        invoice_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<String, InvoiceError> {
        let attachment = invoice_attachments::Entity::find_by_id(attachment_id)
            .filter(invoice_attachments::Column::InvoiceId.eq(invoice_id))
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::AttachmentNotFound(attachment_id))?;

        let path = attachment.file_path.clone();
        attachment.delete(&self.db).await?;
        Ok(path)
    }

    async fn ensure_number_free(
        &self,
        number: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), InvoiceError> {
        let mut condition =
            Condition::all().add(invoices::Column::InvoiceNumber.eq(number));
        if let Some(id) = exclude {
            condition = condition.add(invoices::Column::Id.ne(id));
        }

        let taken = invoices::Entity::find()
            .filter(condition)
            .count(&self.db)
            .await?
            > 0;
        if taken {
            return Err(InvoiceError::DuplicateNumber(number.to_string()));
        }
        Ok(())
    }

    /// Reruns the aggregator over the invoice's current items.
    async fn recalculate_in<C: ConnectionTrait>(
        conn: &C,
        invoice_id: Uuid,
    ) -> Result<invoices::Model, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(invoice_id)
            .one(conn)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_id))?;

        let item_totals: Vec<Decimal> = invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .all(conn)
            .await?
            .into_iter()
            .map(|i| i.total_price)
            .collect();

        let mut totals = InvoiceTotals {
            subtotal: invoice.subtotal,
            vat_rate: invoice.vat_rate,
            vat_amount: invoice.vat_amount,
            total_amount: invoice.total_amount,
        };
        invoice::recalculate(&mut totals, &item_totals)?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.subtotal = Set(totals.subtotal);
        active.vat_amount = Set(totals.vat_amount);
        active.total_amount = Set(totals.total_amount);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(conn).await?)
    }
}
