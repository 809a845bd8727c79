//! Initial database migration.
//!
//! Creates all enums, tables, unique constraints, and indexes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(CLIENTS_SQL).await?;
        db.execute_unprepared(CLIENT_DOCUMENTS_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_ITEMS_SQL).await?;
        db.execute_unprepared(INVOICE_ATTACHMENTS_SQL).await?;
        db.execute_unprepared(TASKS_SQL).await?;
        db.execute_unprepared(VAT_CALCULATIONS_SQL).await?;
        db.execute_unprepared(ZAKAT_CALCULATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r"
            DROP TABLE IF EXISTS zakat_calculations CASCADE;
            DROP TABLE IF EXISTS vat_calculations CASCADE;
            DROP TABLE IF EXISTS tasks CASCADE;
            DROP TABLE IF EXISTS invoice_attachments CASCADE;
            DROP TABLE IF EXISTS invoice_items CASCADE;
            DROP TABLE IF EXISTS invoices CASCADE;
            DROP TABLE IF EXISTS client_documents CASCADE;
            DROP TABLE IF EXISTS clients CASCADE;
            DROP TABLE IF EXISTS companies CASCADE;
            DROP TABLE IF EXISTS users CASCADE;
            DROP TYPE IF EXISTS filing_status;
            DROP TYPE IF EXISTS task_priority;
            DROP TYPE IF EXISTS task_status;
            DROP TYPE IF EXISTS invoice_status;
            DROP TYPE IF EXISTS client_status;
            DROP TYPE IF EXISTS user_role;
            ",
        )
        .await?;

        Ok(())
    }
}

const ENUMS_SQL: &str = r"
-- Roles are a closed set at the schema level, never free strings
CREATE TYPE user_role AS ENUM ('admin', 'accountant', 'client');
CREATE TYPE client_status AS ENUM ('active', 'closed', 'archived');
CREATE TYPE invoice_status AS ENUM ('unpaid', 'paid', 'overdue');
CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed');
CREATE TYPE task_priority AS ENUM ('high', 'medium', 'low');
CREATE TYPE filing_status AS ENUM ('draft', 'submitted', 'paid');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(64) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100) NOT NULL,
    phone VARCHAR(20),
    role user_role NOT NULL DEFAULT 'accountant',
    is_active BOOLEAN NOT NULL DEFAULT true,
    last_login TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_role ON users(role);
";

const COMPANIES_SQL: &str = r"
-- Singleton firm settings row
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    name_ar VARCHAR(255),
    cr_number VARCHAR(20) UNIQUE,
    vat_number VARCHAR(20) UNIQUE,
    iban VARCHAR(34),
    address TEXT,
    address_ar TEXT,
    phone VARCHAR(20),
    email VARCHAR(255),
    logo_filename VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CLIENTS_SQL: &str = r"
CREATE TABLE clients (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    name_ar VARCHAR(255),
    cr_number VARCHAR(20),
    vat_number VARCHAR(20),
    contact_person VARCHAR(100),
    email VARCHAR(255),
    phone VARCHAR(20),
    address TEXT,
    status client_status NOT NULL DEFAULT 'active',
    notes TEXT,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- A Client-role user is linked to their record through created_by
CREATE INDEX idx_clients_created_by ON clients(created_by);
CREATE INDEX idx_clients_status ON clients(status);
";

const CLIENT_DOCUMENTS_SQL: &str = r"
-- No FK cascade: document rows are removed in the same transaction as the
-- client so file paths can be collected for post-commit cleanup
CREATE TABLE client_documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    client_id UUID NOT NULL REFERENCES clients(id),
    original_name VARCHAR(255) NOT NULL,
    stored_name VARCHAR(255) NOT NULL,
    file_path VARCHAR(512) NOT NULL,
    file_size BIGINT NOT NULL,
    uploaded_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_client_documents_client ON client_documents(client_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    invoice_number VARCHAR(50) NOT NULL UNIQUE,
    client_id UUID NOT NULL REFERENCES clients(id),
    issue_date DATE NOT NULL,
    due_date DATE,
    description TEXT,
    subtotal NUMERIC(14,2) NOT NULL DEFAULT 0,
    vat_rate NUMERIC(5,2) NOT NULL DEFAULT 15.00,
    vat_amount NUMERIC(14,2) NOT NULL DEFAULT 0,
    total_amount NUMERIC(14,2) NOT NULL DEFAULT 0,
    status invoice_status NOT NULL DEFAULT 'unpaid',
    payment_date DATE,
    notes TEXT,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_invoices_client ON invoices(client_id);
CREATE INDEX idx_invoices_status ON invoices(status);
CREATE INDEX idx_invoices_issue_date ON invoices(issue_date);
";

const INVOICE_ITEMS_SQL: &str = r"
CREATE TABLE invoice_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    description VARCHAR(500) NOT NULL,
    quantity NUMERIC(12,3) NOT NULL,
    unit_price NUMERIC(14,2) NOT NULL,
    total_price NUMERIC(14,2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_invoice_items_invoice ON invoice_items(invoice_id);
";

const INVOICE_ATTACHMENTS_SQL: &str = r"
CREATE TABLE invoice_attachments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    original_name VARCHAR(255) NOT NULL,
    stored_name VARCHAR(255) NOT NULL,
    file_path VARCHAR(512) NOT NULL,
    file_size BIGINT NOT NULL,
    uploaded_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_invoice_attachments_invoice ON invoice_attachments(invoice_id);
";

const TASKS_SQL: &str = r"
CREATE TABLE tasks (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title VARCHAR(255) NOT NULL,
    description TEXT,
    due_date DATE,
    priority task_priority NOT NULL DEFAULT 'medium',
    status task_status NOT NULL DEFAULT 'pending',
    task_type VARCHAR(50),
    completed_at TIMESTAMPTZ,
    assigned_to UUID REFERENCES users(id),
    client_id UUID REFERENCES clients(id),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_tasks_assigned_to ON tasks(assigned_to);
CREATE INDEX idx_tasks_created_by ON tasks(created_by);
CREATE INDEX idx_tasks_client ON tasks(client_id);
CREATE INDEX idx_tasks_status ON tasks(status);
";

const VAT_CALCULATIONS_SQL: &str = r"
CREATE TABLE vat_calculations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    total_sales NUMERIC(14,2) NOT NULL DEFAULT 0,
    total_purchases NUMERIC(14,2) NOT NULL DEFAULT 0,
    output_vat NUMERIC(14,2) NOT NULL DEFAULT 0,
    input_vat NUMERIC(14,2) NOT NULL DEFAULT 0,
    net_vat NUMERIC(14,2) NOT NULL DEFAULT 0,
    status filing_status NOT NULL DEFAULT 'draft',
    notes TEXT,
    client_id UUID REFERENCES clients(id),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_vat_period CHECK (period_end >= period_start)
);

CREATE INDEX idx_vat_calculations_client ON vat_calculations(client_id);
CREATE INDEX idx_vat_calculations_status ON vat_calculations(status);
";

const ZAKAT_CALCULATIONS_SQL: &str = r"
CREATE TABLE zakat_calculations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    hijri_year VARCHAR(10) NOT NULL,
    cash_and_deposits NUMERIC(14,2) NOT NULL DEFAULT 0,
    trade_goods NUMERIC(14,2) NOT NULL DEFAULT 0,
    receivables NUMERIC(14,2) NOT NULL DEFAULT 0,
    investments NUMERIC(14,2) NOT NULL DEFAULT 0,
    total_assets NUMERIC(14,2) NOT NULL DEFAULT 0,
    liabilities NUMERIC(14,2) NOT NULL DEFAULT 0,
    net_wealth NUMERIC(14,2) NOT NULL DEFAULT 0,
    zakat_due NUMERIC(14,2) NOT NULL DEFAULT 0,
    nisab_threshold NUMERIC(14,2) NOT NULL,
    status filing_status NOT NULL DEFAULT 'draft',
    notes TEXT,
    client_id UUID REFERENCES clients(id),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_zakat_calculations_client ON zakat_calculations(client_id);
CREATE INDEX idx_zakat_calculations_status ON zakat_calculations(status);
";
