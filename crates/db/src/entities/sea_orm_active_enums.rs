//! Postgres enum mappings.

use muhasib_core::access::Role;
use muhasib_core::invoice::InvoiceStatus as CoreInvoiceStatus;
use muhasib_core::task::{TaskPriority as CoreTaskPriority, TaskStatus as CoreTaskStatus};
use muhasib_core::tax::FilingStatus as CoreFilingStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "accountant")]
    Accountant,
    #[sea_orm(string_value = "client")]
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "client_status")]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "archived")]
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_status")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_priority")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "low")]
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "filing_status")]
#[serde(rename_all = "lowercase")]
pub enum FilingStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "paid")]
    Paid,
}

// Conversions between the column enums and the domain enums. The database
// enums exist so the schema stays closed; business rules only see the
// domain side.

impl From<UserRole> for Role {
    fn from(value: UserRole) -> Self {
        match value {
            UserRole::Admin => Self::Admin,
            UserRole::Accountant => Self::Accountant,
            UserRole::Client => Self::Client,
        }
    }
}

impl From<Role> for UserRole {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => Self::Admin,
            Role::Accountant => Self::Accountant,
            Role::Client => Self::Client,
        }
    }
}

impl From<InvoiceStatus> for CoreInvoiceStatus {
    fn from(value: InvoiceStatus) -> Self {
        match value {
            InvoiceStatus::Unpaid => Self::Unpaid,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Overdue => Self::Overdue,
        }
    }
}

impl From<CoreInvoiceStatus> for InvoiceStatus {
    fn from(value: CoreInvoiceStatus) -> Self {
        match value {
            CoreInvoiceStatus::Unpaid => Self::Unpaid,
            CoreInvoiceStatus::Paid => Self::Paid,
            CoreInvoiceStatus::Overdue => Self::Overdue,
        }
    }
}

impl From<TaskStatus> for CoreTaskStatus {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Pending => Self::Pending,
            TaskStatus::InProgress => Self::InProgress,
            TaskStatus::Completed => Self::Completed,
        }
    }
}

impl From<CoreTaskStatus> for TaskStatus {
    fn from(value: CoreTaskStatus) -> Self {
        match value {
            CoreTaskStatus::Pending => Self::Pending,
            CoreTaskStatus::InProgress => Self::InProgress,
            CoreTaskStatus::Completed => Self::Completed,
        }
    }
}

impl From<TaskPriority> for CoreTaskPriority {
    fn from(value: TaskPriority) -> Self {
        match value {
            TaskPriority::High => Self::High,
            TaskPriority::Medium => Self::Medium,
            TaskPriority::Low => Self::Low,
        }
    }
}

impl From<CoreTaskPriority> for TaskPriority {
    fn from(value: CoreTaskPriority) -> Self {
        match value {
            CoreTaskPriority::High => Self::High,
            CoreTaskPriority::Medium => Self::Medium,
            CoreTaskPriority::Low => Self::Low,
        }
    }
}

impl From<FilingStatus> for CoreFilingStatus {
    fn from(value: FilingStatus) -> Self {
        match value {
            FilingStatus::Draft => Self::Draft,
            FilingStatus::Submitted => Self::Submitted,
            FilingStatus::Paid => Self::Paid,
        }
    }
}

impl From<CoreFilingStatus> for FilingStatus {
    fn from(value: CoreFilingStatus) -> Self {
        match value {
            CoreFilingStatus::Draft => Self::Draft,
            CoreFilingStatus::Submitted => Self::Submitted,
            CoreFilingStatus::Paid => Self::Paid,
        }
    }
}
