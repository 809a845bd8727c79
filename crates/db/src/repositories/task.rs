//! Task repository for database operations.
//!
//! Record-level rules live in the access policy: accountants mutate only
//! tasks they created, complete what they created or are assigned to, and
//! clients are view-only on tasks attached to their linked client.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use muhasib_core::access::{
    self, ClientScope, Principal, Role, TaskOwnership,
};
use muhasib_core::task::{TaskStatus as CoreTaskStatus, apply_status};

use crate::entities::{
    sea_orm_active_enums::{TaskPriority, TaskStatus},
    tasks,
};

/// Error types for task operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Task not found or not visible to the caller.
    #[error("task not found: {0}")]
    NotFound(Uuid),

    /// The caller may not perform this operation on the task.
    #[error("operation not permitted on this task")]
    Forbidden,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<access::AccessError> for TaskError {
    fn from(_: access::AccessError) -> Self {
        Self::Forbidden
    }
}

/// Input for creating or updating a task.
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub task_type: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

/// Filters for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub task_type: Option<String>,
}

/// Task repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    db: DatabaseConnection,
}

impl TaskRepository {
    /// Creates a new task repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn ownership(task: &tasks::Model) -> TaskOwnership {
        TaskOwnership {
            created_by: task.created_by,
            assigned_to: task.assigned_to,
            client_id: task.client_id,
        }
    }

    fn visibility_condition(principal: &Principal) -> Option<Condition> {
        match principal.role {
            Role::Admin => Some(Condition::all()),
            Role::Accountant => Some(
                Condition::any()
                    .add(tasks::Column::CreatedBy.eq(principal.user_id))
                    .add(tasks::Column::AssignedTo.eq(principal.user_id)),
            ),
            Role::Client => match principal.client_scope() {
                ClientScope::Own(id) => {
                    Some(Condition::all().add(tasks::Column::ClientId.eq(id)))
                }
                ClientScope::Empty => None,
                // A Client principal never carries the All scope
                ClientScope::All => None,
            },
        }
    }

    /// Lists tasks visible to the caller, due-soonest first.
    ///
    /// A Client principal with no linked client gets an empty list,
    /// never an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        principal: &Principal,
        filter: &TaskFilter,
    ) -> Result<Vec<tasks::Model>, TaskError> {
        let Some(mut condition) = Self::visibility_condition(principal) else {
            return Ok(Vec::new());
        };

        if let Some(status) = filter.status {
            condition = condition.add(tasks::Column::Status.eq(status));
        }
        if let Some(priority) = filter.priority {
            condition = condition.add(tasks::Column::Priority.eq(priority));
        }
        if let Some(task_type) = &filter.task_type {
            condition = condition.add(tasks::Column::TaskType.eq(task_type));
        }

        Ok(tasks::Entity::find()
            .filter(condition)
            .order_by_asc(tasks::Column::DueDate)
            .order_by_desc(tasks::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Fetches one task, view-checked against the caller.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist or the caller may
    /// not see it.
    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<tasks::Model, TaskError> {
        let task = tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        if !access::can_view_task(principal, &Self::ownership(&task)) {
            return Err(TaskError::NotFound(id));
        }
        Ok(task)
    }

    /// Creates a task owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        &self,
        input: TaskInput,
        created_by: Uuid,
    ) -> Result<tasks::Model, TaskError> {
        let now = chrono::Utc::now();
        let change = apply_status(
            CoreTaskStatus::Pending,
            None,
            input.status.into(),
            now,
        );

        let task = tasks::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            description: Set(input.description),
            due_date: Set(input.due_date),
            priority: Set(input.priority),
            status: Set(change.status.into()),
            task_type: Set(input.task_type),
            completed_at: Set(change.completed_at.map(Into::into)),
            assigned_to: Set(input.assigned_to),
            client_id: Set(input.client_id),
            created_by: Set(created_by),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        Ok(task.insert(&self.db).await?)
    }

    /// Updates a task, applying the completion timestamp rules.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when the caller may not mutate the task.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: TaskInput,
    ) -> Result<tasks::Model, TaskError> {
        let task = tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        access::ensure(access::can_mutate_task(principal, &Self::ownership(&task)))?;

        let now = chrono::Utc::now();
        let change = apply_status(
            task.status.into(),
            task.completed_at.map(Into::into),
            input.status.into(),
            now,
        );

        let mut active: tasks::ActiveModel = task.into();
        active.title = Set(input.title);
        active.description = Set(input.description);
        active.due_date = Set(input.due_date);
        active.priority = Set(input.priority);
        active.status = Set(change.status.into());
        active.task_type = Set(input.task_type);
        active.completed_at = Set(change.completed_at.map(Into::into));
        active.assigned_to = Set(input.assigned_to);
        active.client_id = Set(input.client_id);
        active.updated_at = Set(now.into());

        Ok(active.update(&self.db).await?)
    }

    /// Marks a task completed. Allowed for the creator, the assignee, or
    /// an admin.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when the caller may not complete the task.
    pub async fn complete(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<tasks::Model, TaskError> {
        let task = tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        access::ensure(access::can_complete_task(principal, &Self::ownership(&task)))?;

        let now = chrono::Utc::now();
        let change = apply_status(
            task.status.into(),
            task.completed_at.map(Into::into),
            CoreTaskStatus::Completed,
            now,
        );

        let mut active: tasks::ActiveModel = task.into();
        active.status = Set(change.status.into());
        active.completed_at = Set(change.completed_at.map(Into::into));
        active.updated_at = Set(now.into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when the caller may not mutate the task.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), TaskError> {
        let task = tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        access::ensure(access::can_mutate_task(principal, &Self::ownership(&task)))?;

        task.delete(&self.db).await?;
        Ok(())
    }
}
