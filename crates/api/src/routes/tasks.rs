//! Task management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiResult, forbidden, validation},
    middleware::auth::AuthUser,
};
use muhasib_db::TaskRepository;
use muhasib_db::entities::{
    sea_orm_active_enums::{TaskPriority, TaskStatus},
    tasks,
};
use muhasib_db::repositories::{TaskFilter, TaskInput};

/// Creates task management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/complete", post(complete_task))
}

/// Query parameters for the task list.
#[derive(Debug, Deserialize)]
struct ListTasksQuery {
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    task_type: Option<String>,
}

/// Request body for creating or updating a task.
#[derive(Debug, Deserialize)]
struct TaskRequest {
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    #[serde(default = "default_priority")]
    priority: TaskPriority,
    #[serde(default = "default_task_status")]
    status: TaskStatus,
    task_type: Option<String>,
    assigned_to: Option<Uuid>,
    client_id: Option<Uuid>,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

fn default_task_status() -> TaskStatus {
    TaskStatus::Pending
}

impl TryFrom<TaskRequest> for TaskInput {
    type Error = crate::error::ApiError;

    fn try_from(r: TaskRequest) -> Result<Self, Self::Error> {
        if r.title.trim().is_empty() {
            return Err(validation("task title is required"));
        }
        Ok(Self {
            title: r.title,
            description: r.description,
            due_date: r.due_date,
            priority: r.priority,
            status: r.status,
            task_type: r.task_type,
            assigned_to: r.assigned_to,
            client_id: r.client_id,
        })
    }
}

/// GET /tasks - List tasks visible to the caller.
async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<tasks::Model>>> {
    let repo = TaskRepository::new((*state.db).clone());
    let filter = TaskFilter {
        status: query.status,
        priority: query.priority,
        task_type: query.task_type,
    };
    Ok(Json(repo.list(&principal, &filter).await?))
}

/// GET /tasks/{id} - Fetch one task, view-checked.
async fn get_task(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<tasks::Model>> {
    let repo = TaskRepository::new((*state.db).clone());
    Ok(Json(repo.get(&principal, id).await?))
}

/// POST /tasks - Create a task. Staff only.
async fn create_task(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<TaskRequest>,
) -> ApiResult<(StatusCode, Json<tasks::Model>)> {
    if !principal.role.is_staff() {
        return Err(forbidden("only staff can create tasks"));
    }

    let repo = TaskRepository::new((*state.db).clone());
    let task = repo
        .create(payload.try_into()?, principal.user_id)
        .await?;
    info!(task_id = %task.id, "task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /tasks/{id} - Update a task. Creator or admin only.
async fn update_task(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaskRequest>,
) -> ApiResult<Json<tasks::Model>> {
    let repo = TaskRepository::new((*state.db).clone());
    let task = repo.update(&principal, id, payload.try_into()?).await?;
    Ok(Json(task))
}

/// POST /tasks/{id}/complete - Mark a task completed. Creator, assignee,
/// or admin.
async fn complete_task(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<tasks::Model>> {
    let repo = TaskRepository::new((*state.db).clone());
    let task = repo.complete(&principal, id).await?;
    info!(task_id = %id, "task completed");
    Ok(Json(task))
}

/// DELETE /tasks/{id} - Delete a task. Creator or admin only.
async fn delete_task(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let repo = TaskRepository::new((*state.db).clone());
    repo.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
