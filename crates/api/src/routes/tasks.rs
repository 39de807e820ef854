//! Task CRUD. Ownership is indirect: every permission question routes
//! through the parent project's owner via the engine.

use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_auth::{Action, Principal, ResourceRef};
use taskboard_core::{ProjectId, TaskId, UserId};
use taskboard_storage::{
    TaskFilter, TaskPriority, TaskRecord, TaskScope, TaskStatus, TaskUpdate,
};

use crate::error::{ApiError, ensure_allowed};
use crate::state::AppState;

const TASK_NOT_FOUND: &str = "Task not found";
const PROJECT_NOT_FOUND: &str = "Project not found";

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
    pub assigned_to: Option<UserId>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Pending
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub assigned_to: Option<UserId>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskRecord> for TaskResponse {
    fn from(task: TaskRecord) -> Self {
        Self {
            id: task.id,
            project_id: task.project_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            assigned_to: task.assigned_to,
            created_by: task.created_by,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Creating a task mutates the project's scope, so it requires write
/// permission on the parent project (which also 404s when the project
/// does not exist).
pub async fn create_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let decision = state
        .engine
        .authorize(&principal, Action::Write, ResourceRef::Project(body.project_id))
        .await?;
    ensure_allowed(decision, PROJECT_NOT_FOUND)?;

    let now = Utc::now();
    let task = TaskRecord {
        id: TaskId::new(),
        project_id: body.project_id,
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority,
        due_date: body.due_date,
        assigned_to: body.assigned_to,
        created_by: principal.id,
        created_at: now,
        updated_at: now,
    };

    state.tasks.insert(task.clone()).await?;
    tracing::info!(task_id = %task.id, project_id = %task.project_id, "task created");

    Ok(Json(task.into()))
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub project_id: Option<ProjectId>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    if let Some(project_id) = query.project_id {
        let decision = state
            .engine
            .authorize(&principal, Action::Read, ResourceRef::Project(project_id))
            .await?;
        ensure_allowed(decision, PROJECT_NOT_FOUND)?;

        let tasks = state
            .tasks
            .list(TaskFilter {
                project_id: Some(project_id),
                scope: None,
            })
            .await?;
        return Ok(Json(tasks.into_iter().map(Into::into).collect()));
    }

    let filter = if principal.role.is_admin() {
        TaskFilter::default()
    } else {
        let owned_projects = state
            .projects
            .list_owned_by(principal.id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        TaskFilter {
            project_id: None,
            scope: Some(TaskScope {
                owned_projects,
                assignee: principal.id,
            }),
        }
    };

    let tasks = state.tasks.list(filter).await?;
    Ok(Json(tasks.into_iter().map(Into::into).collect()))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(task_id): Path<TaskId>,
) -> Result<Json<TaskResponse>, ApiError> {
    let decision = state
        .engine
        .authorize(&principal, Action::Read, ResourceRef::Task(task_id))
        .await?;
    ensure_allowed(decision, TASK_NOT_FOUND)?;

    let task = state
        .tasks
        .find_by_id(task_id)
        .await?
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))?;

    Ok(Json(task.into()))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(task_id): Path<TaskId>,
    Json(changes): Json<TaskUpdate>,
) -> Result<Json<TaskResponse>, ApiError> {
    let decision = state
        .engine
        .authorize(&principal, Action::Write, ResourceRef::Task(task_id))
        .await?;
    ensure_allowed(decision, TASK_NOT_FOUND)?;

    if changes.is_empty() {
        return Err(ApiError::BadRequest("No fields to update"));
    }

    let task = state
        .tasks
        .update(task_id, changes)
        .await?
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))?;

    Ok(Json(task.into()))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(task_id): Path<TaskId>,
) -> Result<StatusCode, ApiError> {
    let decision = state
        .engine
        .authorize(&principal, Action::Delete, ResourceRef::Task(task_id))
        .await?;
    ensure_allowed(decision, TASK_NOT_FOUND)?;

    if !state.tasks.delete(task_id).await? {
        return Err(ApiError::NotFound(TASK_NOT_FOUND));
    }

    tracing::info!(task_id = %task_id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}
