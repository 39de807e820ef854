//! Project CRUD, gated through the authorization engine.
//!
//! Handlers never inspect owner fields themselves: ownership questions go
//! through the engine (mutations/reads of one project) or the store's
//! owner-aware listing (index).

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_auth::{Action, OwnerRef, Principal, ResourceRef, resolve_owner};
use taskboard_core::{ProjectId, UserId};
use taskboard_storage::{ProjectRecord, ProjectStatus, ProjectUpdate};

use crate::error::{ApiError, ensure_allowed};
use crate::state::AppState;

const PROJECT_NOT_FOUND: &str = "Project not found";

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: String,
    pub deadline: DateTime<Utc>,
    #[serde(default = "default_status")]
    pub status: ProjectStatus,
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Pending
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub name: Option<String>,
    pub description: String,
    pub status: ProjectStatus,
    pub deadline: DateTime<Utc>,
    /// Resolved owner, whichever field the record stores it under.
    pub author_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRecord> for ProjectResponse {
    fn from(project: ProjectRecord) -> Self {
        let author_id = match resolve_owner(&project.owner_fields()) {
            OwnerRef::Resolved(owner) => Some(owner),
            OwnerRef::Undefined => None,
        };

        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            status: project.status,
            deadline: project.deadline,
            author_id,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let now = Utc::now();
    let project = ProjectRecord {
        id: ProjectId::new(),
        name: body.name,
        description: body.description,
        status: body.status,
        deadline: body.deadline,
        author_id: Some(principal.id),
        user_id: None,
        created_at: now,
        updated_at: now,
    };

    state.projects.insert(project.clone()).await?;
    tracing::info!(project_id = %project.id, owner = %principal.id, "project created");

    Ok(Json(project.into()))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = if principal.role.is_admin() {
        state.projects.list_all().await?
    } else {
        state.projects.list_owned_by(principal.id).await?
    };

    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let decision = state
        .engine
        .authorize(&principal, Action::Read, ResourceRef::Project(project_id))
        .await?;
    ensure_allowed(decision, PROJECT_NOT_FOUND)?;

    let project = state
        .projects
        .find_by_id(project_id)
        .await?
        .ok_or(ApiError::NotFound(PROJECT_NOT_FOUND))?;

    Ok(Json(project.into()))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<ProjectId>,
    Json(changes): Json<ProjectUpdate>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let decision = state
        .engine
        .authorize(&principal, Action::Write, ResourceRef::Project(project_id))
        .await?;
    ensure_allowed(decision, PROJECT_NOT_FOUND)?;

    if changes.is_empty() {
        return Err(ApiError::BadRequest("No fields to update"));
    }

    let project = state
        .projects
        .update(project_id, changes)
        .await?
        .ok_or(ApiError::NotFound(PROJECT_NOT_FOUND))?;

    Ok(Json(project.into()))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<ProjectId>,
) -> Result<StatusCode, ApiError> {
    let decision = state
        .engine
        .authorize(&principal, Action::Delete, ResourceRef::Project(project_id))
        .await?;
    ensure_allowed(decision, PROJECT_NOT_FOUND)?;

    if !state.projects.delete(project_id).await? {
        return Err(ApiError::NotFound(PROJECT_NOT_FOUND));
    }

    tracing::info!(project_id = %project_id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}
