//! Postgres-backed stores.
//!
//! Uses the non-macro sqlx query API with manual row mapping: id newtypes
//! and the role/status enums are stored as UUID/TEXT columns and decoded
//! here. A value that fails to decode is surfaced as `StoreError::Corrupt`
//! rather than silently skipped.

use core::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use taskboard_auth::{
    DirectoryError, OwnerFields, ProjectDirectory, Role, TaskDirectory, TaskLink, UserDirectory,
};
use taskboard_core::{ProjectId, TaskId, UserId};
use uuid::Uuid;

use crate::records::{
    ProjectRecord, ProjectStatus, ProjectUpdate, TaskPriority, TaskRecord, TaskStatus, TaskUpdate,
    UserRecord, UserUpdate,
};
use crate::store::{ProjectStore, StoreError, TaskFilter, TaskStore, UserStore};

fn map_sqlx_error(op: &str, e: sqlx::Error) -> StoreError {
    tracing::error!("{op} failed: {e}");
    StoreError::Backend(format!("{op}: {e}"))
}

fn corrupt(e: impl core::fmt::Display) -> StoreError {
    StoreError::Corrupt(e.to_string())
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, StoreError> {
    let role: String = row.try_get("role").map_err(corrupt)?;

    Ok(UserRecord {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(corrupt)?),
        name: row.try_get("name").map_err(corrupt)?,
        email: row.try_get("email").map_err(corrupt)?,
        role: Role::from_str(&role).map_err(corrupt)?,
        hashed_password: row.try_get("hashed_password").map_err(corrupt)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(corrupt)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(corrupt)?,
    })
}

fn project_from_row(row: &PgRow) -> Result<ProjectRecord, StoreError> {
    let status: String = row.try_get("status").map_err(corrupt)?;

    Ok(ProjectRecord {
        id: ProjectId::from_uuid(row.try_get::<Uuid, _>("id").map_err(corrupt)?),
        name: row.try_get("name").map_err(corrupt)?,
        description: row.try_get("description").map_err(corrupt)?,
        status: ProjectStatus::from_str(&status).map_err(corrupt)?,
        deadline: row.try_get::<DateTime<Utc>, _>("deadline").map_err(corrupt)?,
        author_id: row
            .try_get::<Option<Uuid>, _>("author_id")
            .map_err(corrupt)?
            .map(UserId::from_uuid),
        user_id: row
            .try_get::<Option<Uuid>, _>("user_id")
            .map_err(corrupt)?
            .map(UserId::from_uuid),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(corrupt)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(corrupt)?,
    })
}

fn task_from_row(row: &PgRow) -> Result<TaskRecord, StoreError> {
    let status: String = row.try_get("status").map_err(corrupt)?;
    let priority: String = row.try_get("priority").map_err(corrupt)?;

    Ok(TaskRecord {
        id: TaskId::from_uuid(row.try_get::<Uuid, _>("id").map_err(corrupt)?),
        project_id: ProjectId::from_uuid(row.try_get::<Uuid, _>("project_id").map_err(corrupt)?),
        title: row.try_get("title").map_err(corrupt)?,
        description: row.try_get("description").map_err(corrupt)?,
        status: TaskStatus::from_str(&status).map_err(corrupt)?,
        priority: TaskPriority::from_str(&priority).map_err(corrupt)?,
        due_date: row.try_get::<DateTime<Utc>, _>("due_date").map_err(corrupt)?,
        assigned_to: row
            .try_get::<Option<Uuid>, _>("assigned_to")
            .map_err(corrupt)?
            .map(UserId::from_uuid),
        created_by: UserId::from_uuid(row.try_get::<Uuid, _>("created_by").map_err(corrupt)?),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(corrupt)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(corrupt)?,
    })
}

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.find_by_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.find_by_email", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, hashed_password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.hashed_password)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.insert", e))?;

        Ok(())
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserUpdate,
    ) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role.map(|r| r.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.update", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.list", e))?;

        rows.iter().map(user_from_row).collect()
    }
}

#[async_trait]
impl UserDirectory for PostgresUserStore {
    async fn user_exists(&self, id: UserId) -> Result<bool, DirectoryError> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct PostgresProjectStore {
    pool: PgPool,
}

impl PostgresProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PostgresProjectStore {
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<ProjectRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("projects.find_by_id", e))?;

        row.as_ref().map(project_from_row).transpose()
    }

    async fn insert(&self, project: ProjectRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO projects
                (id, name, description, status, deadline, author_id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(project.id.as_uuid())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.deadline)
        .bind(project.author_id.map(|u| *u.as_uuid()))
        .bind(project.user_id.map(|u| *u.as_uuid()))
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("projects.insert", e))?;

        Ok(())
    }

    async fn update(
        &self,
        id: ProjectId,
        changes: ProjectUpdate,
    ) -> Result<Option<ProjectRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                deadline = COALESCE($5, deadline),
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.deadline)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("projects.update", e))?;

        row.as_ref().map(project_from_row).transpose()
    }

    async fn delete(&self, id: ProjectId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("projects.delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM projects ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("projects.list_all", e))?;

        rows.iter().map(project_from_row).collect()
    }

    async fn list_owned_by(&self, owner: UserId) -> Result<Vec<ProjectRecord>, StoreError> {
        // author_id is authoritative when present; the legacy user_id
        // column only counts when author_id is absent.
        let rows = sqlx::query(
            r#"
            SELECT * FROM projects
            WHERE author_id = $1 OR (author_id IS NULL AND user_id = $1)
            ORDER BY created_at
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("projects.list_owned_by", e))?;

        rows.iter().map(project_from_row).collect()
    }
}

#[async_trait]
impl ProjectDirectory for PostgresProjectStore {
    async fn project_owner_fields(
        &self,
        id: ProjectId,
    ) -> Result<Option<OwnerFields>, DirectoryError> {
        let row = sqlx::query("SELECT author_id, user_id FROM projects WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DirectoryError::new(format!("projects.owner_fields: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let author_id = row
            .try_get::<Option<Uuid>, _>("author_id")
            .map_err(|e| DirectoryError::new(e.to_string()))?;
        let user_id = row
            .try_get::<Option<Uuid>, _>("user_id")
            .map_err(|e| DirectoryError::new(e.to_string()))?;

        Ok(Some(OwnerFields {
            author_id: author_id.map(UserId::from_uuid),
            user_id: user_id.map(UserId::from_uuid),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: PgPool,
}

impl PostgresTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn find_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("tasks.find_by_id", e))?;

        row.as_ref().map(task_from_row).transpose()
    }

    async fn insert(&self, task: TaskRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tasks
                (id, project_id, title, description, status, priority, due_date,
                 assigned_to, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(task.id.as_uuid())
        .bind(task.project_id.as_uuid())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.assigned_to.map(|u| *u.as_uuid()))
        .bind(task.created_by.as_uuid())
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("tasks.insert", e))?;

        Ok(())
    }

    async fn update(
        &self,
        id: TaskId,
        changes: TaskUpdate,
    ) -> Result<Option<TaskRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                due_date = COALESCE($6, due_date),
                assigned_to = COALESCE($7, assigned_to),
                updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.priority.map(|p| p.as_str()))
        .bind(changes.due_date)
        .bind(changes.assigned_to.map(|u| *u.as_uuid()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("tasks.update", e))?;

        row.as_ref().map(task_from_row).transpose()
    }

    async fn delete(&self, id: TaskId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("tasks.delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: TaskFilter) -> Result<Vec<TaskRecord>, StoreError> {
        let rows = match (filter.project_id, filter.scope) {
            (None, None) => {
                sqlx::query("SELECT * FROM tasks ORDER BY created_at")
                    .fetch_all(&self.pool)
                    .await
            }
            (Some(project_id), None) => {
                sqlx::query("SELECT * FROM tasks WHERE project_id = $1 ORDER BY created_at")
                    .bind(project_id.as_uuid())
                    .fetch_all(&self.pool)
                    .await
            }
            (None, Some(scope)) => {
                let owned: Vec<Uuid> =
                    scope.owned_projects.iter().map(|p| *p.as_uuid()).collect();
                sqlx::query(
                    r#"
                    SELECT * FROM tasks
                    WHERE project_id = ANY($1) OR assigned_to = $2
                    ORDER BY created_at
                    "#,
                )
                .bind(owned)
                .bind(scope.assignee.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
            (Some(project_id), Some(scope)) => {
                let owned: Vec<Uuid> =
                    scope.owned_projects.iter().map(|p| *p.as_uuid()).collect();
                sqlx::query(
                    r#"
                    SELECT * FROM tasks
                    WHERE project_id = $1 AND (project_id = ANY($2) OR assigned_to = $3)
                    ORDER BY created_at
                    "#,
                )
                .bind(project_id.as_uuid())
                .bind(owned)
                .bind(scope.assignee.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| map_sqlx_error("tasks.list", e))?;

        rows.iter().map(task_from_row).collect()
    }
}

#[async_trait]
impl TaskDirectory for PostgresTaskStore {
    async fn task_link(&self, id: TaskId) -> Result<Option<TaskLink>, DirectoryError> {
        let row = sqlx::query("SELECT project_id, assigned_to FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DirectoryError::new(format!("tasks.task_link: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let project_id = row
            .try_get::<Uuid, _>("project_id")
            .map_err(|e| DirectoryError::new(e.to_string()))?;
        let assigned_to = row
            .try_get::<Option<Uuid>, _>("assigned_to")
            .map_err(|e| DirectoryError::new(e.to_string()))?;

        Ok(Some(TaskLink {
            project_id: ProjectId::from_uuid(project_id),
            assigned_to: assigned_to.map(UserId::from_uuid),
        }))
    }
}
