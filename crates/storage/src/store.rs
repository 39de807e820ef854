//! Store traits and the storage error model.

use async_trait::async_trait;
use taskboard_auth::DirectoryError;
use taskboard_core::{ProjectId, TaskId, UserId};
use thiserror::Error;

use crate::records::{
    ProjectRecord, ProjectUpdate, TaskRecord, TaskUpdate, UserRecord, UserUpdate,
};

/// Storage-layer failure.
///
/// "No such record" is not an error here: find/update/delete express it in
/// their return types, so callers cannot conflate missing data with a
/// broken store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored value could not be decoded into its record type.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for DirectoryError {
    fn from(err: StoreError) -> Self {
        DirectoryError::new(err.to_string())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError>;
    /// Apply a partial update; returns the updated record, `None` when the
    /// user does not exist.
    async fn update(&self, id: UserId, changes: UserUpdate)
        -> Result<Option<UserRecord>, StoreError>;
    /// Returns whether a record was deleted.
    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<ProjectRecord>, StoreError>;
    async fn insert(&self, project: ProjectRecord) -> Result<(), StoreError>;
    async fn update(
        &self,
        id: ProjectId,
        changes: ProjectUpdate,
    ) -> Result<Option<ProjectRecord>, StoreError>;
    async fn delete(&self, id: ProjectId) -> Result<bool, StoreError>;
    async fn list_all(&self) -> Result<Vec<ProjectRecord>, StoreError>;
    /// Projects owned by `owner` under either owner field.
    async fn list_owned_by(&self, owner: UserId) -> Result<Vec<ProjectRecord>, StoreError>;
}

/// Visibility scope for non-admin task listings: tasks in projects the
/// caller owns, plus tasks assigned to the caller.
#[derive(Debug, Clone)]
pub struct TaskScope {
    pub owned_projects: Vec<ProjectId>,
    pub assignee: UserId,
}

/// Filter for task listings. `None` everywhere means all tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub project_id: Option<ProjectId>,
    pub scope: Option<TaskScope>,
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError>;
    async fn insert(&self, task: TaskRecord) -> Result<(), StoreError>;
    async fn update(&self, id: TaskId, changes: TaskUpdate)
        -> Result<Option<TaskRecord>, StoreError>;
    async fn delete(&self, id: TaskId) -> Result<bool, StoreError>;
    async fn list(&self, filter: TaskFilter) -> Result<Vec<TaskRecord>, StoreError>;
}
