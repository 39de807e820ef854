//! In-memory stores for dev mode and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use taskboard_auth::{DirectoryError, OwnerFields, ProjectDirectory, TaskDirectory, TaskLink, UserDirectory};
use taskboard_core::{ProjectId, TaskId, UserId};

use crate::records::{
    ProjectRecord, ProjectUpdate, TaskRecord, TaskUpdate, UserRecord, UserUpdate,
};
use crate::store::{ProjectStore, StoreError, TaskFilter, TaskStore, UserStore};

fn lock_poisoned() -> StoreError {
    StoreError::Backend("store lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.inner.read().map_err(|_| lock_poisoned())?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| lock_poisoned())?
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        self.inner
            .write()
            .map_err(|_| lock_poisoned())?
            .insert(user.id, user);
        Ok(())
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserUpdate,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut inner = self.inner.write().map_err(|_| lock_poisoned())?;
        let Some(user) = inner.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .write()
            .map_err(|_| lock_poisoned())?
            .remove(&id)
            .is_some())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.inner.read().map_err(|_| lock_poisoned())?.values().cloned().collect())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserStore {
    async fn user_exists(&self, id: UserId) -> Result<bool, DirectoryError> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    inner: RwLock<HashMap<ProjectId, ProjectRecord>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<ProjectRecord>, StoreError> {
        Ok(self.inner.read().map_err(|_| lock_poisoned())?.get(&id).cloned())
    }

    async fn insert(&self, project: ProjectRecord) -> Result<(), StoreError> {
        self.inner
            .write()
            .map_err(|_| lock_poisoned())?
            .insert(project.id, project);
        Ok(())
    }

    async fn update(
        &self,
        id: ProjectId,
        changes: ProjectUpdate,
    ) -> Result<Option<ProjectRecord>, StoreError> {
        let mut inner = self.inner.write().map_err(|_| lock_poisoned())?;
        let Some(project) = inner.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            project.name = Some(name);
        }
        if let Some(description) = changes.description {
            project.description = description;
        }
        if let Some(status) = changes.status {
            project.status = status;
        }
        if let Some(deadline) = changes.deadline {
            project.deadline = deadline;
        }
        project.updated_at = Utc::now();

        Ok(Some(project.clone()))
    }

    async fn delete(&self, id: ProjectId) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .write()
            .map_err(|_| lock_poisoned())?
            .remove(&id)
            .is_some())
    }

    async fn list_all(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        Ok(self.inner.read().map_err(|_| lock_poisoned())?.values().cloned().collect())
    }

    async fn list_owned_by(&self, owner: UserId) -> Result<Vec<ProjectRecord>, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| lock_poisoned())?
            .values()
            .filter(|p| taskboard_auth::resolve_owner(&p.owner_fields()).is(owner))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProjectDirectory for InMemoryProjectStore {
    async fn project_owner_fields(
        &self,
        id: ProjectId,
    ) -> Result<Option<OwnerFields>, DirectoryError> {
        Ok(self.find_by_id(id).await?.map(|p| p.owner_fields()))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    inner: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        Ok(self.inner.read().map_err(|_| lock_poisoned())?.get(&id).cloned())
    }

    async fn insert(&self, task: TaskRecord) -> Result<(), StoreError> {
        self.inner
            .write()
            .map_err(|_| lock_poisoned())?
            .insert(task.id, task);
        Ok(())
    }

    async fn update(
        &self,
        id: TaskId,
        changes: TaskUpdate,
    ) -> Result<Option<TaskRecord>, StoreError> {
        let mut inner = self.inner.write().map_err(|_| lock_poisoned())?;
        let Some(task) = inner.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            task.due_date = due_date;
        }
        if let Some(assigned_to) = changes.assigned_to {
            task.assigned_to = Some(assigned_to);
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: TaskId) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .write()
            .map_err(|_| lock_poisoned())?
            .remove(&id)
            .is_some())
    }

    async fn list(&self, filter: TaskFilter) -> Result<Vec<TaskRecord>, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| lock_poisoned())?
            .values()
            .filter(|t| {
                if let Some(project_id) = filter.project_id {
                    if t.project_id != project_id {
                        return false;
                    }
                }
                if let Some(scope) = &filter.scope {
                    return scope.owned_projects.contains(&t.project_id)
                        || t.assigned_to == Some(scope.assignee);
                }
                true
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TaskDirectory for InMemoryTaskStore {
    async fn task_link(&self, id: TaskId) -> Result<Option<TaskLink>, DirectoryError> {
        Ok(self.find_by_id(id).await?.map(|t| TaskLink {
            project_id: t.project_id,
            assigned_to: t.assigned_to,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ProjectStatus, TaskPriority, TaskStatus};
    use crate::store::TaskScope;
    use taskboard_auth::Role;

    fn user(email: &str) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: UserId::new(),
            name: "Test".to_string(),
            email: email.to_string(),
            role: Role::User,
            hashed_password: "$2b$12$hash".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn project(author: Option<UserId>, legacy: Option<UserId>) -> ProjectRecord {
        let now = Utc::now();
        ProjectRecord {
            id: ProjectId::new(),
            name: Some("Website".to_string()),
            description: "Rebuild the site".to_string(),
            status: ProjectStatus::Pending,
            deadline: now,
            author_id: author,
            user_id: legacy,
            created_at: now,
            updated_at: now,
        }
    }

    fn task(project_id: ProjectId, assigned_to: Option<UserId>) -> TaskRecord {
        let now = Utc::now();
        TaskRecord {
            id: TaskId::new(),
            project_id,
            title: "Write copy".to_string(),
            description: "Landing page copy".to_string(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            due_date: now,
            assigned_to,
            created_by: UserId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn user_store_round_trip_and_email_lookup() {
        let store = InMemoryUserStore::new();
        let u = user("alice@example.com");
        store.insert(u.clone()).await.unwrap();

        assert_eq!(store.find_by_id(u.id).await.unwrap(), Some(u.clone()));
        assert_eq!(
            store.find_by_email("alice@example.com").await.unwrap(),
            Some(u.clone())
        );
        assert!(store.delete(u.id).await.unwrap());
        assert_eq!(store.find_by_id(u.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_owned_by_covers_both_owner_fields() {
        let owner = UserId::new();
        let store = InMemoryProjectStore::new();
        store.insert(project(Some(owner), None)).await.unwrap();
        store.insert(project(None, Some(owner))).await.unwrap();
        store.insert(project(Some(UserId::new()), None)).await.unwrap();

        let owned = store.list_owned_by(owner).await.unwrap();
        assert_eq!(owned.len(), 2);
    }

    #[tokio::test]
    async fn task_scope_filters_owned_or_assigned() {
        let me = UserId::new();
        let my_project = ProjectId::new();
        let other_project = ProjectId::new();

        let store = InMemoryTaskStore::new();
        store.insert(task(my_project, None)).await.unwrap();
        store.insert(task(other_project, Some(me))).await.unwrap();
        store.insert(task(other_project, None)).await.unwrap();

        let visible = store
            .list(TaskFilter {
                project_id: None,
                scope: Some(TaskScope {
                    owned_projects: vec![my_project],
                    assignee: me,
                }),
            })
            .await
            .unwrap();

        assert_eq!(visible.len(), 2);
    }

    #[tokio::test]
    async fn update_is_partial() {
        let store = InMemoryProjectStore::new();
        let p = project(Some(UserId::new()), None);
        store.insert(p.clone()).await.unwrap();

        let updated = store
            .update(
                p.id,
                ProjectUpdate {
                    status: Some(ProjectStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, ProjectStatus::Completed);
        assert_eq!(updated.description, p.description);
    }
}
