//! Async composition of the policy table with injected lookups.
//!
//! Existence is established first, then permission on the existing
//! resource: an unknown id is `NotFound` regardless of who asks, and a
//! task whose parent project no longer resolves is `NotFound` too (fail
//! closed, never fall back to any owner).

use std::sync::Arc;

use taskboard_core::{ProjectId, TaskId};

use crate::{
    Action, Decision, DirectoryError, Principal, ProjectDirectory, ProjectSnapshot, TaskDirectory,
    TaskSnapshot, authorize_project, authorize_task, resolve_owner,
};

/// Resource targeted by an authorization check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    Project(ProjectId),
    Task(TaskId),
}

/// Per-request authorization over injected project/task lookups.
///
/// Stateless and shareable: every call is independent, so concurrent
/// requests need no coordination beyond the `Arc`s.
#[derive(Clone)]
pub struct AuthorizationEngine {
    projects: Arc<dyn ProjectDirectory>,
    tasks: Arc<dyn TaskDirectory>,
}

impl AuthorizationEngine {
    pub fn new(projects: Arc<dyn ProjectDirectory>, tasks: Arc<dyn TaskDirectory>) -> Self {
        Self { projects, tasks }
    }

    /// Decide whether `principal` may perform `action` on `resource`.
    ///
    /// `Err` is reserved for lookup infrastructure failures; policy
    /// outcomes (including `NotFound`) come back as `Ok(Decision)`.
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        resource: ResourceRef,
    ) -> Result<Decision, DirectoryError> {
        match resource {
            ResourceRef::Project(id) => {
                let Some(fields) = self.projects.project_owner_fields(id).await? else {
                    return Ok(Decision::NotFound);
                };

                let snapshot = ProjectSnapshot {
                    owner: resolve_owner(&fields),
                };
                Ok(authorize_project(principal, action, &snapshot))
            }
            ResourceRef::Task(id) => {
                let Some(link) = self.tasks.task_link(id).await? else {
                    return Ok(Decision::NotFound);
                };

                // Dangling parent project: the task is in an inconsistent
                // state and must read as not-found.
                let Some(fields) = self.projects.project_owner_fields(link.project_id).await?
                else {
                    tracing::warn!(task_id = %id, project_id = %link.project_id,
                        "task references a missing project");
                    return Ok(Decision::NotFound);
                };

                let snapshot = TaskSnapshot {
                    project_owner: resolve_owner(&fields),
                    assigned_to: link.assigned_to,
                };
                Ok(authorize_task(principal, action, &snapshot))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use taskboard_core::UserId;

    use super::*;
    use crate::{OwnerFields, Role, TaskLink};

    #[derive(Default)]
    struct StubWorld {
        projects: HashMap<ProjectId, OwnerFields>,
        tasks: HashMap<TaskId, TaskLink>,
    }

    #[async_trait]
    impl ProjectDirectory for StubWorld {
        async fn project_owner_fields(
            &self,
            id: ProjectId,
        ) -> Result<Option<OwnerFields>, DirectoryError> {
            Ok(self.projects.get(&id).copied())
        }
    }

    #[async_trait]
    impl TaskDirectory for StubWorld {
        async fn task_link(&self, id: TaskId) -> Result<Option<TaskLink>, DirectoryError> {
            Ok(self.tasks.get(&id).copied())
        }
    }

    fn engine(world: StubWorld) -> AuthorizationEngine {
        let world = Arc::new(world);
        AuthorizationEngine::new(world.clone(), world)
    }

    #[tokio::test]
    async fn unknown_project_is_not_found_even_for_admin() {
        let engine = engine(StubWorld::default());
        let admin = Principal::new(UserId::new(), Role::Admin);

        let decision = engine
            .authorize(&admin, Action::Write, ResourceRef::Project(ProjectId::new()))
            .await
            .unwrap();

        assert_eq!(decision, Decision::NotFound);
    }

    #[tokio::test]
    async fn leader_write_own_and_foreign_project() {
        let leader = Principal::new(UserId::new(), Role::Leader);
        let own = ProjectId::new();
        let foreign = ProjectId::new();

        let mut world = StubWorld::default();
        world.projects.insert(own, OwnerFields::current(leader.id));
        world.projects.insert(foreign, OwnerFields::current(UserId::new()));
        let engine = engine(world);

        assert_eq!(
            engine
                .authorize(&leader, Action::Write, ResourceRef::Project(own))
                .await
                .unwrap(),
            Decision::Allow
        );
        assert_eq!(
            engine
                .authorize(&leader, Action::Write, ResourceRef::Project(foreign))
                .await
                .unwrap(),
            Decision::Deny("not your project")
        );
    }

    #[tokio::test]
    async fn legacy_owner_field_authorizes_like_current_one() {
        let leader = Principal::new(UserId::new(), Role::Leader);
        let legacy = ProjectId::new();

        let mut world = StubWorld::default();
        world.projects.insert(legacy, OwnerFields::legacy(leader.id));
        let engine = engine(world);

        assert_eq!(
            engine
                .authorize(&leader, Action::Delete, ResourceRef::Project(legacy))
                .await
                .unwrap(),
            Decision::Allow
        );
    }

    #[tokio::test]
    async fn task_with_dangling_project_is_not_found_not_deny() {
        let leader = Principal::new(UserId::new(), Role::Leader);
        let task_id = TaskId::new();

        let mut world = StubWorld::default();
        world.tasks.insert(
            task_id,
            TaskLink {
                project_id: ProjectId::new(),
                assigned_to: Some(leader.id),
            },
        );
        let engine = engine(world);

        let decision = engine
            .authorize(&leader, Action::Read, ResourceRef::Task(task_id))
            .await
            .unwrap();

        assert_eq!(decision, Decision::NotFound);
    }

    #[tokio::test]
    async fn assignee_reads_but_cannot_write_task() {
        let assignee = Principal::new(UserId::new(), Role::User);
        let owner = UserId::new();
        let project_id = ProjectId::new();
        let task_id = TaskId::new();

        let mut world = StubWorld::default();
        world.projects.insert(project_id, OwnerFields::current(owner));
        world.tasks.insert(
            task_id,
            TaskLink {
                project_id,
                assigned_to: Some(assignee.id),
            },
        );
        let engine = engine(world);

        assert_eq!(
            engine
                .authorize(&assignee, Action::Read, ResourceRef::Task(task_id))
                .await
                .unwrap(),
            Decision::Allow
        );
        assert_eq!(
            engine
                .authorize(&assignee, Action::Write, ResourceRef::Task(task_id))
                .await
                .unwrap(),
            Decision::Deny("permission denied")
        );
    }
}
