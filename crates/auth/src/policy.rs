//! The policy decision table.
//!
//! Pure functions over ownership snapshots: no IO, no panics, no business
//! logic beyond the table itself. Resource fetching (and existence checks)
//! happen in the engine before these run.

use serde::Serialize;
use taskboard_core::UserId;

use crate::{OwnerRef, Principal, Role};

/// Action requested against a resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
    Delete,
}

/// Three-way authorization outcome, returned by value.
///
/// `NotFound` and `Deny` are distinct on purpose: the caller maps them to
/// different HTTP statuses and must not conflate the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Decision {
    Allow,
    Deny(&'static str),
    NotFound,
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// What the table needs to know about a project.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProjectSnapshot {
    pub owner: OwnerRef,
}

/// What the table needs to know about a task. Ownership is indirect: it is
/// the owner of the parent project, already resolved by the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub project_owner: OwnerRef,
    pub assigned_to: Option<UserId>,
}

/// Decide an action on an existing project.
///
/// First match wins: admins pass unconditionally; write/delete requires the
/// LEADER role plus ownership; USER never gets write/delete regardless of
/// ownership; reads are owner-only for non-admins. An `Undefined` owner
/// (record with neither owner field) matches nobody and so denies.
pub fn authorize_project(
    principal: &Principal,
    action: Action,
    project: &ProjectSnapshot,
) -> Decision {
    if principal.role.is_admin() {
        return Decision::Allow;
    }

    match action {
        Action::Read => {
            if project.owner.is(principal.id) {
                Decision::Allow
            } else {
                Decision::Deny("not your project")
            }
        }
        Action::Write | Action::Delete => match principal.role {
            Role::Leader => {
                if project.owner.is(principal.id) {
                    Decision::Allow
                } else {
                    Decision::Deny("not your project")
                }
            }
            // Admin is handled by the unconditional allow above.
            Role::User | Role::Admin => Decision::Deny("permission denied"),
        },
    }
}

/// Decide an action on an existing task.
///
/// Same table as projects with two task-specific rows: the assignee may
/// read a task they own nothing of, and write/delete keys off the parent
/// project's owner.
pub fn authorize_task(principal: &Principal, action: Action, task: &TaskSnapshot) -> Decision {
    if principal.role.is_admin() {
        return Decision::Allow;
    }

    match action {
        Action::Read => {
            if task.project_owner.is(principal.id) || task.assigned_to == Some(principal.id) {
                Decision::Allow
            } else {
                Decision::Deny("not your project's task")
            }
        }
        Action::Write | Action::Delete => match principal.role {
            Role::Leader => {
                if task.project_owner.is(principal.id) {
                    Decision::Allow
                } else {
                    Decision::Deny("not your project's task")
                }
            }
            Role::User | Role::Admin => Decision::Deny("permission denied"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal::new(UserId::new(), role)
    }

    fn owned_by(p: &Principal) -> ProjectSnapshot {
        ProjectSnapshot {
            owner: OwnerRef::Resolved(p.id),
        }
    }

    fn owned_by_other() -> ProjectSnapshot {
        ProjectSnapshot {
            owner: OwnerRef::Resolved(UserId::new()),
        }
    }

    #[test]
    fn admin_allowed_everything() {
        let admin = principal(Role::Admin);
        let project = owned_by_other();
        let task = TaskSnapshot {
            project_owner: OwnerRef::Resolved(UserId::new()),
            assigned_to: None,
        };

        for action in [Action::Read, Action::Write, Action::Delete] {
            assert_eq!(authorize_project(&admin, action, &project), Decision::Allow);
            assert_eq!(authorize_task(&admin, action, &task), Decision::Allow);
        }
    }

    #[test]
    fn leader_writes_own_project_only() {
        let leader = principal(Role::Leader);

        assert_eq!(
            authorize_project(&leader, Action::Write, &owned_by(&leader)),
            Decision::Allow
        );
        assert_eq!(
            authorize_project(&leader, Action::Write, &owned_by_other()),
            Decision::Deny("not your project")
        );
        assert_eq!(
            authorize_project(&leader, Action::Delete, &owned_by_other()),
            Decision::Deny("not your project")
        );
    }

    #[test]
    fn leader_writes_task_via_parent_project_ownership() {
        let leader = principal(Role::Leader);

        let own_task = TaskSnapshot {
            project_owner: OwnerRef::Resolved(leader.id),
            assigned_to: None,
        };
        let other_task = TaskSnapshot {
            project_owner: OwnerRef::Resolved(UserId::new()),
            assigned_to: None,
        };

        assert_eq!(authorize_task(&leader, Action::Write, &own_task), Decision::Allow);
        assert_eq!(
            authorize_task(&leader, Action::Write, &other_task),
            Decision::Deny("not your project's task")
        );
    }

    #[test]
    fn user_never_writes_even_when_owner_or_assignee() {
        let user = principal(Role::User);

        let own_project = owned_by(&user);
        let assigned_task = TaskSnapshot {
            project_owner: OwnerRef::Resolved(UserId::new()),
            assigned_to: Some(user.id),
        };

        assert_eq!(
            authorize_project(&user, Action::Write, &own_project),
            Decision::Deny("permission denied")
        );
        assert_eq!(
            authorize_project(&user, Action::Delete, &own_project),
            Decision::Deny("permission denied")
        );
        assert_eq!(
            authorize_task(&user, Action::Write, &assigned_task),
            Decision::Deny("permission denied")
        );
    }

    #[test]
    fn owner_reads_project_others_denied() {
        let user = principal(Role::User);

        assert_eq!(
            authorize_project(&user, Action::Read, &owned_by(&user)),
            Decision::Allow
        );
        assert_eq!(
            authorize_project(&user, Action::Read, &owned_by_other()),
            Decision::Deny("not your project")
        );
    }

    #[test]
    fn assignee_reads_task_they_own_nothing_of() {
        let assignee = principal(Role::User);
        let task = TaskSnapshot {
            project_owner: OwnerRef::Resolved(UserId::new()),
            assigned_to: Some(assignee.id),
        };

        assert_eq!(authorize_task(&assignee, Action::Read, &task), Decision::Allow);
        assert_eq!(
            authorize_task(&assignee, Action::Write, &task),
            Decision::Deny("permission denied")
        );
    }

    #[test]
    fn undefined_owner_denies_never_allows() {
        let leader = principal(Role::Leader);
        let project = ProjectSnapshot {
            owner: OwnerRef::Undefined,
        };

        assert_eq!(
            authorize_project(&leader, Action::Read, &project),
            Decision::Deny("not your project")
        );
        assert_eq!(
            authorize_project(&leader, Action::Write, &project),
            Decision::Deny("not your project")
        );
    }
}
