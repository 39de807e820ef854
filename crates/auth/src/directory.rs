//! Lookup capabilities this crate must be given.
//!
//! The auth core never owns storage. Callers inject these traits (backed
//! by whatever store the process uses) and the engine treats them as
//! read-only snapshots of the world at authorization time.

use async_trait::async_trait;
use taskboard_core::{ProjectId, TaskId, UserId};
use thiserror::Error;

use crate::OwnerFields;

/// A lookup failed for infrastructure reasons (not "no such record").
///
/// "No such record" is modeled as `Ok(None)`; this error is reserved for
/// the store being unreachable or returning garbage.
#[derive(Debug, Error)]
#[error("directory lookup failed: {0}")]
pub struct DirectoryError(pub String);

impl DirectoryError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// User existence lookup, used by the principal resolver.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, id: UserId) -> Result<bool, DirectoryError>;
}

/// Project ownership lookup.
///
/// Returns the raw owner fields of the record so the compatibility
/// resolver (not the store) decides which field is authoritative.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn project_owner_fields(
        &self,
        id: ProjectId,
    ) -> Result<Option<OwnerFields>, DirectoryError>;
}

/// What the engine needs to know about a task: its parent project and
/// who it is assigned to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TaskLink {
    pub project_id: ProjectId,
    pub assigned_to: Option<UserId>,
}

/// Task lookup.
#[async_trait]
pub trait TaskDirectory: Send + Sync {
    async fn task_link(&self, id: TaskId) -> Result<Option<TaskLink>, DirectoryError>;
}
