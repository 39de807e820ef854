use serde::{Deserialize, Serialize};
use taskboard_core::UserId;

use crate::Role;

/// The authenticated identity making a request.
///
/// Ephemeral: derived per-request from a verified token plus a user-store
/// lookup, never persisted. Immutable for the lifetime of the request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}
