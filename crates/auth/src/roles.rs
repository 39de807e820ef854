use core::str::FromStr;

use serde::{Deserialize, Serialize};
use taskboard_core::DomainError;

/// Role of an authenticated principal.
///
/// The role set is closed: capabilities differ qualitatively between the
/// three roles (see the policy module), so this is a real enum rather
/// than an opaque string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Leader,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Leader => "leader",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "leader" => Ok(Role::Leader),
            "user" => Ok(Role::User),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}
