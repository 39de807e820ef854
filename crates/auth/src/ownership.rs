//! Owner-field compatibility resolution.
//!
//! Project records historically stored their owner under `user_id`; current
//! records use `author_id`. Exactly one is authoritative per record, decided
//! by presence, with `author_id` winning when both exist. Rather than key
//! probing scattered through handlers, ownership resolves through one total
//! function with an explicit `Undefined` sentinel.

use serde::{Deserialize, Serialize};
use taskboard_core::UserId;

/// Raw owner fields of a stored project record, before resolution.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerFields {
    /// Current owner field.
    pub author_id: Option<UserId>,
    /// Legacy owner field.
    pub user_id: Option<UserId>,
}

impl OwnerFields {
    pub fn current(author_id: UserId) -> Self {
        Self {
            author_id: Some(author_id),
            user_id: None,
        }
    }

    pub fn legacy(user_id: UserId) -> Self {
        Self {
            author_id: None,
            user_id: Some(user_id),
        }
    }
}

/// Resolved owner reference of a resource.
///
/// `Undefined` means the record carries neither owner field. The policy
/// engine must treat it as fail-closed (deny), never as "no restriction".
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OwnerRef {
    Resolved(UserId),
    Undefined,
}

impl OwnerRef {
    /// Whether this reference resolves to the given user.
    ///
    /// `Undefined` matches nobody.
    pub fn is(&self, id: UserId) -> bool {
        matches!(self, OwnerRef::Resolved(owner) if *owner == id)
    }
}

/// Resolve which owner field is authoritative for a record.
///
/// Total: always returns a value, never panics.
pub fn resolve_owner(fields: &OwnerFields) -> OwnerRef {
    match (fields.author_id, fields.user_id) {
        (Some(owner), _) => OwnerRef::Resolved(owner),
        (None, Some(owner)) => OwnerRef::Resolved(owner),
        (None, None) => OwnerRef::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_field_wins_over_legacy() {
        let current = UserId::new();
        let legacy = UserId::new();
        let fields = OwnerFields {
            author_id: Some(current),
            user_id: Some(legacy),
        };

        assert_eq!(resolve_owner(&fields), OwnerRef::Resolved(current));
    }

    #[test]
    fn legacy_only_record_resolves_to_same_owner_as_current_only() {
        let owner = UserId::new();

        let via_current = resolve_owner(&OwnerFields::current(owner));
        let via_legacy = resolve_owner(&OwnerFields::legacy(owner));

        assert_eq!(via_current, via_legacy);
        assert!(via_legacy.is(owner));
    }

    #[test]
    fn missing_both_fields_is_undefined() {
        let resolved = resolve_owner(&OwnerFields::default());

        assert_eq!(resolved, OwnerRef::Undefined);
        assert!(!resolved.is(UserId::new()));
    }
}
