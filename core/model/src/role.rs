//! Roles, memberships and capabilities.

use serde::{Deserialize, Serialize};

use tascboard_common::UserId;

/// Role a user holds on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access.
    Viewer,
    /// May edit tracks and tascs.
    Member,
    /// May edit the board itself and manage members.
    Admin,
    /// Full control, including deleting the board.
    Owner,
}

/// An action that may be gated by a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewBoard,
    EditBoard,
    ManageMembers,
    EditTrack,
    EditTasc,
    DeleteBoard,
}

impl Role {
    /// Check whether this role grants a capability.
    pub fn grants(self, capability: Capability) -> bool {
        match capability {
            Capability::ViewBoard => true,
            Capability::EditTrack | Capability::EditTasc => self >= Role::Member,
            Capability::EditBoard | Capability::ManageMembers => self >= Role::Admin,
            Capability::DeleteBoard => self == Role::Owner,
        }
    }
}

/// A user's membership on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user: UserId,
    pub role: Role,
}

impl Membership {
    pub fn new(user: UserId, role: Role) -> Self {
        Self { user, role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_is_read_only() {
        assert!(Role::Viewer.grants(Capability::ViewBoard));
        assert!(!Role::Viewer.grants(Capability::EditTasc));
        assert!(!Role::Viewer.grants(Capability::EditBoard));
    }

    #[test]
    fn test_member_edits_work_items_only() {
        assert!(Role::Member.grants(Capability::EditTrack));
        assert!(Role::Member.grants(Capability::EditTasc));
        assert!(!Role::Member.grants(Capability::EditBoard));
        assert!(!Role::Member.grants(Capability::ManageMembers));
    }

    #[test]
    fn test_only_owner_deletes() {
        assert!(!Role::Admin.grants(Capability::DeleteBoard));
        assert!(Role::Owner.grants(Capability::DeleteBoard));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
