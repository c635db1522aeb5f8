use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Roles are ordered so that a higher role includes every lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Viewer, // Read-only access
    Editor, // Can manage products and images
    Admin,  // Full control, including users
}

impl Role {
    /// Check if this role has at least the permissions of the given role
    pub fn has_permission(&self, required: Role) -> bool {
        *self >= required
    }

    pub fn can_edit(&self) -> bool {
        self.has_permission(Role::Editor)
    }

    pub fn can_manage_users(&self) -> bool {
        *self == Role::Admin
    }

    pub fn all() -> Vec<Role> {
        vec![Role::Viewer, Role::Editor, Role::Admin]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            other => Err(format!(
                "Invalid role '{}'. Must be: viewer, editor, or admin",
                other
            )),
        }
    }
}
