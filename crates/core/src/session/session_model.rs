//! Session and role models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role the acting identity resolved to.
///
/// `Unknown` means there is no identity. `UnknownProfile` means the identity
/// has no staff or parent row. `ExceptionProfile` means resolution faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
    Assistant,
    Parent,
    Unknown,
    UnknownProfile,
    ExceptionProfile,
}

impl Role {
    /// True for roles that have a portal.
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            Role::Admin | Role::Teacher | Role::Assistant | Role::Parent
        )
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Teacher | Role::Assistant)
    }

    /// Maps a staff row's role column, case-insensitively. Anything other
    /// than admin, teacher or assistant is `None`.
    pub fn from_staff_role(raw: &str) -> Option<Role> {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Assistant => "assistant",
            Role::Parent => "parent",
            Role::Unknown => "unknown",
            Role::UnknownProfile => "unknown_profile",
            Role::ExceptionProfile => "exception_profile",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting identity plus the profile it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
    pub display_name: String,
    /// Staff or parent row id.
    pub profile_id: Option<String>,
    /// Set only for staff roles.
    pub staff_id: Option<String>,
}

impl CurrentUser {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff() && self.staff_id.is_some()
    }
}

/// Serializable view of the console session for hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub signed_in: bool,
    pub role: Role,
    pub user: Option<CurrentUser>,
}
