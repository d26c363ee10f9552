//! Staff domain models.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::session::Role;
use crate::utils::serde_input::deserialize_blank_as_none;
use crate::utils::text::non_blank;

/// A staff row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub main_room_id: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl StaffMember {
    /// Role column mapped case-insensitively; `None` when unrecognized.
    pub fn staff_role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::from_staff_role)
    }
}

/// Form payload for creating or updating a staff member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffInput {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub main_room_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub phone_number: Option<String>,
}

impl StaffInput {
    /// Lower-cases the role. Only teachers keep a main room.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.role = self.role.trim().to_lowercase();
        self.main_room_id = if self.role == "teacher" {
            non_blank(self.main_room_id.as_deref())
        } else {
            None
        };
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingField("Name".to_string()).into());
        }
        if self.email.is_empty() {
            return Err(ValidationError::MissingField("Email".to_string()).into());
        }
        match Role::from_staff_role(&self.role) {
            None => Err(ValidationError::InvalidInput(format!(
                "Role must be admin, teacher or assistant (got '{}').",
                self.role
            ))
            .into()),
            Some(Role::Teacher) if self.main_room_id.is_none() => Err(
                ValidationError::InvalidInput("A teacher must have a main room.".to_string())
                    .into(),
            ),
            Some(_) => Ok(()),
        }
    }
}
