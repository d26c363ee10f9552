use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::text::full_name;

/// A parent row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province_state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Parent {
    pub fn full_name(&self) -> String {
        full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// Form payload for creating or updating a parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province_state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl ParentInput {
    pub fn normalized(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_name.is_empty() {
            return Err(ValidationError::MissingField("First name".to_string()).into());
        }
        if self.last_name.is_empty() {
            return Err(ValidationError::MissingField("Last name".to_string()).into());
        }
        if self.email.is_empty() {
            return Err(ValidationError::MissingField("Email".to_string()).into());
        }
        Ok(())
    }
}
