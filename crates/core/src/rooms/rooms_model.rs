use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::serde_input::deserialize_option_i32;

/// A room row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_option_i32")]
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInput {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_option_i32")]
    pub capacity: Option<i32>,
}

impl RoomInput {
    pub fn new(name: impl Into<String>, capacity: i32) -> Self {
        Self {
            name: name.into(),
            capacity: Some(capacity),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("Room name".to_string()).into());
        }
        match self.capacity {
            None => Err(ValidationError::MissingField("Capacity".to_string()).into()),
            Some(c) if c < 0 => Err(ValidationError::InvalidInput(
                "Capacity cannot be negative.".to_string(),
            )
            .into()),
            Some(_) => Ok(()),
        }
    }
}
