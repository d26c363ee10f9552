use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::serde_input::{deserialize_date, deserialize_option_date};

/// An announcement row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub publish_date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub author_staff_id: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementInput {
    pub title: String,
    pub content: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub publish_date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_published: bool,
}

impl AnnouncementInput {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("Title".to_string()).into());
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::MissingField("Content".to_string()).into());
        }
        Ok(())
    }
}
