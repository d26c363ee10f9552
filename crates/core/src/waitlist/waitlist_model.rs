use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::serde_input::{
    deserialize_blank_as_none, deserialize_option_date, deserialize_option_timestamp,
};

/// Status of a waitlist entry. Read case-insensitively from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WaitlistStatus {
    #[default]
    Pending,
    Contacted,
    Enrolled,
    Withdrawn,
}

impl WaitlistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitlistStatus::Pending => "Pending",
            WaitlistStatus::Contacted => "Contacted",
            WaitlistStatus::Enrolled => "Enrolled",
            WaitlistStatus::Withdrawn => "Withdrawn",
        }
    }
}

impl FromStr for WaitlistStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(WaitlistStatus::Pending),
            "contacted" => Ok(WaitlistStatus::Contacted),
            "enrolled" => Ok(WaitlistStatus::Enrolled),
            "withdrawn" => Ok(WaitlistStatus::Withdrawn),
            _ => Err(format!("Unknown waitlist status '{}'", s)),
        }
    }
}

impl TryFrom<String> for WaitlistStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WaitlistStatus> for String {
    fn from(status: WaitlistStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for WaitlistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A waitlist row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: String,
    pub child_name: String,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub child_dob: Option<NaiveDate>,
    pub parent_name: String,
    #[serde(default)]
    pub parent_email: Option<String>,
    #[serde(default)]
    pub parent_phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub desired_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: WaitlistStatus,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Form payload. An `id` selects update, its absence insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistInput {
    #[serde(default, skip_serializing, deserialize_with = "deserialize_blank_as_none")]
    pub id: Option<String>,
    pub child_name: String,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub child_dob: Option<NaiveDate>,
    pub parent_name: String,
    #[serde(default)]
    pub parent_email: Option<String>,
    #[serde(default)]
    pub parent_phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub desired_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: WaitlistStatus,
}

impl WaitlistInput {
    pub fn validate(&self) -> Result<()> {
        if self.child_name.trim().is_empty() {
            return Err(ValidationError::MissingField("Child name".to_string()).into());
        }
        if self.parent_name.trim().is_empty() {
            return Err(ValidationError::MissingField("Parent name".to_string()).into());
        }
        Ok(())
    }
}
