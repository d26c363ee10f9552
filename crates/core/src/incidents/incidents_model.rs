//! Incident report domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::serde_input::{deserialize_blank_as_none, deserialize_timestamp};

/// Status of an incident. Read case-insensitively from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IncidentStatus {
    #[default]
    Open,
    UnderReview,
    Resolved,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Open => "Open",
            IncidentStatus::UnderReview => "Under Review",
            IncidentStatus::Resolved => "Resolved",
        }
    }
}

impl FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "open" => Ok(IncidentStatus::Open),
            "under review" => Ok(IncidentStatus::UnderReview),
            "resolved" => Ok(IncidentStatus::Resolved),
            _ => Err(format!("Unknown incident status '{}'", s)),
        }
    }
}

impl TryFrom<String> for IncidentStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IncidentStatus> for String {
    fn from(status: IncidentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incident report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub id: String,
    #[serde(default)]
    pub child_id: Option<String>,
    #[serde(default)]
    pub reported_by_staff_id: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub incident_datetime: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    pub description: String,
    #[serde(default)]
    pub actions_taken: Option<String>,
    #[serde(default)]
    pub parent_notified: bool,
    #[serde(default)]
    pub status: IncidentStatus,
}

/// Form payload for logging an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentInput {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub child_id: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub incident_datetime: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    pub description: String,
    #[serde(default)]
    pub actions_taken: Option<String>,
    #[serde(default)]
    pub parent_notified: bool,
    #[serde(default)]
    pub status: IncidentStatus,
}

impl IncidentInput {
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("Description".to_string()).into());
        }
        Ok(())
    }
}
