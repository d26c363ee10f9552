//! Daily report domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, ValidationError};
use crate::utils::serde_input::{deserialize_date, deserialize_null_as_empty};

/// A daily report row. Reports are never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub id: String,
    pub child_id: String,
    #[serde(default)]
    pub staff_id: Option<String>,
    #[serde(deserialize_with = "deserialize_date")]
    pub report_date: NaiveDate,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub meals: Option<String>,
    /// Nap entries exactly as the form recorded them.
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub naps: Vec<Value>,
    #[serde(default)]
    pub activities: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo_url_1: Option<String>,
    #[serde(default)]
    pub photo_url_2: Option<String>,
}

impl DailyReport {
    /// Photo URLs in slot order, skipping empty slots.
    pub fn photo_urls(&self) -> Vec<&str> {
        [self.photo_url_1.as_deref(), self.photo_url_2.as_deref()]
            .into_iter()
            .flatten()
            .filter(|url| !url.is_empty())
            .collect()
    }
}

/// Form payload for a new daily report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReportInput {
    pub child_id: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub report_date: NaiveDate,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub meals: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub naps: Vec<Value>,
    #[serde(default)]
    pub activities: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DailyReportInput {
    pub fn new(child_id: impl Into<String>, report_date: NaiveDate) -> Self {
        Self {
            child_id: child_id.into(),
            report_date,
            mood: None,
            meals: None,
            naps: Vec::new(),
            activities: None,
            notes: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.child_id.trim().is_empty() {
            return Err(ValidationError::MissingField("Child".to_string()).into());
        }
        Ok(())
    }
}

/// Row written to the store: the form plus the stamped author and photos.
#[derive(Debug, Serialize)]
pub(super) struct DailyReportRecord {
    #[serde(flatten)]
    pub input: DailyReportInput,
    pub staff_id: String,
    pub photo_url_1: Option<String>,
    pub photo_url_2: Option<String>,
}
