use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::serde_input::{
    deserialize_blank_as_none, deserialize_option_date, deserialize_timestamp,
};

/// A medication prescribed to a child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub child_id: String,
    pub medication_name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationInput {
    pub child_id: String,
    pub medication_name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl MedicationInput {
    pub fn validate(&self) -> Result<()> {
        if self.child_id.trim().is_empty() {
            return Err(ValidationError::MissingField("Child".to_string()).into());
        }
        if self.medication_name.trim().is_empty() {
            return Err(ValidationError::MissingField("Medication name".to_string()).into());
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ValidationError::InvalidInput(
                    "End date cannot be before start date.".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }
}

/// One administration of a medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationLog {
    pub id: String,
    pub medication_id: String,
    #[serde(default)]
    pub child_id: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub administered_at: DateTime<Utc>,
    #[serde(default)]
    pub administered_by_staff_id: Option<String>,
    #[serde(default)]
    pub dosage_given: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationLogInput {
    pub medication_id: String,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub child_id: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub administered_at: DateTime<Utc>,
    #[serde(default)]
    pub dosage_given: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}
