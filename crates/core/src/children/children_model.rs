//! Child domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::serde_input::{
    deserialize_blank_as_none, deserialize_option_i32, deserialize_option_timestamp,
};
use crate::utils::text::{full_name, non_blank};

/// Parent columns embedded on a child row through `primary_parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentSummary {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ParentSummary {
    pub fn full_name(&self) -> String {
        full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// A child row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_option_i32")]
    pub age: Option<i32>,
    #[serde(default)]
    pub primary_parent_id: Option<String>,
    #[serde(default)]
    pub current_room_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub medical_info: Option<String>,
    #[serde(default)]
    pub billing_info: Option<String>,
    #[serde(default, rename = "parents")]
    pub parent: Option<ParentSummary>,
}

impl Child {
    /// Checked in iff there is a check-in time and no check-out time.
    pub fn is_checked_in(&self) -> bool {
        self.check_in_time.is_some() && self.check_out_time.is_none()
    }

    /// The update that flips the check-in state at `now`.
    ///
    /// A checked-in child keeps its check-in time and is checked out at
    /// `now`; otherwise the child is checked in at `now` and the check-out
    /// time is cleared.
    pub fn toggled_check_in(&self, now: DateTime<Utc>) -> CheckInUpdate {
        match self.check_in_time {
            Some(checked_in_at) if self.is_checked_in() => CheckInUpdate {
                check_in_time: checked_in_at,
                check_out_time: Some(now),
            },
            _ => CheckInUpdate {
                check_in_time: now,
                check_out_time: None,
            },
        }
    }
}

/// Patch written by the check-in toggle. `check_out_time` serializes as
/// `null` when cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInUpdate {
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
}

impl CheckInUpdate {
    pub fn checks_in(&self) -> bool {
        self.check_out_time.is_none()
    }
}

/// Form payload for creating or updating a child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildInput {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_option_i32")]
    pub age: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub primary_parent_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub current_room_id: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub medical_info: Option<String>,
    #[serde(default)]
    pub billing_info: Option<String>,
}

impl ChildInput {
    /// Trims the name and stores blank room and parent ids as null.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.primary_parent_id = non_blank(self.primary_parent_id.as_deref());
        self.current_room_id = non_blank(self.current_room_id.as_deref());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("Name".to_string()).into());
        }
        if self.primary_parent_id.is_none() {
            return Err(ValidationError::MissingField("Primary Parent".to_string()).into());
        }
        Ok(())
    }
}
