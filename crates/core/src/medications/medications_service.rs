use std::sync::Arc;

use serde::Serialize;

use super::medications_model::{MedicationInput, MedicationLogInput};
use crate::backend::{RecordStore, Repository, Table};
use crate::errors::{Result, ValidationError};
use crate::session::CurrentUser;

#[derive(Serialize)]
struct MedicationLogRecord {
    #[serde(flatten)]
    input: MedicationLogInput,
    administered_by_staff_id: String,
}

/// Service for medications and their administration logs.
pub struct MedicationService {
    medications: Repository,
    logs: Repository,
}

impl MedicationService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            medications: Repository::new(store.clone(), Table::Medications),
            logs: Repository::new(store, Table::MedicationLogs),
        }
    }

    pub async fn create_medication(&self, input: MedicationInput) -> Result<()> {
        input.validate()?;
        self.medications.insert(&input).await?;
        Ok(())
    }

    pub async fn update_medication(&self, medication_id: &str, input: MedicationInput) -> Result<()> {
        input.validate()?;
        self.medications.update(medication_id, &input).await
    }

    pub async fn delete_medication(&self, medication_id: &str) -> Result<()> {
        self.medications.delete(medication_id).await
    }

    /// Records an administration by the acting staff member.
    pub async fn log_administration(
        &self,
        input: MedicationLogInput,
        actor: &CurrentUser,
    ) -> Result<()> {
        let staff_id = actor.staff_id.clone().ok_or_else(|| {
            ValidationError::InvalidInput(
                "Cannot log medication: Staff profile not loaded or staff ID missing.".to_string(),
            )
        })?;
        if input.medication_id.trim().is_empty() {
            return Err(ValidationError::MissingField("Medication".to_string()).into());
        }
        let record = MedicationLogRecord {
            input,
            administered_by_staff_id: staff_id,
        };
        self.logs.insert(&record).await?;
        Ok(())
    }
}
