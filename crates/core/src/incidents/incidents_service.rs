use std::sync::Arc;

use serde::Serialize;

use super::incidents_model::IncidentInput;
use crate::backend::{RecordStore, Repository, Table};
use crate::errors::{Result, ValidationError};
use crate::session::CurrentUser;

#[derive(Serialize)]
struct IncidentRecord {
    #[serde(flatten)]
    input: IncidentInput,
    reported_by_staff_id: String,
}

/// Service for logging incidents.
pub struct IncidentService {
    repository: Repository,
}

impl IncidentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            repository: Repository::new(store, Table::IncidentReports),
        }
    }

    /// Logs an incident reported by the acting staff member.
    pub async fn log_incident(&self, input: IncidentInput, actor: &CurrentUser) -> Result<()> {
        let staff_id = actor.staff_id.clone().ok_or_else(|| {
            ValidationError::InvalidInput(
                "Cannot log incident: Staff profile not loaded or staff ID missing.".to_string(),
            )
        })?;
        input.validate()?;
        let record = IncidentRecord {
            input,
            reported_by_staff_id: staff_id,
        };
        self.repository.insert(&record).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::incidents::IncidentStatus;
    use crate::session::Role;
    use chrono::Utc;

    #[tokio::test]
    async fn incident_is_stamped_with_reporter() {
        let memory = InMemoryBackend::new();
        let service = IncidentService::new(memory.backend().records);
        let actor = CurrentUser {
            user_id: "u1".to_string(),
            email: None,
            role: Role::Admin,
            display_name: "Ada".to_string(),
            profile_id: Some("s9".to_string()),
            staff_id: Some("s9".to_string()),
        };
        let input = IncidentInput {
            child_id: Some("c1".to_string()),
            incident_datetime: Utc::now(),
            location: Some("Playground".to_string()),
            description: "Scraped knee".to_string(),
            actions_taken: None,
            parent_notified: true,
            status: IncidentStatus::Open,
        };

        service.log_incident(input, &actor).await.unwrap();

        let row = &memory.rows(Table::IncidentReports)[0];
        assert_eq!(row["reported_by_staff_id"], "s9");
        assert_eq!(row["status"], "Open");
    }
}
