use std::sync::Arc;

use serde::Serialize;

use super::announcements_model::AnnouncementInput;
use crate::backend::{RecordStore, Repository, Table};
use crate::errors::{Result, ValidationError};
use crate::session::CurrentUser;

#[derive(Serialize)]
struct AnnouncementRecord {
    #[serde(flatten)]
    input: AnnouncementInput,
    author_staff_id: String,
}

/// Service for announcements. Creating and editing stamp the acting staff
/// member as author.
pub struct AnnouncementService {
    repository: Repository,
}

impl AnnouncementService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            repository: Repository::new(store, Table::Announcements),
        }
    }

    fn record(input: AnnouncementInput, actor: &CurrentUser, verb: &str) -> Result<AnnouncementRecord> {
        let author_staff_id = actor.staff_id.clone().ok_or_else(|| {
            ValidationError::InvalidInput(format!(
                "Cannot {} announcement: Staff profile not loaded or staff ID missing.",
                verb
            ))
        })?;
        input.validate()?;
        Ok(AnnouncementRecord {
            input,
            author_staff_id,
        })
    }

    pub async fn create_announcement(&self, input: AnnouncementInput, actor: &CurrentUser) -> Result<()> {
        let record = Self::record(input, actor, "create")?;
        self.repository.insert(&record).await?;
        Ok(())
    }

    pub async fn update_announcement(
        &self,
        announcement_id: &str,
        input: AnnouncementInput,
        actor: &CurrentUser,
    ) -> Result<()> {
        let record = Self::record(input, actor, "update")?;
        self.repository.update(announcement_id, &record).await
    }

    pub async fn delete_announcement(&self, announcement_id: &str) -> Result<()> {
        self.repository.delete(announcement_id).await
    }
}
