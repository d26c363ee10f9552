use std::sync::Arc;

use super::waitlist_model::WaitlistInput;
use crate::backend::{RecordStore, Repository, Table};
use crate::errors::Result;

/// Which write a save performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitlistSave {
    Added,
    Updated,
}

/// Service for waitlist entries.
pub struct WaitlistService {
    repository: Repository,
}

impl WaitlistService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            repository: Repository::new(store, Table::WaitlistEntries),
        }
    }

    /// Inserts when the input has no id, updates otherwise. The id is never
    /// part of the written row.
    pub async fn save_entry(&self, input: WaitlistInput) -> Result<WaitlistSave> {
        input.validate()?;
        match input.id.clone() {
            Some(id) => {
                self.repository.update(&id, &input).await?;
                Ok(WaitlistSave::Updated)
            }
            None => {
                self.repository.insert(&input).await?;
                Ok(WaitlistSave::Added)
            }
        }
    }

    pub async fn delete_entry(&self, entry_id: &str) -> Result<()> {
        self.repository.delete(entry_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::waitlist::WaitlistStatus;

    #[tokio::test]
    async fn save_inserts_then_updates() {
        let memory = InMemoryBackend::new();
        let service = WaitlistService::new(memory.backend().records);
        let mut input = WaitlistInput {
            child_name: "Mia".to_string(),
            parent_name: "Jo".to_string(),
            ..Default::default()
        };

        assert_eq!(service.save_entry(input.clone()).await.unwrap(), WaitlistSave::Added);
        let id = memory.rows(Table::WaitlistEntries)[0]["id"]
            .as_str()
            .unwrap()
            .to_string();

        input.id = Some(id);
        input.status = WaitlistStatus::Contacted;
        assert_eq!(service.save_entry(input).await.unwrap(), WaitlistSave::Updated);

        let rows = memory.rows(Table::WaitlistEntries);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["status"], "Contacted");
    }
}
