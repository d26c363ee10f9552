use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;

use super::children_model::{CheckInUpdate, Child, ChildInput};
use crate::backend::{RecordStore, Repository, Table};
use crate::errors::Result;

/// Service for writing child records.
pub struct ChildService {
    repository: Repository,
}

impl ChildService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            repository: Repository::new(store, Table::Children),
        }
    }

    /// Creates a child. Rejected before any store call when the primary
    /// parent is missing.
    pub async fn create_child(&self, input: ChildInput) -> Result<()> {
        let input = input.normalized();
        input.validate()?;
        debug!("Creating child {}", input.name);
        self.repository.insert(&input).await?;
        Ok(())
    }

    pub async fn update_child(&self, child_id: &str, input: ChildInput) -> Result<()> {
        let input = input.normalized();
        input.validate()?;
        self.repository.update(child_id, &input).await
    }

    pub async fn delete_child(&self, child_id: &str) -> Result<()> {
        self.repository.delete(child_id).await
    }

    /// Flips the check-in state of `child` at `now` and returns the patch
    /// that was written.
    pub async fn toggle_check_in(&self, child: &Child, now: DateTime<Utc>) -> Result<CheckInUpdate> {
        let update = child.toggled_check_in(now);
        self.repository.update(&child.id, &update).await?;
        Ok(update)
    }
}
