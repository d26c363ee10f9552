use std::sync::Arc;

use log::{debug, warn};

use super::parents_model::{Parent, ParentInput};
use crate::backend::{RecordStore, Repository, Table};
use crate::errors::{Error, Result};

/// Service for parent records.
pub struct ParentService {
    parents: Repository,
    children: Repository,
}

impl ParentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            parents: Repository::new(store.clone(), Table::Parents),
            children: Repository::new(store, Table::Children),
        }
    }

    pub async fn create_parent(&self, input: ParentInput) -> Result<()> {
        let input = input.normalized();
        input.validate()?;
        if self.parents.count_by("email", &input.email).await? > 0 {
            return Err(Error::Duplicate(format!(
                "Parent with email {} already exists.",
                input.email
            )));
        }
        debug!("Creating parent {}", input.email);
        self.parents.insert(&input).await?;
        Ok(())
    }

    pub async fn update_parent(&self, parent_id: &str, input: ParentInput) -> Result<()> {
        let input = input.normalized();
        input.validate()?;
        self.parents.update(parent_id, &input).await
    }

    /// Deletes a parent that has no linked children.
    pub async fn delete_parent(&self, parent_id: &str) -> Result<()> {
        let linked = self
            .children
            .count_by("primary_parent_id", parent_id)
            .await?;
        if linked > 0 {
            warn!("Refusing to delete parent {} with {} linked children", parent_id, linked);
            return Err(Error::ConstraintViolation(format!(
                "Parent is linked to {} child(ren). Reassign children first.",
                linked
            )));
        }
        self.parents.delete(parent_id).await
    }

    /// Single parent lookup by id.
    pub async fn get_parent(&self, parent_id: &str) -> Result<Option<Parent>> {
        self.parents.find_by("id", parent_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use serde_json::json;

    fn input(email: &str) -> ParentInput {
        ParentInput {
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn linked_parent_is_not_deleted() {
        let memory = InMemoryBackend::new();
        let parent_id = memory.seed(Table::Parents, json!({"first_name": "Ana"}));
        memory.seed(Table::Children, json!({"name": "Zoe", "primary_parent_id": parent_id}));
        memory.seed(Table::Children, json!({"name": "Leo", "primary_parent_id": parent_id}));
        let service = ParentService::new(memory.backend().records);

        let err = service.delete_parent(&parent_id).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Parent is linked to 2 child(ren). Reassign children first."
        );
        assert_eq!(memory.write_calls(Table::Parents), 0);
        assert_eq!(memory.rows(Table::Parents).len(), 1);
    }

    #[tokio::test]
    async fn unlinked_parent_is_deleted() {
        let memory = InMemoryBackend::new();
        let parent_id = memory.seed(Table::Parents, json!({"first_name": "Ana"}));
        let service = ParentService::new(memory.backend().records);

        service.delete_parent(&parent_id).await.unwrap();

        assert!(memory.rows(Table::Parents).is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_warning_not_an_insert() {
        let memory = InMemoryBackend::new();
        memory.seed(Table::Parents, json!({"email": "ana@x.com"}));
        let service = ParentService::new(memory.backend().records);

        let err = service.create_parent(input("ana@x.com")).await.unwrap_err();

        assert!(matches!(err, Error::Duplicate(_)));
        assert_eq!(memory.write_calls(Table::Parents), 0);

        service.create_parent(input("leo@x.com")).await.unwrap();
        assert_eq!(memory.rows(Table::Parents).len(), 2);
    }

    #[tokio::test]
    async fn get_parent_returns_none_when_missing() {
        let memory = InMemoryBackend::new();
        let service = ParentService::new(memory.backend().records);
        assert!(service.get_parent("nope").await.unwrap().is_none());
    }
}
