use std::sync::Arc;

use super::rooms_model::RoomInput;
use crate::backend::{RecordStore, Repository, Table};
use crate::errors::Result;

/// Service for writing room records.
pub struct RoomService {
    repository: Repository,
}

impl RoomService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            repository: Repository::new(store, Table::Rooms),
        }
    }

    pub async fn create_room(&self, mut input: RoomInput) -> Result<()> {
        input.name = input.name.trim().to_string();
        input.validate()?;
        self.repository.insert(&input).await?;
        Ok(())
    }

    pub async fn update_room(&self, room_id: &str, mut input: RoomInput) -> Result<()> {
        input.name = input.name.trim().to_string();
        input.validate()?;
        self.repository.update(room_id, &input).await
    }

    pub async fn delete_room(&self, room_id: &str) -> Result<()> {
        self.repository.delete(room_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    #[tokio::test]
    async fn negative_capacity_is_rejected_without_store_call() {
        let memory = InMemoryBackend::new();
        let service = RoomService::new(memory.backend().records);

        assert!(service.create_room(RoomInput::new("Tulip", -1)).await.is_err());
        assert!(service.create_room(RoomInput::new("  ", 4)).await.is_err());
        assert_eq!(memory.total_store_calls(), 0);
    }

    #[tokio::test]
    async fn room_is_written_trimmed() {
        let memory = InMemoryBackend::new();
        let service = RoomService::new(memory.backend().records);

        service.create_room(RoomInput::new(" Sunflower ", 12)).await.unwrap();

        let rows = memory.rows(Table::Rooms);
        assert_eq!(rows[0]["name"], "Sunflower");
        assert_eq!(rows[0]["capacity"], 12);
    }
}
