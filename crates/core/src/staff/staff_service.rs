use std::sync::Arc;

use log::debug;

use super::staff_model::StaffInput;
use crate::backend::{RecordStore, Repository, Table};
use crate::errors::{Error, Result};
use crate::session::CurrentUser;

/// Service for writing staff records.
pub struct StaffService {
    repository: Repository,
}

impl StaffService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            repository: Repository::new(store, Table::Staff),
        }
    }

    /// Creates a staff member after a duplicate-email check.
    ///
    /// The row is linked to the acting user when the emails match, so an
    /// administrator can create their own staff profile.
    pub async fn create_staff(&self, input: StaffInput, actor: Option<&CurrentUser>) -> Result<()> {
        let input = input.normalized();
        input.validate()?;

        if self.repository.count_by("email", &input.email).await? > 0 {
            return Err(Error::Duplicate(format!(
                "Staff with email {} already exists.",
                input.email
            )));
        }

        let user_id = actor
            .filter(|a| {
                a.email
                    .as_deref()
                    .is_some_and(|email| email.eq_ignore_ascii_case(&input.email))
            })
            .map(|a| a.user_id.clone());

        let mut row = serde_json::to_value(&input)?;
        row["user_id"] = serde_json::json!(user_id);
        debug!("Creating staff {} with role {}", input.email, input.role);
        self.repository.insert(&row).await?;
        Ok(())
    }

    pub async fn update_staff(&self, staff_id: &str, input: StaffInput) -> Result<()> {
        let input = input.normalized();
        input.validate()?;
        self.repository.update(staff_id, &input).await
    }

    pub async fn delete_staff(&self, staff_id: &str) -> Result<()> {
        self.repository.delete(staff_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::session::Role;
    use serde_json::json;

    fn admin(email: &str) -> CurrentUser {
        CurrentUser {
            user_id: "u-admin".to_string(),
            email: Some(email.to_string()),
            role: Role::Admin,
            display_name: "Admin".to_string(),
            profile_id: Some("s0".to_string()),
            staff_id: Some("s0".to_string()),
        }
    }

    fn input(email: &str, role: &str, room: Option<&str>) -> StaffInput {
        StaffInput {
            name: "Bea".to_string(),
            email: email.to_string(),
            role: role.to_string(),
            main_room_id: room.map(str::to_string),
            phone_number: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_before_insert() {
        let memory = InMemoryBackend::new();
        memory.seed(Table::Staff, json!({"name": "Old", "email": "bea@x.com"}));
        let service = StaffService::new(memory.backend().records);

        let err = service
            .create_staff(input("bea@x.com", "assistant", None), None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Staff with email bea@x.com already exists.");
        assert_eq!(memory.write_calls(Table::Staff), 0);
    }

    #[tokio::test]
    async fn role_is_lowercased_and_room_cleared_for_non_teachers() {
        let memory = InMemoryBackend::new();
        let service = StaffService::new(memory.backend().records);

        service
            .create_staff(input("bea@x.com", "Admin", Some("r1")), None)
            .await
            .unwrap();

        let row = &memory.rows(Table::Staff)[0];
        assert_eq!(row["role"], "admin");
        assert!(row["main_room_id"].is_null());
        assert!(row["user_id"].is_null());
    }

    #[tokio::test]
    async fn teacher_without_room_issues_no_store_call() {
        let memory = InMemoryBackend::new();
        let service = StaffService::new(memory.backend().records);

        let err = service
            .create_staff(input("t@x.com", "Teacher", None), None)
            .await
            .unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(memory.total_store_calls(), 0);
    }

    #[tokio::test]
    async fn matching_email_links_acting_user() {
        let memory = InMemoryBackend::new();
        let service = StaffService::new(memory.backend().records);
        let actor = admin("Boss@x.com");

        service
            .create_staff(input("boss@x.com", "admin", None), Some(&actor))
            .await
            .unwrap();

        assert_eq!(memory.rows(Table::Staff)[0]["user_id"], "u-admin");
    }
}
