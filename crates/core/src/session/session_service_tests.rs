//! Tests for role resolution against the in-memory backend.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::backend::{AuthUser, InMemoryBackend, Table};
    use crate::session::{Role, RoleResolver};

    fn identity(id: &str) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            email: Some(format!("{}@daycare.test", id)),
        }
    }

    fn resolver(memory: &InMemoryBackend) -> RoleResolver {
        RoleResolver::new(memory.backend().records)
    }

    #[tokio::test]
    async fn staff_row_wins_and_role_is_lowercased() {
        let memory = InMemoryBackend::new();
        let staff_id = memory.seed(
            Table::Staff,
            json!({"name": "Bea Park", "role": "Teacher", "user_id": "u1"}),
        );
        memory.seed(
            Table::Parents,
            json!({"first_name": "Bea", "last_name": "Park", "user_id": "u1"}),
        );

        let user = resolver(&memory).resolve(&identity("u1")).await;

        assert_eq!(user.role, Role::Teacher);
        assert_eq!(user.display_name, "Bea Park");
        assert_eq!(user.profile_id.as_deref(), Some(staff_id.as_str()));
        assert_eq!(user.staff_id.as_deref(), Some(staff_id.as_str()));
        assert_eq!(memory.select_calls(Table::Parents), 0);
    }

    #[tokio::test]
    async fn parent_row_resolves_to_parent_with_full_name() {
        let memory = InMemoryBackend::new();
        let parent_id = memory.seed(
            Table::Parents,
            json!({"first_name": "Ana", "last_name": null, "user_id": "u2"}),
        );

        let user = resolver(&memory).resolve(&identity("u2")).await;

        assert_eq!(user.role, Role::Parent);
        assert_eq!(user.display_name, "Ana");
        assert_eq!(user.profile_id, Some(parent_id));
        assert!(user.staff_id.is_none());
    }

    #[tokio::test]
    async fn no_profile_resolves_to_unknown_profile_named_by_email() {
        let memory = InMemoryBackend::new();

        let user = resolver(&memory).resolve(&identity("u3")).await;

        assert_eq!(user.role, Role::UnknownProfile);
        assert_eq!(user.display_name, "u3@daycare.test");
        assert!(user.profile_id.is_none());
    }

    #[tokio::test]
    async fn unrecognized_staff_role_is_unknown_profile() {
        let memory = InMemoryBackend::new();
        memory.seed(
            Table::Staff,
            json!({"name": "Cal", "role": "cook", "user_id": "u4"}),
        );

        let user = resolver(&memory).resolve(&identity("u4")).await;

        assert_eq!(user.role, Role::UnknownProfile);
        assert!(user.staff_id.is_none());
    }

    #[tokio::test]
    async fn lookup_fault_is_exception_profile() {
        let memory = InMemoryBackend::new();
        memory.fail_table(Table::Staff);

        let user = resolver(&memory).resolve(&identity("u5")).await;

        assert_eq!(user.role, Role::ExceptionProfile);
        assert_eq!(user.display_name, "u5@daycare.test");
    }

    #[tokio::test]
    async fn ambiguous_staff_rows_resolve_as_unknown_profile() {
        let memory = InMemoryBackend::new();
        memory.seed(Table::Staff, json!({"name": "A", "role": "admin", "user_id": "u6"}));
        memory.seed(Table::Staff, json!({"name": "B", "role": "admin", "user_id": "u6"}));

        let user = resolver(&memory).resolve(&identity("u6")).await;

        assert_eq!(user.role, Role::UnknownProfile);
        assert_eq!(user.display_name, "u6@daycare.test");
    }
}
