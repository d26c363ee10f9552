use std::sync::Arc;

use log::{debug, error, warn};
use serde::Deserialize;

use super::session_model::{CurrentUser, Role};
use crate::backend::{decode_row, AuthUser, RecordStore, SelectQuery, Table};
use crate::errors::Result;
use crate::utils::text::full_name;

#[derive(Deserialize)]
struct StaffProfileRow {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Deserialize)]
struct ParentProfileRow {
    id: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

/// Determines the acting role of an authenticated identity by probing the
/// staff table, then the parents table.
pub struct RoleResolver {
    store: Arc<dyn RecordStore>,
}

impl RoleResolver {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Resolves `identity` to a profile. Never fails: lookup faults resolve
    /// to [`Role::ExceptionProfile`].
    pub async fn resolve(&self, identity: &AuthUser) -> CurrentUser {
        match self.lookup(identity).await {
            Ok(user) => {
                debug!("Resolved user {} to role {}", identity.id, user.role);
                user
            }
            Err(e) => {
                error!("Failed to resolve profile for user {}: {}", identity.id, e);
                unlinked(identity, Role::ExceptionProfile)
            }
        }
    }

    async fn lookup(&self, identity: &AuthUser) -> Result<CurrentUser> {
        let staff_query = SelectQuery::new(Table::Staff)
            .columns("id, name, role")
            .eq("user_id", identity.id.as_str());
        if let Some(row) = self.store.select_single(&staff_query).await? {
            let staff: StaffProfileRow = decode_row(Table::Staff, row)?;
            return Ok(
                match staff.role.as_deref().and_then(Role::from_staff_role) {
                    Some(role) => CurrentUser {
                        user_id: identity.id.clone(),
                        email: identity.email.clone(),
                        role,
                        display_name: staff.name.unwrap_or_default(),
                        profile_id: Some(staff.id.clone()),
                        staff_id: Some(staff.id),
                    },
                    None => {
                        warn!(
                            "Staff row {} for user {} has unrecognized role {:?}",
                            staff.id, identity.id, staff.role
                        );
                        unlinked(identity, Role::UnknownProfile)
                    }
                },
            );
        }

        let parent_query = SelectQuery::new(Table::Parents)
            .columns("id, first_name, last_name")
            .eq("user_id", identity.id.as_str());
        if let Some(row) = self.store.select_single(&parent_query).await? {
            let parent: ParentProfileRow = decode_row(Table::Parents, row)?;
            return Ok(CurrentUser {
                user_id: identity.id.clone(),
                email: identity.email.clone(),
                role: Role::Parent,
                display_name: full_name(parent.first_name.as_deref(), parent.last_name.as_deref()),
                profile_id: Some(parent.id),
                staff_id: None,
            });
        }

        warn!(
            "User {} ({}) has no linked profile in staff or parents",
            identity.email.as_deref().unwrap_or("no email"),
            identity.id
        );
        Ok(unlinked(identity, Role::UnknownProfile))
    }
}

fn unlinked(identity: &AuthUser, role: Role) -> CurrentUser {
    CurrentUser {
        user_id: identity.id.clone(),
        email: identity.email.clone(),
        role,
        display_name: identity.email.clone().unwrap_or_default(),
        profile_id: None,
        staff_id: None,
    }
}
