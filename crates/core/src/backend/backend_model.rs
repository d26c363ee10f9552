//! Backend-facing value types: tables, queries, sessions and change events.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use super::backend_traits::{BlobStore, ChangeFeed, IdentityProvider, RecordStore};

/// Tables the console reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Children,
    Staff,
    Rooms,
    DailyReports,
    IncidentReports,
    Medications,
    MedicationLogs,
    Announcements,
    Invoices,
    WaitlistEntries,
    Parents,
}

impl Table {
    pub const ALL: [Table; 11] = [
        Table::Children,
        Table::Staff,
        Table::Rooms,
        Table::DailyReports,
        Table::IncidentReports,
        Table::Medications,
        Table::MedicationLogs,
        Table::Announcements,
        Table::Invoices,
        Table::WaitlistEntries,
        Table::Parents,
    ];

    /// Name of the table in the record store.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Children => "children",
            Table::Staff => "staff",
            Table::Rooms => "rooms",
            Table::DailyReports => "daily_reports",
            Table::IncidentReports => "incident_reports",
            Table::Medications => "medications",
            Table::MedicationLogs => "medication_logs",
            Table::Announcements => "announcements",
            Table::Invoices => "invoices",
            Table::WaitlistEntries => "waitlist_entries",
            Table::Parents => "parents",
        }
    }

    /// Human label used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Table::Children => "children",
            Table::Staff => "staff",
            Table::Rooms => "rooms",
            Table::DailyReports => "daily reports",
            Table::IncidentReports => "incident reports",
            Table::Medications => "medications",
            Table::MedicationLogs => "medication logs",
            Table::Announcements => "announcements",
            Table::Invoices => "invoices",
            Table::WaitlistEntries => "waitlist entries",
            Table::Parents => "parents",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("Unknown table '{}'", s))
    }
}

/// Sort applied to a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Row filter. Only equality is needed by the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// A select against one table.
///
/// `columns` is the projection in the backend's select syntax and may embed a
/// single-level join such as `*, parents!primary_parent_id(id, first_name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub table: Table,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
}

impl SelectQuery {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }
}

/// The authenticated identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Kinds of session-change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// Session-change notification.
#[derive(Debug, Clone)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<AuthSession>,
}

impl AuthChange {
    pub fn new(event: AuthEvent, session: Option<AuthSession>) -> Self {
        Self { event, session }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row in `table` was inserted, updated or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
}

/// A file handed to the blob store.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Live change-feed subscription. Dropping it closes the channel on the
/// backend side.
pub struct FeedSubscription {
    events: mpsc::Receiver<ChangeEvent>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FeedSubscription {
    pub fn new(events: mpsc::Receiver<ChangeEvent>, shutdown: Option<oneshot::Sender<()>>) -> Self {
        Self { events, shutdown }
    }

    /// Waits for the next change. `None` once the feed is closed.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// The four hosted-backend collaborators the console talks to.
#[derive(Clone)]
pub struct Backend {
    pub identity: Arc<dyn IdentityProvider>,
    pub records: Arc<dyn RecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub feed: Arc<dyn ChangeFeed>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_round_trip_through_from_str() {
        for table in Table::ALL {
            assert_eq!(table.name().parse::<Table>().unwrap(), table);
        }
        assert!("lunch_menu".parse::<Table>().is_err());
    }

    #[test]
    fn select_query_builder_collects_filters() {
        let query = SelectQuery::new(Table::Staff)
            .columns("id, email")
            .eq("email", "a@x.com")
            .order(OrderBy::asc("name"));
        assert_eq!(query.columns, "id, email");
        assert_eq!(query.filters, vec![Filter::eq("email", "a@x.com")]);
        assert_eq!(query.order, Some(OrderBy::asc("name")));
    }

    #[test]
    fn session_debug_hides_tokens() {
        let session = AuthSession {
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
            expires_at: None,
            user: AuthUser {
                id: "u1".to_string(),
                email: Some("a@x.com".to_string()),
            },
        };
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("u1"));
    }
}
