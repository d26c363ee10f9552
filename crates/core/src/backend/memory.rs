//! In-process backend that keeps every table, user and blob in memory.
//!
//! Used by the test suites of every crate in the workspace and by the server
//! when started against a local sandbox. Supports call counting and fault
//! injection per table.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::debug;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use super::backend_model::{
    AuthChange, AuthEvent, AuthSession, AuthUser, Backend, ChangeEvent, ChangeKind,
    FeedSubscription, FileUpload, Filter, SelectQuery, Table,
};
use super::backend_traits::{BlobStore, ChangeFeed, IdentityProvider, RecordStore};
use crate::errors::{AuthError, Error, Result, StoreError};

type Row = Map<String, Value>;

const FEED_BUFFER: usize = 64;
const MIN_PASSWORD_LEN: usize = 6;

struct MemoryUser {
    id: String,
    email: String,
    password: String,
}

struct FeedListener {
    channel: String,
    tables: HashSet<Table>,
    tx: mpsc::Sender<ChangeEvent>,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<Table, Vec<Row>>,
    users: HashMap<String, MemoryUser>,
    session: Option<AuthSession>,
    blobs: HashMap<(String, String), FileUpload>,
    listeners: Vec<FeedListener>,
    select_calls: HashMap<Table, usize>,
    write_calls: HashMap<Table, usize>,
    upload_calls: usize,
    failing_tables: HashSet<Table>,
    fail_uploads: bool,
}

impl MemoryState {
    fn notify(&mut self, table: Table, kind: ChangeKind) {
        self.listeners.retain(|l| !l.tx.is_closed());
        for listener in &self.listeners {
            if listener.tables.contains(&table) {
                let _ = listener.tx.try_send(ChangeEvent { table, kind });
            }
        }
    }

    fn check_table(&self, table: Table) -> Result<()> {
        if self.failing_tables.contains(&table) {
            return Err(StoreError::QueryFailed(format!(
                "simulated failure on table '{}'",
                table
            ))
            .into());
        }
        Ok(())
    }

    fn matching(&self, table: Table, filters: &[Filter]) -> Vec<&Row> {
        self.tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| row_matches(r, filters)).collect())
            .unwrap_or_default()
    }
}

/// In-memory implementation of all four collaborator contracts.
#[derive(Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    auth_tx: broadcast::Sender<AuthChange>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let (auth_tx, _) = broadcast::channel(32);
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            auth_tx,
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Bundles this backend into all four collaborator slots.
    pub fn backend(&self) -> Backend {
        let this = Arc::new(self.clone());
        Backend {
            identity: this.clone(),
            records: this.clone(),
            blobs: this.clone(),
            feed: this,
        }
    }

    /// Stores a row directly, bypassing counters and change notifications.
    /// Returns the row id, generating one when missing.
    pub fn seed(&self, table: Table, row: Value) -> String {
        let mut row = match row {
            Value::Object(map) => map,
            _ => Row::new(),
        };
        let id = ensure_id(&mut row);
        self.state().tables.entry(table).or_default().push(row);
        id
    }

    /// Current rows of `table` in insertion order.
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.state()
            .tables
            .get(&table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Creates a confirmed account and returns its user id.
    pub fn register_user(&self, email: &str, password: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.state().users.insert(
            email.to_lowercase(),
            MemoryUser {
                id: id.clone(),
                email: email.to_string(),
                password: password.to_string(),
            },
        );
        id
    }

    /// Rotates the access token of the current session and emits
    /// `TokenRefreshed`.
    pub fn refresh_session(&self) -> Option<AuthSession> {
        let session = {
            let mut state = self.state();
            let session = state.session.as_mut()?;
            session.access_token = format!("memory-access-{}", Uuid::new_v4());
            session.expires_at = Some(Utc::now() + Duration::hours(1));
            session.clone()
        };
        self.emit(AuthChange::new(AuthEvent::TokenRefreshed, Some(session.clone())));
        Some(session)
    }

    /// Drops the current session and emits `SignedOut`, as a provider does
    /// when a refresh token is rejected.
    pub fn expire_session(&self) {
        if self.state().session.take().is_some() {
            self.emit(AuthChange::new(AuthEvent::SignedOut, None));
        }
    }

    /// Makes every store call against `table` fail until restored.
    pub fn fail_table(&self, table: Table) {
        self.state().failing_tables.insert(table);
    }

    pub fn restore_table(&self, table: Table) {
        self.state().failing_tables.remove(&table);
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.state().fail_uploads = fail;
    }

    /// Number of select calls issued against `table`.
    pub fn select_calls(&self, table: Table) -> usize {
        self.state().select_calls.get(&table).copied().unwrap_or(0)
    }

    /// Number of insert, update and delete calls issued against `table`.
    pub fn write_calls(&self, table: Table) -> usize {
        self.state().write_calls.get(&table).copied().unwrap_or(0)
    }

    /// Every select and write call issued so far.
    pub fn total_store_calls(&self) -> usize {
        let state = self.state();
        state.select_calls.values().sum::<usize>() + state.write_calls.values().sum::<usize>()
    }

    pub fn upload_calls(&self) -> usize {
        self.state().upload_calls
    }

    pub fn blob(&self, bucket: &str, path: &str) -> Option<FileUpload> {
        self.state()
            .blobs
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    /// Object paths stored in `bucket`, sorted.
    pub fn blob_paths(&self, bucket: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .state()
            .blobs
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, p)| p.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Names of change-feed channels that are still open.
    pub fn open_channels(&self) -> Vec<String> {
        let mut state = self.state();
        state.listeners.retain(|l| !l.tx.is_closed());
        state.listeners.iter().map(|l| l.channel.clone()).collect()
    }

    /// Ends every open feed subscription from the server side.
    pub fn close_channels(&self) {
        self.state().listeners.clear();
    }

    /// Pushes a change notification without touching any rows.
    pub fn push_change(&self, table: Table, kind: ChangeKind) {
        self.state().notify(table, kind);
    }

    fn emit(&self, change: AuthChange) {
        // No receivers is fine.
        let _ = self.auth_tx.send(change);
    }
}

#[async_trait]
impl IdentityProvider for InMemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let key = email.trim().to_lowercase();
        if key.is_empty() || !key.contains('@') {
            return Err(AuthError::SignUpRejected(
                "Unable to validate email address: invalid format".to_string(),
            )
            .into());
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::SignUpRejected(format!(
                "Password should be at least {} characters.",
                MIN_PASSWORD_LEN
            ))
            .into());
        }
        let mut state = self.state();
        if state.users.contains_key(&key) {
            return Err(AuthError::SignUpRejected("User already registered".to_string()).into());
        }
        state.users.insert(
            key,
            MemoryUser {
                id: Uuid::new_v4().to_string(),
                email: email.trim().to_string(),
                password: password.to_string(),
            },
        );
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = {
            let mut state = self.state();
            let user = state
                .users
                .get(&email.trim().to_lowercase())
                .filter(|u| u.password == password)
                .ok_or_else(|| {
                    Error::from(AuthError::InvalidCredentials(
                        "Invalid login credentials".to_string(),
                    ))
                })?;
            let session = AuthSession {
                access_token: format!("memory-access-{}", Uuid::new_v4()),
                refresh_token: format!("memory-refresh-{}", Uuid::new_v4()),
                expires_at: Some(Utc::now() + Duration::hours(1)),
                user: AuthUser {
                    id: user.id.clone(),
                    email: Some(user.email.clone()),
                },
            };
            state.session = Some(session.clone());
            session
        };
        debug!("memory backend: signed in {}", session.user.id);
        self.emit(AuthChange::new(AuthEvent::SignedIn, Some(session.clone())));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.state().session = None;
        self.emit(AuthChange::new(AuthEvent::SignedOut, None));
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.state().session.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_tx.subscribe()
    }
}

#[async_trait]
impl RecordStore for InMemoryBackend {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>> {
        let mut guard = self.state();
        *guard.select_calls.entry(query.table).or_default() += 1;
        guard.check_table(query.table)?;

        let state: &MemoryState = &guard;
        let mut rows = state.matching(query.table, &query.filters);
        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        let columns = parse_projection(&query.columns);
        Ok(rows
            .into_iter()
            .map(|row| project(row, &columns, state))
            .collect())
    }

    async fn select_single(&self, query: &SelectQuery) -> Result<Option<Value>> {
        let mut rows = self.select(query).await?;
        // Zero and several matches both come back as "no row", as PGRST116 does.
        if rows.len() == 1 {
            Ok(rows.pop())
        } else {
            if rows.len() > 1 {
                debug!(
                    "memory backend: {} rows match a single-row query on {}",
                    rows.len(),
                    query.table
                );
            }
            Ok(None)
        }
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>> {
        let mut state = self.state();
        *state.write_calls.entry(table).or_default() += 1;
        state.check_table(table)?;

        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            let Value::Object(mut row) = row else {
                return Err(StoreError::QueryFailed("row must be a JSON object".to_string()).into());
            };
            ensure_id(&mut row);
            row.entry("created_at")
                .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
            stored.push(Value::Object(row.clone()));
            state.tables.entry(table).or_default().push(row);
        }
        state.notify(table, ChangeKind::Insert);
        Ok(stored)
    }

    async fn update(&self, table: Table, patch: Value, filters: &[Filter]) -> Result<()> {
        let mut state = self.state();
        *state.write_calls.entry(table).or_default() += 1;
        state.check_table(table)?;

        let Value::Object(patch) = patch else {
            return Err(StoreError::QueryFailed("patch must be a JSON object".to_string()).into());
        };
        let mut touched = 0;
        if let Some(rows) = state.tables.get_mut(&table) {
            for row in rows.iter_mut().filter(|r| row_matches(r, filters)) {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
                touched += 1;
            }
        }
        if touched > 0 {
            state.notify(table, ChangeKind::Update);
        }
        Ok(())
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<()> {
        let mut state = self.state();
        *state.write_calls.entry(table).or_default() += 1;
        state.check_table(table)?;

        let mut removed = 0;
        if let Some(rows) = state.tables.get_mut(&table) {
            let before = rows.len();
            rows.retain(|r| !row_matches(r, filters));
            removed = before - rows.len();
        }
        if removed > 0 {
            state.notify(table, ChangeKind::Delete);
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for InMemoryBackend {
    async fn upload(&self, bucket: &str, path: &str, file: FileUpload) -> Result<()> {
        let mut state = self.state();
        state.upload_calls += 1;
        if state.fail_uploads {
            return Err(Error::Upload(format!("simulated upload failure for '{}'", path)));
        }
        let key = (bucket.to_string(), path.to_string());
        if state.blobs.contains_key(&key) {
            return Err(Error::Upload("The resource already exists".to_string()));
        }
        state.blobs.insert(key, file);
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<String> {
        Ok(format!("memory://{}/{}", bucket, path))
    }
}

#[async_trait]
impl ChangeFeed for InMemoryBackend {
    async fn subscribe(&self, channel: &str, tables: &[Table]) -> Result<FeedSubscription> {
        let (tx, rx) = mpsc::channel(FEED_BUFFER);
        self.state().listeners.push(FeedListener {
            channel: channel.to_string(),
            tables: tables.iter().copied().collect(),
            tx,
        });
        Ok(FeedSubscription::new(rx, None))
    }
}

fn ensure_id(row: &mut Row) -> String {
    match row.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => {
            let id = Uuid::new_v4().to_string();
            row.insert("id".to_string(), Value::String(id.clone()));
            id
        }
    }
}

fn value_matches(value: Option<&Value>, expected: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == expected,
        Some(Value::Bool(b)) => b.to_string() == expected,
        _ => false,
    }
}

fn row_matches(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq { column, value } => value_matches(row.get(column), value),
    })
}

fn is_null(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Nulls sort last ascending, first descending.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ if is_null(a) && is_null(b) => Ordering::Equal,
        _ if is_null(a) => Ordering::Greater,
        _ if is_null(b) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[derive(Debug, PartialEq)]
enum Column {
    All,
    Named(String),
    Embed {
        alias: String,
        foreign_key: String,
        columns: Vec<String>,
    },
}

fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

fn parse_projection(columns: &str) -> Vec<Column> {
    split_top_level(columns)
        .into_iter()
        .map(|item| {
            if item == "*" {
                return Column::All;
            }
            match (item.find('('), item.rfind(')')) {
                (Some(open), Some(close)) if close > open => {
                    let head = &item[..open];
                    let (alias, foreign_key) = match head.split_once('!') {
                        Some((alias, fk)) => (alias.trim().to_string(), fk.trim().to_string()),
                        None => {
                            let alias = head.trim().to_string();
                            let fk = format!("{}_id", alias.trim_end_matches('s'));
                            (alias, fk)
                        }
                    };
                    let columns = split_top_level(&item[open + 1..close])
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    Column::Embed {
                        alias,
                        foreign_key,
                        columns,
                    }
                }
                _ => Column::Named(item.to_string()),
            }
        })
        .collect()
}

fn pick(row: &Row, columns: &[String]) -> Row {
    if columns.iter().any(|c| c == "*") {
        return row.clone();
    }
    columns
        .iter()
        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
        .collect()
}

fn project(row: &Row, columns: &[Column], state: &MemoryState) -> Value {
    let mut out = Row::new();
    for column in columns {
        match column {
            Column::All => out.extend(row.iter().map(|(k, v)| (k.clone(), v.clone()))),
            Column::Named(name) => {
                out.insert(name.clone(), row.get(name).cloned().unwrap_or(Value::Null));
            }
            Column::Embed {
                alias,
                foreign_key,
                columns,
            } => {
                let embedded = alias
                    .parse::<Table>()
                    .ok()
                    .zip(row.get(foreign_key).and_then(Value::as_str))
                    .and_then(|(target, key)| {
                        state
                            .matching(target, &[Filter::eq("id", key)])
                            .first()
                            .map(|r| Value::Object(pick(r, columns)))
                    })
                    .unwrap_or(Value::Null);
                out.insert(alias.clone(), embedded);
            }
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OrderBy;
    use serde_json::json;

    #[tokio::test]
    async fn select_orders_filters_and_embeds() {
        let memory = InMemoryBackend::new();
        let parent_id = memory.seed(
            Table::Parents,
            json!({"first_name": "Ana", "last_name": "Ruiz", "email": "ana@x.com"}),
        );
        memory.seed(
            Table::Children,
            json!({"name": "Zoe", "primary_parent_id": parent_id}),
        );
        memory.seed(
            Table::Children,
            json!({"name": "Ali", "primary_parent_id": "missing"}),
        );

        let query = SelectQuery::new(Table::Children)
            .columns("*, parents!primary_parent_id(id, first_name, last_name, email)")
            .order(OrderBy::asc("name"));
        let rows = memory.select(&query).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Ali");
        assert!(rows[0]["parents"].is_null());
        assert_eq!(rows[1]["parents"]["first_name"], "Ana");
        assert_eq!(memory.select_calls(Table::Children), 1);

        let filtered = memory
            .select(&SelectQuery::new(Table::Children).eq("name", "Zoe"))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[tokio::test]
    async fn descending_order_puts_nulls_first() {
        let memory = InMemoryBackend::new();
        memory.seed(Table::Invoices, json!({"invoice_date": "2024-01-01"}));
        memory.seed(Table::Invoices, json!({"invoice_date": null}));
        memory.seed(Table::Invoices, json!({"invoice_date": "2024-03-01"}));

        let query = SelectQuery::new(Table::Invoices).order(OrderBy::desc("invoice_date"));
        let rows = memory.select(&query).await.unwrap();
        assert!(rows[0]["invoice_date"].is_null());
        assert_eq!(rows[1]["invoice_date"], "2024-03-01");
    }

    #[tokio::test]
    async fn select_single_treats_missing_and_ambiguous_alike() {
        let memory = InMemoryBackend::new();
        memory.seed(Table::Staff, json!({"email": "a@x.com"}));
        memory.seed(Table::Staff, json!({"email": "a@x.com"}));

        let missing = memory
            .select_single(&SelectQuery::new(Table::Staff).eq("email", "b@x.com"))
            .await
            .unwrap();
        assert!(missing.is_none());

        let ambiguous = memory
            .select_single(&SelectQuery::new(Table::Staff).eq("email", "a@x.com"))
            .await
            .unwrap();
        assert!(ambiguous.is_none());
    }

    #[tokio::test]
    async fn writes_notify_subscribed_tables_only() {
        let memory = InMemoryBackend::new();
        let mut feed = ChangeFeed::subscribe(&memory, "console-updates-admin", &[Table::Rooms])
            .await
            .unwrap();

        memory
            .insert(Table::Rooms, vec![json!({"name": "Sunflower", "capacity": 12})])
            .await
            .unwrap();
        memory
            .insert(Table::Staff, vec![json!({"name": "Bea"})])
            .await
            .unwrap();

        let event = feed.next().await.unwrap();
        assert_eq!(event.table, Table::Rooms);
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(memory.open_channels(), vec!["console-updates-admin".to_string()]);

        drop(feed);
        assert!(memory.open_channels().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_match_filters() {
        let memory = InMemoryBackend::new();
        let id = memory.seed(Table::Rooms, json!({"name": "Tulip", "capacity": 8}));
        memory.seed(Table::Rooms, json!({"name": "Daisy", "capacity": 6}));

        memory
            .update(Table::Rooms, json!({"capacity": 10}), &[Filter::eq("id", id.clone())])
            .await
            .unwrap();
        let tulip = memory
            .select_single(&SelectQuery::new(Table::Rooms).eq("id", id.clone()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tulip["capacity"], 10);

        memory
            .delete(Table::Rooms, &[Filter::eq("id", id)])
            .await
            .unwrap();
        assert_eq!(memory.rows(Table::Rooms).len(), 1);
        assert_eq!(memory.write_calls(Table::Rooms), 2);
    }

    #[tokio::test]
    async fn failing_table_rejects_calls() {
        let memory = InMemoryBackend::new();
        memory.fail_table(Table::Staff);
        assert!(memory.select(&SelectQuery::new(Table::Staff)).await.is_err());
        memory.restore_table(Table::Staff);
        assert!(memory.select(&SelectQuery::new(Table::Staff)).await.is_ok());
    }

    #[tokio::test]
    async fn identity_round_trip_broadcasts_changes() {
        let memory = InMemoryBackend::new();
        let mut changes = memory.subscribe_auth_for_test();

        memory.sign_up("new@x.com", "longpassword").await.unwrap();
        assert!(memory.sign_up("new@x.com", "longpassword").await.is_err());
        assert!(memory.sign_in("new@x.com", "wrong").await.is_err());

        let session = memory.sign_in("NEW@x.com", "longpassword").await.unwrap();
        let change = changes.recv().await.unwrap();
        assert_eq!(change.event, AuthEvent::SignedIn);
        assert_eq!(change.session.unwrap().user.id, session.user.id);

        memory.refresh_session().unwrap();
        assert_eq!(changes.recv().await.unwrap().event, AuthEvent::TokenRefreshed);

        memory.sign_out().await.unwrap();
        assert_eq!(changes.recv().await.unwrap().event, AuthEvent::SignedOut);
        assert!(memory.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn uploads_refuse_overwrite_and_honour_fault_injection() {
        let memory = InMemoryBackend::new();
        memory
            .upload("galleryfiles", "a.png", FileUpload::new("a.png", vec![1]))
            .await
            .unwrap();
        assert!(memory
            .upload("galleryfiles", "a.png", FileUpload::new("a.png", vec![2]))
            .await
            .is_err());

        memory.fail_uploads(true);
        assert!(memory
            .upload("galleryfiles", "b.png", FileUpload::new("b.png", vec![3]))
            .await
            .is_err());
        assert_eq!(memory.upload_calls(), 3);
        assert_eq!(memory.blob_paths("galleryfiles"), vec!["a.png".to_string()]);
        assert_eq!(
            memory.public_url("galleryfiles", "a.png").unwrap(),
            "memory://galleryfiles/a.png"
        );
    }

    #[test]
    fn projection_parses_embedded_join() {
        let columns = parse_projection("*, parents!primary_parent_id(id, first_name)");
        assert_eq!(columns[0], Column::All);
        assert_eq!(
            columns[1],
            Column::Embed {
                alias: "parents".to_string(),
                foreign_key: "primary_parent_id".to_string(),
                columns: vec!["id".to_string(), "first_name".to_string()],
            }
        );
    }

    impl InMemoryBackend {
        fn subscribe_auth_for_test(&self) -> broadcast::Receiver<AuthChange> {
            IdentityProvider::subscribe(self)
        }
    }
}
