//! Contracts for the hosted backend collaborators.
//!
//! These traits carry no transport types, so the console can run against the
//! hosted service, the in-memory backend used by tests, or the disabled
//! backend used when configuration is missing.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use super::backend_model::{
    AuthChange, AuthSession, FeedSubscription, FileUpload, Filter, SelectQuery, Table,
};
use crate::errors::Result;

/// Authentication and session service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Registers a new account. The provider may require email confirmation
    /// before the account can sign in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<()>;

    /// Signs in with email and password and emits `SignedIn`.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Ends the current session and emits `SignedOut`.
    async fn sign_out(&self) -> Result<()>;

    /// Returns the current session, if any.
    async fn current_session(&self) -> Result<Option<AuthSession>>;

    /// Subscribes to session changes. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;
}

/// Relational record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every row matching the query. No pagination is applied beyond
    /// the backend's own page size.
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>>;

    /// Returns exactly one row, or `None` when no row matches.
    async fn select_single(&self, query: &SelectQuery) -> Result<Option<Value>>;

    /// Inserts rows and returns them as stored.
    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>>;

    /// Applies `patch` to every row matching `filters`.
    async fn update(&self, table: Table, patch: Value, filters: &[Filter]) -> Result<()>;

    /// Deletes every row matching `filters`.
    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<()>;
}

/// Object storage for uploaded files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads `file` to `bucket` at `path`. Existing objects are not
    /// overwritten.
    async fn upload(&self, bucket: &str, path: &str, file: FileUpload) -> Result<()>;

    /// Publicly resolvable URL for an object.
    fn public_url(&self, bucket: &str, path: &str) -> Result<String>;
}

/// Push notifications for row changes.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Opens `channel` listening for inserts, updates and deletes on `tables`.
    async fn subscribe(&self, channel: &str, tables: &[Table]) -> Result<FeedSubscription>;
}
