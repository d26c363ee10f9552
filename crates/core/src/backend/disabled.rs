//! Fail-closed backend used when the hosted backend is not configured.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use super::backend_model::{
    AuthChange, AuthSession, Backend, FeedSubscription, FileUpload, Filter, SelectQuery, Table,
};
use super::backend_traits::{BlobStore, ChangeFeed, IdentityProvider, RecordStore};
use crate::errors::{Error, Result};

/// Every data operation fails with [`Error::BackendDisabled`]. There is never
/// a current session, so the console stays on the sign-in view.
pub struct DisabledBackend {
    reason: String,
    auth_tx: broadcast::Sender<AuthChange>,
}

impl DisabledBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        let (auth_tx, _) = broadcast::channel(4);
        Self {
            reason: reason.into(),
            auth_tx,
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn fail<T>(&self) -> Result<T> {
        Err(Error::BackendDisabled(self.reason.clone()))
    }

    /// Bundles this backend into all four collaborator slots.
    pub fn into_backend(self) -> Backend {
        let this = Arc::new(self);
        Backend {
            identity: this.clone(),
            records: this.clone(),
            blobs: this.clone(),
            feed: this,
        }
    }
}

#[async_trait]
impl IdentityProvider for DisabledBackend {
    async fn sign_up(&self, _email: &str, _password: &str) -> Result<()> {
        self.fail()
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthSession> {
        self.fail()
    }

    async fn sign_out(&self) -> Result<()> {
        self.fail()
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        Ok(None)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_tx.subscribe()
    }
}

#[async_trait]
impl RecordStore for DisabledBackend {
    async fn select(&self, _query: &SelectQuery) -> Result<Vec<Value>> {
        self.fail()
    }

    async fn select_single(&self, _query: &SelectQuery) -> Result<Option<Value>> {
        self.fail()
    }

    async fn insert(&self, _table: Table, _rows: Vec<Value>) -> Result<Vec<Value>> {
        self.fail()
    }

    async fn update(&self, _table: Table, _patch: Value, _filters: &[Filter]) -> Result<()> {
        self.fail()
    }

    async fn delete(&self, _table: Table, _filters: &[Filter]) -> Result<()> {
        self.fail()
    }
}

#[async_trait]
impl BlobStore for DisabledBackend {
    async fn upload(&self, _bucket: &str, _path: &str, _file: FileUpload) -> Result<()> {
        self.fail()
    }

    fn public_url(&self, _bucket: &str, _path: &str) -> Result<String> {
        self.fail()
    }
}

#[async_trait]
impl ChangeFeed for DisabledBackend {
    async fn subscribe(&self, _channel: &str, _tables: &[Table]) -> Result<FeedSubscription> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_operation_fails_closed() {
        let backend = DisabledBackend::new("SUPABASE_URL is not set").into_backend();

        assert!(backend.identity.current_session().await.unwrap().is_none());
        let err = backend
            .identity
            .sign_in("a@x.com", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BackendDisabled(ref r) if r == "SUPABASE_URL is not set"));
        assert!(backend
            .records
            .select(&SelectQuery::new(Table::Rooms))
            .await
            .is_err());
        assert!(backend.blobs.public_url("galleryfiles", "a.png").is_err());
        assert!(backend
            .feed
            .subscribe("console-updates-admin", &[Table::Rooms])
            .await
            .is_err());
    }
}
