//! Typed access to a single table on top of the untyped [`RecordStore`].

use std::sync::Arc;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::backend_model::{Filter, SelectQuery, Table};
use super::backend_traits::RecordStore;
use crate::errors::{Result, StoreError};

/// Decodes one raw row into `T`.
pub fn decode_row<T: DeserializeOwned>(table: Table, row: Value) -> Result<T> {
    serde_json::from_value(row).map_err(|e| {
        StoreError::Decode {
            table: table.name().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Decodes raw rows into `T`, failing on the first malformed row.
pub fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter().map(|row| decode_row(table, row)).collect()
}

/// Decodes raw rows into `T`, skipping rows that do not decode. Each
/// skipped row is logged with its id.
pub fn decode_rows_lossy<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| {
            let id = row
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("<no id>")
                .to_string();
            match serde_json::from_value(row) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Skipping row {} from '{}': {}", id, table.name(), e);
                    None
                }
            }
        })
        .collect();
    if decoded.len() < total {
        warn!(
            "Skipped {} of {} row(s) from '{}'",
            total - decoded.len(),
            total,
            table.name()
        );
    }
    decoded
}

/// Table-scoped wrapper around a record store.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn RecordStore>,
    table: Table,
}

impl Repository {
    pub fn new(store: Arc<dyn RecordStore>, table: Table) -> Self {
        Self { store, table }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Rows where `column = value`.
    pub async fn list_by<T: DeserializeOwned>(&self, column: &str, value: &str) -> Result<Vec<T>> {
        let query = SelectQuery::new(self.table).eq(column, value);
        let rows = self.store.select(&query).await?;
        decode_rows(self.table, rows)
    }

    /// The single row where `column = value`, if any.
    pub async fn find_by<T: DeserializeOwned>(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<T>> {
        let query = SelectQuery::new(self.table).eq(column, value);
        match self.store.select_single(&query).await? {
            Some(row) => decode_row(self.table, row).map(Some),
            None => Ok(None),
        }
    }

    /// Number of rows where `column = value`. Only ids are fetched.
    pub async fn count_by(&self, column: &str, value: &str) -> Result<usize> {
        let query = SelectQuery::new(self.table).columns("id").eq(column, value);
        Ok(self.store.select(&query).await?.len())
    }

    /// Inserts one record and returns the stored row.
    pub async fn insert<P: Serialize>(&self, payload: &P) -> Result<Value> {
        let row = serde_json::to_value(payload)?;
        let mut stored = self.store.insert(self.table, vec![row]).await?;
        Ok(stored.pop().unwrap_or(Value::Null))
    }

    pub async fn update<P: Serialize>(&self, id: &str, patch: &P) -> Result<()> {
        let patch = serde_json::to_value(patch)?;
        self.store
            .update(self.table, patch, &[Filter::eq("id", id)])
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(self.table, &[Filter::eq("id", id)]).await
    }
}
