//! PostgREST-backed record store.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use crate::client::{read_body, ApiFailure, SupabaseClient};
use daycare_core::backend::{Filter, RecordStore, SelectQuery, Table};
use daycare_core::errors::{Error, Result, StoreError};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const NO_ROWS_CODE: &str = "PGRST116";
const UNIQUE_VIOLATION_CODE: &str = "23505";
const RLS_VIOLATION_CODE: &str = "42501";

/// Drops whitespace outside double quotes, as PostgREST expects in `select`.
fn compact_columns(columns: &str) -> String {
    let mut quoted = false;
    columns
        .chars()
        .filter(|c| {
            if *c == '"' {
                quoted = !quoted;
            }
            quoted || !c.is_whitespace()
        })
        .collect()
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| match filter {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{}", value)),
        })
        .collect()
}

fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), compact_columns(&query.columns))];
    params.extend(filter_params(&query.filters));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        // Postgres defaults: nulls last ascending, nulls first descending.
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    params
}

fn encode_params(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn store_error(failure: ApiFailure) -> Error {
    let error = match failure.code.as_deref() {
        Some(UNIQUE_VIOLATION_CODE) => StoreError::UniqueViolation(failure.message),
        Some(RLS_VIOLATION_CODE) => StoreError::PermissionDenied(failure.message),
        _ => StoreError::QueryFailed(failure.message),
    };
    error.into()
}

fn decode_error(table: Table, e: serde_json::Error) -> Error {
    StoreError::Decode {
        table: table.name().to_string(),
        message: e.to_string(),
    }
    .into()
}

pub struct SupabaseRest {
    client: Arc<SupabaseClient>,
}

impl SupabaseRest {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    fn request(&self, method: Method, table: Table, params: &[(String, String)]) -> Result<RequestBuilder> {
        let mut url = self.client.endpoint(&format!("/rest/v1/{}", table.name()));
        if !params.is_empty() {
            url.push('?');
            url.push_str(&encode_params(params));
        }
        Ok(self
            .client
            .http()
            .request(method, url)
            .headers(self.client.headers()?))
    }

    async fn send(&self, table: Table, request: RequestBuilder) -> Result<std::result::Result<String, ApiFailure>> {
        let response = request.send().await.map_err(|e| {
            StoreError::ConnectionFailed(format!("{} on table '{}'", e, table.name()))
        })?;
        Ok(read_body(response).await)
    }
}

#[async_trait]
impl RecordStore for SupabaseRest {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>> {
        debug!("select from {}", query.table);
        let request = self.request(Method::GET, query.table, &select_params(query))?;
        let body = self.send(query.table, request).await?.map_err(store_error)?;
        serde_json::from_str(&body).map_err(|e| decode_error(query.table, e))
    }

    async fn select_single(&self, query: &SelectQuery) -> Result<Option<Value>> {
        let request = self
            .request(Method::GET, query.table, &select_params(query))?
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));
        match self.send(query.table, request).await? {
            Ok(body) => serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| decode_error(query.table, e)),
            Err(failure) if failure.code.as_deref() == Some(NO_ROWS_CODE) => Ok(None),
            Err(failure) => Err(store_error(failure)),
        }
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>> {
        debug!("insert {} row(s) into {}", rows.len(), table);
        let request = self
            .request(Method::POST, table, &[])?
            .header("Prefer", "return=representation")
            .json(&rows);
        let body = self.send(table, request).await?.map_err(store_error)?;
        serde_json::from_str(&body).map_err(|e| decode_error(table, e))
    }

    async fn update(&self, table: Table, patch: Value, filters: &[Filter]) -> Result<()> {
        debug!("update {}", table);
        let request = self
            .request(Method::PATCH, table, &filter_params(filters))?
            .header("Prefer", "return=minimal")
            .json(&patch);
        self.send(table, request).await?.map_err(store_error)?;
        Ok(())
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<()> {
        debug!("delete from {}", table);
        let request = self.request(Method::DELETE, table, &filter_params(filters))?;
        self.send(table, request).await?.map_err(store_error)?;
        Ok(())
    }
}
