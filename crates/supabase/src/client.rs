//! Shared HTTP plumbing for the Supabase adapters.
//!
//! One client holds the connection pool, the project settings and the
//! current auth session. Every adapter sends the anon key as `apikey` and the
//! session's access token (or the anon key when signed out) as the bearer.

use std::sync::RwLock;
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::config::SupabaseConfig;
use daycare_core::backend::{AuthChange, AuthSession};
use daycare_core::errors::{Error, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const AUTH_EVENT_CAPACITY: usize = 32;

#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    error_code: Option<String>,
}

/// A non-success response, reduced to what callers map into domain errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiFailure {
    pub status: StatusCode,
    pub code: Option<String>,
    pub message: String,
}

impl ApiFailure {
    /// Reads the error envelopes used by GoTrue, PostgREST and Storage.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(body) {
            let code = err.error_code.or(match err.code {
                Some(Value::String(s)) => Some(s),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            });
            let message = err
                .message
                .or(err.msg)
                .or(err.error_description)
                .or(err.error)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Self {
                status,
                code,
                message,
            };
        }
        Self {
            status,
            code: None,
            message: format!(
                "API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            ),
        }
    }
}

pub struct SupabaseClient {
    http: reqwest::Client,
    config: SupabaseConfig,
    session: RwLock<Option<AuthSession>>,
    auth_tx: broadcast::Sender<AuthChange>,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;
        let (auth_tx, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Ok(Self {
            http,
            config,
            session: RwLock::new(None),
            auth_tx,
        })
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    /// Token presented as bearer: the session's access token, else the anon key.
    pub(crate) fn access_token(&self) -> String {
        self.session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.config.anon_key().to_string())
    }

    pub(crate) fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("apikey"),
            header_value(self.config.anon_key())?,
        );
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", self.access_token()))?,
        );
        Ok(headers)
    }

    pub(crate) fn session(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn store_session(&self, session: Option<AuthSession>) {
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = session;
    }

    pub(crate) fn emit(&self, change: AuthChange) {
        debug!("auth change: {:?}", change.event);
        // No subscribers is fine.
        let _ = self.auth_tx.send(change);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_tx.subscribe()
    }
}

fn header_value(raw: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(raw)
        .map_err(|e| Error::Unexpected(format!("Invalid header value: {}", e)))
}

/// Splits a response into its body on success or an [`ApiFailure`].
pub(crate) async fn read_body(
    response: reqwest::Response,
) -> std::result::Result<String, ApiFailure> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status.is_success() {
        Ok(body)
    } else {
        Err(ApiFailure::from_body(status, &body))
    }
}
