//! GoTrue-backed identity provider.

use std::future::Future;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use log::{debug, error, info, warn};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::client::{read_body, ApiFailure, SupabaseClient};
use daycare_core::backend::{AuthChange, AuthEvent, AuthSession, AuthUser, IdentityProvider};
use daycare_core::errors::{AuthError, Error, Result, StoreError};

/// Sessions are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Wait before retrying a refresh that failed for a transient reason.
const REFRESH_RETRY: std::time::Duration = std::time::Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

fn needs_refresh(session: &AuthSession, now: DateTime<Utc>) -> bool {
    session
        .expires_at
        .is_some_and(|at| at - now <= Duration::seconds(REFRESH_MARGIN_SECS))
}

/// Time until `session` is due for refresh. `None` when it never expires.
fn refresh_delay(session: &AuthSession, now: DateTime<Utc>) -> Option<std::time::Duration> {
    let due = session.expires_at? - Duration::seconds(REFRESH_MARGIN_SECS);
    Some((due - now).to_std().unwrap_or_default())
}

fn transport(e: reqwest::Error) -> Error {
    AuthError::Provider(format!("Failed to reach auth service: {}", e)).into()
}

async fn post_token(
    client: &SupabaseClient,
    grant_type: &str,
    body: serde_json::Value,
) -> Result<TokenResponse> {
    let url = client.endpoint(&format!("/auth/v1/token?grant_type={}", grant_type));
    let response = client
        .http()
        .post(url)
        .headers(client.headers()?)
        .json(&body)
        .send()
        .await
        .map_err(transport)?;
    let body = read_body(response).await.map_err(|failure| {
        if failure.status == StatusCode::BAD_REQUEST {
            Error::from(AuthError::InvalidCredentials(failure.message))
        } else {
            Error::from(AuthError::Provider(failure.message))
        }
    })?;
    serde_json::from_str(&body)
        .map_err(|e| AuthError::Provider(format!("Unexpected token response: {}", e)).into())
}

async fn exchange_refresh_token(client: Arc<SupabaseClient>, refresh_token: String) -> Result<AuthSession> {
    let token = post_token(
        &client,
        "refresh_token",
        json!({ "refresh_token": refresh_token }),
    )
    .await?;
    Ok(token.into_session(Utc::now()))
}

/// Applies the result of refreshing `previous`.
///
/// A new session is stored and announced with `TokenRefreshed`. A rejected
/// refresh token, or any failure once `previous` has expired, drops the
/// session, announces `SignedOut` and yields [`AuthError::SessionExpired`].
/// Other failures are returned unchanged and the session is kept. Results
/// for a session that was replaced in the meantime are discarded.
fn settle_refresh(
    client: &SupabaseClient,
    previous: &AuthSession,
    result: Result<AuthSession>,
) -> Result<Option<AuthSession>> {
    let still_current = client
        .session()
        .is_some_and(|s| s.refresh_token == previous.refresh_token);
    if !still_current {
        debug!("discarding refresh result for a replaced session");
        return Ok(client.session());
    }

    match result {
        Ok(fresh) => {
            debug!("refreshed session for {}", fresh.user.id);
            client.store_session(Some(fresh.clone()));
            client.emit(AuthChange::new(AuthEvent::TokenRefreshed, Some(fresh.clone())));
            Ok(Some(fresh))
        }
        Err(Error::Auth(AuthError::InvalidCredentials(msg))) => {
            warn!("session refresh rejected, signing out: {}", msg);
            expire(client)
        }
        Err(e) if previous.expires_at.is_some_and(|at| at <= Utc::now()) => {
            error!("session expired and could not be refreshed: {}", e);
            expire(client)
        }
        Err(e) => Err(e),
    }
}

fn expire(client: &SupabaseClient) -> Result<Option<AuthSession>> {
    client.store_session(None);
    client.emit(AuthChange::new(AuthEvent::SignedOut, None));
    Err(AuthError::SessionExpired.into())
}

/// Keeps the stored session fresh until it is gone or stops expiring.
async fn keep_fresh<F, Fut>(client: Arc<SupabaseClient>, exchange: F)
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<AuthSession>>,
{
    loop {
        let Some(session) = client.session() else {
            return;
        };
        let Some(delay) = refresh_delay(&session, Utc::now()) else {
            return;
        };
        tokio::time::sleep(delay).await;

        let result = exchange(session.refresh_token.clone()).await;
        match settle_refresh(&client, &session, result) {
            Ok(_) => {}
            Err(Error::Auth(AuthError::SessionExpired)) => return,
            Err(e) => {
                warn!("session refresh failed, retrying: {}", e);
                tokio::time::sleep(REFRESH_RETRY).await;
            }
        }
    }
}

pub struct SupabaseAuth {
    client: Arc<SupabaseClient>,
    refresher: Mutex<Option<JoinHandle<()>>>,
}

impl SupabaseAuth {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            refresher: Mutex::new(None),
        }
    }

    /// (Re)starts the background refresh for the stored session.
    fn schedule_refresh(&self) {
        let client = self.client.clone();
        let task = tokio::spawn(keep_fresh(client, {
            let client = self.client.clone();
            move |refresh_token| exchange_refresh_token(client.clone(), refresh_token)
        }));
        let previous = self
            .refresher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn ensure_refresh_scheduled(&self) {
        let running = self
            .refresher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|task| !task.is_finished());
        if !running {
            self.schedule_refresh();
        }
    }

    fn cancel_refresh(&self) {
        if let Some(task) = self.refresher.lock().unwrap_or_else(|e| e.into_inner()).take() {
            task.abort();
        }
    }
}

impl Drop for SupabaseAuth {
    fn drop(&mut self) {
        self.cancel_refresh();
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .http()
            .post(self.client.endpoint("/auth/v1/signup"))
            .headers(self.client.headers()?)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport)?;
        let body = read_body(response)
            .await
            .map_err(|failure: ApiFailure| AuthError::SignUpRejected(failure.message))?;

        // Projects with auto-confirm hand back a session straight away.
        if let Ok(token) = serde_json::from_str::<TokenResponse>(&body) {
            let session = token.into_session(Utc::now());
            info!("signed up and signed in {}", session.user.id);
            self.client.store_session(Some(session.clone()));
            self.schedule_refresh();
            self.client
                .emit(AuthChange::new(AuthEvent::SignedIn, Some(session)));
        } else {
            debug!("sign-up accepted, confirmation pending");
        }
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = post_token(
            &self.client,
            "password",
            json!({ "email": email, "password": password }),
        )
        .await?
        .into_session(Utc::now());
        info!("signed in {}", session.user.id);
        self.client.store_session(Some(session.clone()));
        self.schedule_refresh();
        self.client
            .emit(AuthChange::new(AuthEvent::SignedIn, Some(session.clone())));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.cancel_refresh();
        if self.client.session().is_some() {
            let result = self
                .client
                .http()
                .post(self.client.endpoint("/auth/v1/logout"))
                .headers(self.client.headers()?)
                .send()
                .await;
            match result {
                Ok(response) => {
                    if let Err(failure) = read_body(response).await {
                        warn!("logout rejected by auth service: {}", failure.message);
                    }
                }
                Err(e) => warn!("logout request failed: {}", e),
            }
        }
        // The local session is dropped even when the remote call fails.
        self.client.store_session(None);
        self.client
            .emit(AuthChange::new(AuthEvent::SignedOut, None));
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        let Some(session) = self.client.session() else {
            return Ok(None);
        };
        if !needs_refresh(&session, Utc::now()) {
            self.ensure_refresh_scheduled();
            return Ok(Some(session));
        }

        let result = exchange_refresh_token(self.client.clone(), session.refresh_token.clone()).await;
        match settle_refresh(&self.client, &session, result) {
            Ok(current) => {
                if current.is_some() {
                    self.ensure_refresh_scheduled();
                }
                Ok(current)
            }
            Err(Error::Auth(AuthError::SessionExpired)) => Ok(None),
            Err(e) => Err(Error::Store(StoreError::ConnectionFailed(e.user_message()))),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.client.subscribe()
    }
}
