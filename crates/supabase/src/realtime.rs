//! Supabase Realtime change feed over the Phoenix websocket protocol.
//!
//! Each subscription opens its own socket, joins `realtime:{channel}` with a
//! `postgres_changes` listener per table and forwards row changes until the
//! subscription is dropped, at which point the channel is left and the socket
//! closed. A lost socket is reopened and the channel rejoined with
//! exponential backoff; once the attempts run out the subscription ends.
//! Refreshed access tokens are pushed to the joined channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant};
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};

use crate::client::SupabaseClient;
use daycare_core::backend::{
    AuthChange, AuthEvent, ChangeEvent, ChangeFeed, ChangeKind, FeedSubscription, Table,
};
use daycare_core::errors::{Result, StoreError};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const PROTOCOL_VERSION: &str = "1.0.0";
const EVENT_BUFFER: usize = 64;
const JOIN_REF: &str = "1";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Backoff between reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
    /// Consecutive failed attempts before the subscription gives up.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
            max_attempts: 8,
        }
    }
}

impl ReconnectPolicy {
    /// Wait before attempt number `attempt`, counting from 1.
    fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial.saturating_mul(factor).min(self.max)
    }
}

/// What a frame from the server means for the subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Incoming {
    Change(ChangeEvent),
    Joined,
    JoinFailed(String),
    Closed,
    Ignored,
}

/// Websocket endpoint derived from the project URL.
fn socket_url(base_url: &str, anon_key: &str) -> String {
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base_url.to_string()
    };
    format!(
        "{}/realtime/v1/websocket?apikey={}&vsn={}",
        ws_base,
        urlencoding::encode(anon_key),
        PROTOCOL_VERSION
    )
}

fn topic(channel: &str) -> String {
    format!("realtime:{}", channel)
}

fn join_message(channel: &str, tables: &[Table], access_token: &str) -> Value {
    let changes: Vec<Value> = tables
        .iter()
        .map(|table| json!({ "event": "*", "schema": "public", "table": table.name() }))
        .collect();
    json!({
        "topic": topic(channel),
        "event": "phx_join",
        "payload": {
            "config": {
                "broadcast": { "self": false, "ack": false },
                "presence": { "key": "" },
                "postgres_changes": changes,
                "private": false
            },
            "access_token": access_token
        },
        "ref": JOIN_REF,
        "join_ref": JOIN_REF
    })
}

fn leave_message(channel: &str, msg_ref: u64) -> Value {
    json!({
        "topic": topic(channel),
        "event": "phx_leave",
        "payload": {},
        "ref": msg_ref.to_string(),
        "join_ref": JOIN_REF
    })
}

fn access_token_message(channel: &str, access_token: &str, msg_ref: u64) -> Value {
    json!({
        "topic": topic(channel),
        "event": "access_token",
        "payload": { "access_token": access_token },
        "ref": msg_ref.to_string(),
        "join_ref": JOIN_REF
    })
}

fn heartbeat_message(msg_ref: u64) -> Value {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": msg_ref.to_string()
    })
}

fn parse_incoming(text: &str) -> Incoming {
    let Ok(frame) = serde_json::from_str::<Value>(text) else {
        return Incoming::Ignored;
    };
    let event = frame["event"].as_str().unwrap_or_default();
    match event {
        "postgres_changes" => {
            let data = &frame["payload"]["data"];
            let table = data["table"].as_str().and_then(|t| t.parse::<Table>().ok());
            let kind = serde_json::from_value::<ChangeKind>(data["type"].clone()).ok();
            match (table, kind) {
                (Some(table), Some(kind)) => Incoming::Change(ChangeEvent { table, kind }),
                _ => Incoming::Ignored,
            }
        }
        "phx_reply" if frame["payload"]["status"] == "error" => Incoming::JoinFailed(
            frame["payload"]["response"]["reason"]
                .as_str()
                .unwrap_or("join rejected")
                .to_string(),
        ),
        "phx_reply" if frame["payload"]["status"] == "ok" && frame["ref"] == JOIN_REF => {
            Incoming::Joined
        }
        "phx_close" => Incoming::Closed,
        "system" if frame["payload"]["status"] == "error" => Incoming::JoinFailed(
            frame["payload"]["message"]
                .as_str()
                .unwrap_or("subscription error")
                .to_string(),
        ),
        _ => Incoming::Ignored,
    }
}

pub struct SupabaseRealtime {
    client: Arc<SupabaseClient>,
    socket_url: String,
    reconnect: ReconnectPolicy,
}

impl SupabaseRealtime {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        let config = client.config();
        let socket_url = socket_url(config.base_url(), config.anon_key());
        Self {
            client,
            socket_url,
            reconnect: ReconnectPolicy::default(),
        }
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }
}

#[async_trait]
impl ChangeFeed for SupabaseRealtime {
    async fn subscribe(&self, channel: &str, tables: &[Table]) -> Result<FeedSubscription> {
        let (socket, _) = connect_async(self.socket_url.as_str()).await.map_err(|e| {
            StoreError::ConnectionFailed(format!("Realtime connection failed: {}", e))
        })?;

        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let feed = Feed {
            client: self.client.clone(),
            socket_url: self.socket_url.clone(),
            reconnect: self.reconnect,
            channel: channel.to_string(),
            tables: tables.to_vec(),
            events_tx,
            auth_rx: self.client.subscribe(),
            auth_open: true,
            msg_ref: 1,
            attempt: 0,
        };
        tokio::spawn(feed.run(socket, shutdown_rx));

        Ok(FeedSubscription::new(events_rx, Some(shutdown_tx)))
    }
}

/// How one socket's session ended.
enum Ended {
    Shutdown,
    Lost(String),
}

/// State of one subscription's socket task.
struct Feed {
    client: Arc<SupabaseClient>,
    socket_url: String,
    reconnect: ReconnectPolicy,
    channel: String,
    tables: Vec<Table>,
    events_tx: mpsc::Sender<ChangeEvent>,
    auth_rx: broadcast::Receiver<AuthChange>,
    auth_open: bool,
    msg_ref: u64,
    /// Consecutive reconnects without a successful join.
    attempt: u32,
}

impl Feed {
    async fn run(mut self, socket: Socket, mut shutdown_rx: oneshot::Receiver<()>) {
        let mut socket = Some(socket);
        loop {
            if let Some(socket) = socket.take() {
                match self.pump(socket, &mut shutdown_rx).await {
                    Ended::Shutdown => return,
                    Ended::Lost(reason) => {
                        warn!("realtime channel {} lost: {}", self.channel, reason)
                    }
                }
            }

            self.attempt += 1;
            if self.attempt > self.reconnect.max_attempts {
                error!(
                    "realtime channel {} gave up after {} reconnect attempts",
                    self.channel, self.reconnect.max_attempts
                );
                return;
            }
            let delay = self.reconnect.delay(self.attempt);
            debug!(
                "reconnecting realtime channel {} in {:?} (attempt {})",
                self.channel, delay, self.attempt
            );
            tokio::select! {
                _ = &mut shutdown_rx => return,
                _ = self.events_tx.closed() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            match connect_async(self.socket_url.as_str()).await {
                Ok((reopened, _)) => socket = Some(reopened),
                Err(e) => warn!("realtime reconnect failed on {}: {}", self.channel, e),
            }
        }
    }

    /// Joins the channel on `socket` and forwards frames until the socket
    /// goes away or the subscriber leaves.
    async fn pump(&mut self, socket: Socket, shutdown_rx: &mut oneshot::Receiver<()>) -> Ended {
        let (mut sink, mut stream) = socket.split();

        let join = join_message(&self.channel, &self.tables, &self.client.access_token());
        if let Err(e) = sink.send(Message::text(join.to_string())).await {
            return Ended::Lost(format!("join failed: {}", e));
        }
        debug!("joining realtime channel {} ({} tables)", self.channel, self.tables.len());

        let mut heartbeat = interval_at(Instant::now() + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);
        loop {
            tokio::select! {
                _ = &mut *shutdown_rx => {
                    self.msg_ref += 1;
                    let leave = leave_message(&self.channel, self.msg_ref);
                    let _ = sink.send(Message::text(leave.to_string())).await;
                    let _ = sink.close().await;
                    debug!("left realtime channel {}", self.channel);
                    return Ended::Shutdown;
                }
                _ = heartbeat.tick() => {
                    self.msg_ref += 1;
                    let beat = heartbeat_message(self.msg_ref);
                    if let Err(e) = sink.send(Message::text(beat.to_string())).await {
                        return Ended::Lost(format!("heartbeat failed: {}", e));
                    }
                }
                change = self.auth_rx.recv(), if self.auth_open => match change {
                    Ok(AuthChange { event: AuthEvent::TokenRefreshed, session: Some(session) }) => {
                        self.msg_ref += 1;
                        let push = access_token_message(&self.channel, &session.access_token, self.msg_ref);
                        if let Err(e) = sink.send(Message::text(push.to_string())).await {
                            return Ended::Lost(format!("token push failed: {}", e));
                        }
                        debug!("pushed refreshed token to realtime channel {}", self.channel);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("realtime channel {} skipped {} auth change(s)", self.channel, skipped);
                    }
                    Err(RecvError::Closed) => self.auth_open = false,
                },
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => match parse_incoming(text.as_str()) {
                        Incoming::Change(event) => {
                            if self.events_tx.send(event).await.is_err() {
                                return Ended::Shutdown;
                            }
                        }
                        Incoming::Joined => {
                            info!("joined realtime channel {}", self.channel);
                            self.attempt = 0;
                        }
                        Incoming::JoinFailed(reason) => {
                            return Ended::Lost(format!("join rejected: {}", reason));
                        }
                        Incoming::Closed => return Ended::Lost("closed by server".to_string()),
                        Incoming::Ignored => {}
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        return Ended::Lost("socket closed".to_string());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Ended::Lost(format!("socket error: {}", e)),
                }
            }
        }
    }
}
