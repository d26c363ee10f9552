use std::sync::Arc;

use crate::{
    config::Config,
    events::{BusEventSink, EventBus},
};
use daycare_core::backend::{Backend, DisabledBackend};
use daycare_core::{Console, ConsoleConfig};
use daycare_supabase::SupabaseConfig;
use serde::Serialize;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const EVENT_BUS_CAPACITY: usize = 256;

/// Whether the hosted backend is reachable in principle.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BackendStatus {
    Connected { url: String },
    Disabled { reason: String },
}

pub struct AppState {
    pub console: Arc<Console>,
    pub event_bus: EventBus,
    pub backend_status: BackendStatus,
}

pub fn init_tracing() {
    let log_format = std::env::var("DAYCARE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Connects to Supabase when configured. A missing or malformed
/// configuration leaves the console serving with every data operation
/// failing closed.
fn connect_backend() -> (Backend, BackendStatus) {
    let config = match SupabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Supabase configuration invalid, data operations disabled: {}", e);
            return disabled(e.to_string());
        }
    };
    let url = config.base_url().to_string();
    match daycare_supabase::connect(config) {
        Ok(backend) => (backend, BackendStatus::Connected { url }),
        Err(e) => {
            tracing::error!("Supabase client could not be created: {}", e);
            disabled(e.to_string())
        }
    }
}

fn disabled(reason: String) -> (Backend, BackendStatus) {
    (
        DisabledBackend::new(reason.clone()).into_backend(),
        BackendStatus::Disabled { reason },
    )
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let (backend, status) = connect_backend();
    build_state_with_backend(config, backend, status).await
}

/// Assembles the console over an already-built backend and restores any
/// existing session.
pub async fn build_state_with_backend(
    config: &Config,
    backend: Backend,
    backend_status: BackendStatus,
) -> anyhow::Result<Arc<AppState>> {
    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
    let sink = Arc::new(BusEventSink::new(event_bus.clone()));
    let console = Arc::new(Console::new(
        backend,
        sink,
        ConsoleConfig {
            resync_debounce: config.resync_debounce,
        },
    ));
    console.start().await;
    tracing::info!("Console started ({:?})", backend_status);

    Ok(Arc::new(AppState {
        console,
        event_bus,
        backend_status,
    }))
}
