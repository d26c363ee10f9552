//! Daycare Supabase - hosted backend adapters for the daycare console.
//!
//! Implements the identity, record store, blob store and change feed
//! contracts from `daycare-core` against a Supabase project (GoTrue,
//! PostgREST, Storage and Realtime).

pub mod auth;
pub mod client;
pub mod config;
pub mod realtime;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use daycare_core::backend::Backend;
use daycare_core::errors::Result;

pub use auth::SupabaseAuth;
pub use client::SupabaseClient;
pub use config::{ConfigError, SupabaseConfig};
pub use realtime::{ReconnectPolicy, SupabaseRealtime};
pub use rest::SupabaseRest;
pub use storage::SupabaseStorage;

/// Builds all four collaborators over one shared client, so the record
/// store and change feed act as the signed-in user.
pub fn connect(config: SupabaseConfig) -> Result<Backend> {
    log::info!("connecting to Supabase project at {}", config.base_url());
    let client = Arc::new(SupabaseClient::new(config)?);
    Ok(Backend {
        identity: Arc::new(SupabaseAuth::new(client.clone())),
        records: Arc::new(SupabaseRest::new(client.clone())),
        blobs: Arc::new(SupabaseStorage::new(client.clone())),
        feed: Arc::new(SupabaseRealtime::new(client)),
    })
}
