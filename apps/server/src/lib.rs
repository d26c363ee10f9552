pub mod api;
pub mod config;
pub mod error;
pub mod events;
mod main_lib;

pub use main_lib::{build_state, build_state_with_backend, init_tracing, AppState, BackendStatus};
