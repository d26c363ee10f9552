//! Daycare Core - Domain entities, services, and backend contracts.
//!
//! This crate contains the console logic for the daycare admin console.
//! It is backend-agnostic and defines traits that are implemented by the
//! `daycare-supabase` crate and by the in-memory backend used in tests.

pub mod announcements;
pub mod backend;
pub mod billing;
pub mod children;
pub mod console;
pub mod constants;
pub mod daily_reports;
pub mod dashboard;
pub mod errors;
pub mod events;
pub mod gallery;
pub mod incidents;
pub mod medications;
pub mod navigation;
pub mod parents;
pub mod rooms;
pub mod session;
pub mod staff;
pub mod sync;
pub mod utils;
pub mod waitlist;

pub use console::{CommandOutcome, Confirmation, Console, ConsoleConfig, DeleteTarget};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
