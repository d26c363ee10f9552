//! The console - explicit application state wiring session handling, table
//! caches, navigation and entity commands.

mod command_model;
mod commands;
mod console_service;

#[cfg(test)]
mod console_service_tests;

pub use command_model::{CommandOutcome, Confirmation, DeleteTarget};
pub use console_service::{Console, ConsoleConfig};
