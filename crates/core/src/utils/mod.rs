//! Shared helpers.

pub mod serde_input;
pub mod text;
