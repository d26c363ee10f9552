//! Session module - acting identity, role model and the role resolver.

mod session_model;
mod session_service;

#[cfg(test)]
mod session_service_tests;

pub use session_model::{CurrentUser, Role, SessionSnapshot};
pub use session_service::RoleResolver;
