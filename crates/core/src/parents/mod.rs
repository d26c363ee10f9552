//! Parents module - parent records and their service.

mod parents_model;
mod parents_service;

pub use parents_model::{Parent, ParentInput};
pub use parents_service::ParentService;
