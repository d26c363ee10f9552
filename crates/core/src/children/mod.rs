//! Children module - child records, check-in state and their service.

mod children_model;
mod children_service;


pub use children_model::{CheckInUpdate, Child, ChildInput, ParentSummary};
pub use children_service::ChildService;
