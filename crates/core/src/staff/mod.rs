//! Staff module - staff records and their service.

mod staff_model;
mod staff_service;

pub use staff_model::{StaffInput, StaffMember};
pub use staff_service::StaffService;
