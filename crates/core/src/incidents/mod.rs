//! Incidents module - incident reports and their service.

mod incidents_model;
mod incidents_service;

pub use incidents_model::{IncidentInput, IncidentReport, IncidentStatus};
pub use incidents_service::IncidentService;
