//! Medications module - medications, administration logs and their service.

mod medications_model;
mod medications_service;

pub use medications_model::{Medication, MedicationInput, MedicationLog, MedicationLogInput};
pub use medications_service::MedicationService;
