//! Waitlist module.

mod waitlist_model;
mod waitlist_service;

pub use waitlist_model::{WaitlistEntry, WaitlistInput, WaitlistStatus};
pub use waitlist_service::{WaitlistSave, WaitlistService};
