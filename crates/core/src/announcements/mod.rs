//! Announcements module.

mod announcements_model;
mod announcements_service;

pub use announcements_model::{Announcement, AnnouncementInput};
pub use announcements_service::AnnouncementService;
