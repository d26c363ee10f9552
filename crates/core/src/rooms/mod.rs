//! Rooms module.

mod rooms_model;
mod rooms_service;

pub use rooms_model::{Room, RoomInput};
pub use rooms_service::RoomService;
