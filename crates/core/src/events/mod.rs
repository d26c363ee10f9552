//! Console events module.
//!
//! Provides the event types the console emits (notifications, navigation,
//! table refreshes, session changes) and the sink trait hosts implement to
//! forward them to connected clients.

mod console_event;
mod sink;

pub use console_event::*;
pub use sink::*;
