//! Console event types.

use serde::{Deserialize, Serialize};

use crate::backend::Table;
use crate::navigation::Page;
use crate::session::Role;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// Events emitted by the console as it handles commands and backend
/// notifications.
///
/// Hosts forward these to the user interface: notifications become toasts,
/// `Navigated` moves the current view, `TableRefreshed` invalidates a cached
/// listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleEvent {
    /// A message for the user.
    Notification {
        level: NotificationLevel,
        message: String,
    },

    /// The page token changed.
    Navigated { page: Option<Page> },

    /// A table cache was replaced.
    TableRefreshed { table: Table, rows: usize },

    /// The acting identity or its role changed. `role` is `None` after
    /// sign-out.
    SessionChanged {
        role: Option<Role>,
        display_name: Option<String>,
    },
}

impl ConsoleEvent {
    pub fn notification(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self::Notification {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::notification(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::notification(NotificationLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::notification(NotificationLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::notification(NotificationLevel::Info, message)
    }

    /// Name used as the SSE event type.
    pub fn kind(&self) -> &'static str {
        match self {
            ConsoleEvent::Notification { .. } => "notification",
            ConsoleEvent::Navigated { .. } => "navigated",
            ConsoleEvent::TableRefreshed { .. } => "table_refreshed",
            ConsoleEvent::SessionChanged { .. } => "session_changed",
        }
    }
}
