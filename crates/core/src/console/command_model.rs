use serde::{Deserialize, Serialize};

use crate::navigation::Page;

/// Result of an entity command, mirrored by the notification it emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The store accepted the write. `page` is where the console navigated.
    Completed { message: String, page: Option<Page> },
    /// Refused before the write was issued.
    Rejected { message: String },
    /// A destructive command was not confirmed. Nothing was sent.
    Cancelled,
    /// The backend failed the call.
    Failed { message: String },
}

impl CommandOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CommandOutcome::Completed { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CommandOutcome::Completed { message, .. }
            | CommandOutcome::Rejected { message }
            | CommandOutcome::Failed { message } => Some(message),
            CommandOutcome::Cancelled => None,
        }
    }
}

/// The user's answer to a delete prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Entities whose deletion must be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteTarget {
    Child,
    Staff,
    Room,
    Medication,
    Announcement,
    WaitlistEntry,
    Parent,
}

impl DeleteTarget {
    /// Question shown before the delete is sent.
    pub fn prompt(&self) -> &'static str {
        match self {
            DeleteTarget::Child => {
                "Are you sure you want to delete this child? This action cannot be undone."
            }
            DeleteTarget::Staff => "Are you sure you want to delete this staff member?",
            DeleteTarget::Room => "Are you sure you want to delete this room?",
            DeleteTarget::Medication => "Delete medication?",
            DeleteTarget::Announcement => "Delete announcement?",
            DeleteTarget::WaitlistEntry => "Remove from waitlist?",
            DeleteTarget::Parent => "Delete parent? This may affect linked children.",
        }
    }
}
