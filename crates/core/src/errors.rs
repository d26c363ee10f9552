//! Core error types for the daycare console.
//!
//! This module defines backend-agnostic error types. Transport-specific errors
//! (HTTP, websocket, JSON bodies returned by the hosted backend) are converted
//! to these types by the backend adapter crate.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the console.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Record store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("File upload failed: {0}")]
    Upload(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    ConstraintViolation(String),

    #[error("Backend is not configured: {0}")]
    BackendDisabled(String),

    #[error("{0}")]
    NotFound(String),

    #[error("No active session")]
    NoSession,

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Backend-agnostic error type for record store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Failed to reach record store: {0}")]
    ConnectionFailed(String),

    /// The backend rejected or failed the query.
    #[error("{0}")]
    QueryFailed(String),

    /// A row came back in a shape the console cannot read.
    #[error("Failed to decode rows from '{table}': {message}")]
    Decode { table: String, message: String },

    /// Row-level access policies denied the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),
}

/// Errors surfaced by the identity provider.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    SignUpRejected(String),

    #[error("Session expired. Please sign in again.")]
    SessionExpired,

    #[error("{0}")]
    Provider(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} is required.")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl Error {
    /// True for errors raised before any backend call was issued.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Duplicate(_) | Error::ConstraintViolation(_)
        )
    }

    /// Message shown to the user. Rejections and backend messages are shown
    /// without the category prefix.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(e) => e.to_string(),
            Error::Store(
                StoreError::QueryFailed(msg)
                | StoreError::UniqueViolation(msg)
                | StoreError::PermissionDenied(msg),
            ) => msg.clone(),
            Error::Auth(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(format!("JSON error: {}", err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
