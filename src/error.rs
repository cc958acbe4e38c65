//! Error types for toolshare
//!
//! Centralized error handling using thiserror. Transport-level failures live
//! in [`crate::api::ApiError`] and are wrapped here.

use thiserror::Error;

use crate::api::ApiError;

/// All error types that can occur in toolshare
#[derive(Debug, Error)]
pub enum ToolshareError {
    /// The backend request failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An operation needs a logged-in session
    #[error("You need to be logged in to {0}")]
    NotAuthenticated(String),

    /// Caller-supplied input was rejected before any request was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Latitude/longitude could not be parsed or is out of range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Reservation window or request is not acceptable
    #[error("Invalid reservation: {0}")]
    InvalidReservation(String),

    /// The tool exists but cannot be rented right now
    #[error("Tool unavailable: {0}")]
    ToolUnavailable(String),

    /// Local key-value storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolshareError {
    /// Text suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            ToolshareError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for toolshare operations
pub type Result<T> = std::result::Result<T, ToolshareError>;
