//! Errors surfaced to the user when a submission fails.
//!
//! Each module owns the errors it raises (`ValidationError` in `request`,
//! `MergeError` in `merge`, `PresetError` in `preset`). `SubmitError` is the
//! one a front end displays in its error banner: it halts the in-flight
//! submission and renders as a single human-readable message.

use thiserror::Error;

use crate::request::ValidationError;

/// Message shown when the service fails without saying why.
pub const SERVER_ERROR_FALLBACK: &str = "server error";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// Bad input, caught before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Service unreachable, connection dropped, or a body that is not the
    /// expected JSON.
    #[error("Connection failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("{message}")]
    Service { status: u16, message: String },
}

impl SubmitError {
    /// Build a service error from the optional `error` field of the body.
    pub fn service(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| SERVER_ERROR_FALLBACK.to_string());
        SubmitError::Service { status, message }
    }

    /// User-input problems are not system faults and are not logged as such.
    pub fn is_user_error(&self) -> bool {
        matches!(self, SubmitError::Validation(_))
    }
}
