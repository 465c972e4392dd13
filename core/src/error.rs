//! Error types for the rental API client.
//!
//! # Design
//! Every failure a screen can hit collapses into `ApiError`, and its
//! `Display` output is what the user sees verbatim. `NotFound` gets a
//! dedicated variant because callers frequently distinguish "the rental does
//! not exist" from "the server refused the request". All other non-2xx
//! responses land in `Http` carrying the backend's own message.

use thiserror::Error;

/// Errors returned by `RentalClient` parse methods and by transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// No response was obtained (connection refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Form input rejected before any request was issued.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
