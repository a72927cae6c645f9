//! Error types for the ERP backend client.
//!
//! [`ErpError`] separates the failures an operator can act on (bad input,
//! unknown job card, missing credentials) from transport and service faults.

use thiserror::Error;

use crate::production::InvalidJobCard;

/// Errors that can occur while talking to the ERP backend.
#[derive(Debug, Error)]
pub enum ErpError {
    /// Transport failure (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP 401/403.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// HTTP 404 or an unknown job-card number.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request rejected as invalid, locally or by the backend (400/422).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Any other non-success answer, including `success: false` envelopes.
    #[error("service error (status {status}): {message}")]
    Service { status: u16, message: String },

    /// The backend answered 2xx but the body did not match the expected schema.
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The credential provider could not produce a token.
    #[error("credentials unavailable: {0}")]
    Credentials(String),
}

impl From<InvalidJobCard> for ErpError {
    fn from(err: InvalidJobCard) -> Self {
        ErpError::Validation(err.to_string())
    }
}
