//! Error types for the tripkit client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for tripkit operations.
///
/// This error type covers all possible failure modes in the library,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (expired session, failed refresh).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// API errors (non-2xx responses, unexpected bodies).
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Input validation errors (invalid base URL, malformed response).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The access token was rejected again after a successful refresh.
    /// The request was already retried once and will not be retried again.
    #[error("session expired")]
    Expired,

    /// The token refresh itself failed. All requests waiting on the
    /// refresh observe this same outcome.
    #[error("token refresh failed: {0}")]
    RefreshFailed(#[from] RefreshError),
}

/// Failure modes of a token refresh attempt.
///
/// Cloneable: one refresh outcome is broadcast to every request queued
/// behind the in-flight refresh.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// No refresh token in the store; the refresh endpoint is never called.
    #[error("no refresh token stored")]
    MissingToken,

    /// The refresh endpoint rejected the refresh token.
    #[error("refresh rejected with HTTP {status}")]
    Rejected { status: u16 },

    /// The refresh call failed at the transport level.
    #[error("refresh transport failure: {message}")]
    Transport { message: String },

    /// The refresh attempt was dropped before settling.
    #[error("refresh aborted")]
    Aborted,
}

/// An error response from the marketplace API.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub code: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    /// Check if this is an authentication failure.
    ///
    /// Only the 401 status is contractually relevant; error codes in the
    /// body are informational.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A response body did not match the expected shape.
    #[error("malformed response: {message}")]
    Response { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_code_and_message() {
        let err = ApiError::new(
            422,
            Some("CourseFull".to_string()),
            Some("no seats left".to_string()),
        );
        assert_eq!(err.to_string(), "HTTP 422 [CourseFull]: no seats left");
    }

    #[test]
    fn only_401_is_an_auth_error() {
        assert!(ApiError::new(401, None, None).is_auth_error());
        assert!(!ApiError::new(403, Some("Forbidden".to_string()), None).is_auth_error());
        assert!(!ApiError::new(500, None, None).is_auth_error());
    }

    #[test]
    fn refresh_error_is_cloneable() {
        let err = RefreshError::Rejected { status: 401 };
        assert_eq!(err.clone(), err);
    }
}
