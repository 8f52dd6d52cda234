//! SDK error types.
//!
//! [`SdkError`] is the single error type returned by every fallible
//! operation in the SDK. It wraps underlying transport, serialization and
//! validation errors into a unified enum.

use unilife_models::ModelError;

use crate::token::TokenError;

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Invalid or missing configuration (e.g. bad URL, missing field).
    #[error("configuration error: {0}")]
    Config(String),

    /// The bearer token could not be used for a session.
    #[error("invalid session token: {0}")]
    Token(#[from] TokenError),

    /// The backend answered with a non-success status.
    ///
    /// `401` and `403` usually mean the bound token expired between two
    /// refreshes; callers should surface a retry affordance.
    #[error("backend returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, or the backend's `message` field when present.
        message: String,
    },

    /// A record failed client-side validation before being sent.
    #[error("validation failed: {0}")]
    Validation(#[from] ModelError),

    /// HTTP request failure at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization / deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SdkError {
    /// Whether the backend rejected the request's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SdkError::Api { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_statuses() {
        let err = SdkError::Api {
            status: 401,
            message: "JWT expired".into(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "backend returned 401: JWT expired");

        let err = SdkError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert!(!err.is_unauthorized());
    }
}
