//! API error handling
//!
//! Typed errors for every call that goes through the HTTP adapter, with
//! messages suitable for showing inline next to the failed action.

use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by the API client and the layers above it
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server rejected our credentials; the session has been cleared
    #[error("Session expired or invalid. Please log in again.")]
    Unauthorized,

    /// No session credentials are stored
    #[error("Not logged in. Run `flashdeck login` first.")]
    NotAuthenticated,

    /// Resource does not exist (or is not ours)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected, either client-side or by the server (400/422)
    #[error("{0}")]
    Validation(String),

    /// Any other non-success status
    #[error("Server returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// Rating outside 1..=4
    #[error("Invalid rating {0}: expected 1 (hard) to 4 (perfect)")]
    InvalidRating(u8),

    /// Connection, TLS or body transfer failure
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    /// Persisting or clearing the local session failed
    #[error("Session storage error: {0}")]
    Session(#[from] CredentialError),

    /// Local file access (imports)
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ApiError {
    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    /// Whether the caller should redirect instead of showing an error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Whether the failure ended the session
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::NotAuthenticated)
    }

    /// Short message for an inline error flag
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Transport(_) => "Could not reach the server".to_string(),
            ApiError::Decode(_) => "The server sent an unexpected response".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors reading or writing the persisted session
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to read session file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write session file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Session file '{path}' is not valid: {details}")]
    Corrupt { path: PathBuf, details: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let err = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: "upstream".into(),
        };
        assert!(err.is_retryable());

        let err = ApiError::Status {
            status: StatusCode::CONFLICT,
            message: "duplicate".into(),
        };
        assert!(!err.is_retryable());

        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::NotFound("card 7".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::InvalidRating(9);
        assert!(err.to_string().contains("1 (hard) to 4 (perfect)"));

        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_auth_and_not_found_flags() {
        assert!(ApiError::Unauthorized.is_auth());
        assert!(ApiError::NotAuthenticated.is_auth());
        assert!(ApiError::NotFound("x".into()).is_not_found());
        assert!(!ApiError::Validation("bad".into()).is_auth());
    }

    #[test]
    fn test_user_message() {
        let err = ApiError::Status {
            status: StatusCode::CONFLICT,
            message: "Card already exists".into(),
        };
        assert_eq!(err.user_message(), "Card already exists");
        assert_eq!(
            ApiError::Validation("Word is required".into()).user_message(),
            "Word is required"
        );
    }
}
