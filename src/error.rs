//! Error types for Chatboard
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Chatboard operations
///
/// Each boundary of the application (credentials, the remote model, the
/// board storage, form validation) has its own variant so callers can tell
/// the failures apart instead of letting them propagate unhandled.
#[derive(Error, Debug)]
pub enum ChatboardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No API key could be found in any credential source
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The remote API rejected the credential (401/403, invalid key)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The remote API could not be reached (connect failure, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The remote API answered with an error or an unusable response
    #[error("Provider error: {0}")]
    Provider(String),

    /// The configured model could not be verified at startup
    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    /// A submitted form or message failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Board storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for Chatboard operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation. Use
/// [`error_kind`] to recover the typed variant at a boundary.
pub type Result<T> = anyhow::Result<T>;

/// Find the first [`ChatboardError`] in an error chain, if any.
pub fn error_kind(err: &anyhow::Error) -> Option<&ChatboardError> {
    err.chain().find_map(|e| e.downcast_ref::<ChatboardError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_config_error_display() {
        let error = ChatboardError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = ChatboardError::MissingCredentials("GOOGLE_API_KEY".to_string());
        assert_eq!(error.to_string(), "Missing credentials: GOOGLE_API_KEY");
    }

    #[test]
    fn test_network_error_display() {
        let error = ChatboardError::Network("connection refused".to_string());
        assert_eq!(error.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_model_init_error_display() {
        let error = ChatboardError::ModelInit("model not listed".to_string());
        assert_eq!(
            error.to_string(),
            "Model initialization failed: model not listed"
        );
    }

    #[test]
    fn test_validation_error_display() {
        let error = ChatboardError::Validation("title is required".to_string());
        assert_eq!(error.to_string(), "Validation error: title is required");
    }

    #[test]
    fn test_storage_error_display() {
        let error = ChatboardError::Storage("database is locked".to_string());
        assert_eq!(error.to_string(), "Storage error: database is locked");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ChatboardError = io_error.into();
        assert!(matches!(error, ChatboardError::Io(_)));
    }

    #[test]
    fn test_keyring_error_conversion() {
        let error: ChatboardError = keyring::Error::NoEntry.into();
        assert!(matches!(error, ChatboardError::Keyring(_)));
        assert!(error.to_string().starts_with("Keyring error:"));
    }

    #[test]
    fn test_error_kind_finds_typed_error_under_context() {
        let err: anyhow::Error = Err::<(), _>(ChatboardError::NotFound("post 7".into()))
            .context("Failed to update post")
            .unwrap_err();
        assert!(matches!(
            error_kind(&err),
            Some(ChatboardError::NotFound(_))
        ));
    }

    #[test]
    fn test_error_kind_none_for_foreign_error() {
        let err = anyhow::anyhow!("something else");
        assert!(error_kind(&err).is_none());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatboardError>();
    }
}
