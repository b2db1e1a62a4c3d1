//! Typed errors for the fusion library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Only [`FusionError::Config`] is a hard error for a pipeline run. Oracle
//! failures are recovered locally with documented fallbacks: a failed
//! similarity comparison counts as "not similar", a failed chunk summary
//! keeps the pre-call text, and a failed classification falls through to
//! keyword matching.

use thiserror::Error;

/// Errors that can occur during fusion operations.
#[derive(Debug, Error)]
pub enum FusionError {
    /// Invalid configuration, rejected before any oracle call
    #[error("config error: {reason}")]
    Config { reason: String },

    /// Oracle call failed outright (network, timeout, provider error)
    #[error("oracle error: {0}")]
    Oracle(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Oracle returned output that cannot be used as requested
    #[error("malformed oracle output: {what}")]
    MalformedOutput { what: String },

    /// Full-text fetch failed
    #[error("fetch error: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

impl FusionError {
    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create an oracle error from any error source.
    pub fn oracle(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Oracle(Box::new(source))
    }

    /// Create an oracle error from a plain message.
    pub fn oracle_msg(message: impl Into<String>) -> Self {
        Self::Oracle(message.into().into())
    }

    /// Create a malformed-output error.
    pub fn malformed(what: impl Into<String>) -> Self {
        Self::MalformedOutput { what: what.into() }
    }
}

/// Result type alias for fusion operations.
pub type Result<T> = std::result::Result<T, FusionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = FusionError::config("categories must not be empty");
        assert_eq!(
            err.to_string(),
            "config error: categories must not be empty"
        );
    }

    #[test]
    fn test_oracle_error_from_message() {
        let err = FusionError::oracle_msg("connection refused");
        assert!(err.to_string().contains("connection refused"));
    }
}
