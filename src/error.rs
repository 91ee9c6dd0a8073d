//! Error types for the rating engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate. Typed variants are wrapped into `anyhow::Error` and can be
//! recovered with `downcast_ref::<RatingError>()`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("Malformed match {match_id}: {reason}")]
    MalformedMatch { match_id: String, reason: String },

    #[error("Invalid side in match {match_id}: {reason}")]
    InvalidSide { match_id: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal engine error: {message}")]
    InternalError { message: String },
}
