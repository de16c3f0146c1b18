/*!
 * Error types for the tweetbridge application.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when fetching posts from a source
#[derive(Error, Debug)]
pub enum FetchError {
    /// The primary channel reported HTTP 429; feeds the mode controller
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Network-level error; retried with backoff
    #[error("Transient fetch error: {0}")]
    Transient(String),

    /// Credential failure; not retried, surfaced to the operator
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The response could not be parsed into posts
    #[error("Failed to parse source response: {0}")]
    Parse(String),
}

impl FetchError {
    /// Whether this failure should count toward a primary-to-fallback switch
    pub fn counts_toward_switch(&self) -> bool {
        matches!(self, FetchError::RateLimited(_) | FetchError::Transient(_))
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Primary provider quota is exhausted; triggers provider fallback
    #[error("Translation quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Network-level error; retried with backoff before falling back
    #[error("Transient translation error: {0}")]
    Transient(String),

    /// Both providers failed; the post is skipped for this cycle
    #[error("Translation failed: {0}")]
    Fatal(String),
}

/// Errors that can occur when publishing to the target account
#[derive(Error, Debug)]
pub enum PublishError {
    /// Error when making the publish request
    #[error("Publish request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the target API itself
    #[error("Target API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The assembled message was rejected by local validation
    #[error("Invalid publish payload: {0}")]
    InvalidPayload(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Configuration or credential error; fatal, process exits after logging
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a post source
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from publishing
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
