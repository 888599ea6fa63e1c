//! Error types for the Fesnuk client.
//!
//! This module defines the centralized error type [`FesnukError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. Every remote
//! failure, whatever its cause, ends up as one of these variants and is turned
//! into a human-readable message at the controller boundary.

use thiserror::Error;

/// The main error type for Fesnuk client operations.
///
/// Variants follow the failure taxonomy of the client: transport failures,
/// non-success status codes, empty or malformed bodies, form validation,
/// local storage and configuration problems.
///
/// # Examples
///
/// ```
/// use fesnuk::FesnukError;
///
/// fn validate_title(title: &str) -> Result<(), FesnukError> {
///     if title.trim().is_empty() {
///         return Err(FesnukError::Validation("Please enter a title".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_title("  ").is_err());
/// ```
#[derive(Debug, Error)]
pub enum FesnukError {
    /// The request never produced a response (DNS, TLS, timeout, connection reset).
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status code.
    #[error("API call failed with code: {code}")]
    Status {
        /// HTTP status code returned by the server.
        code: u16,
    },

    /// The server answered 2xx but without the body the call requires.
    #[error("Empty response body")]
    EmptyBody,

    /// The response body could not be decoded into the expected record.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// A form field failed validation before any network call was made.
    ///
    /// The string is the message shown to the user verbatim.
    #[error("{0}")]
    Validation(String),

    /// Reading or writing the local reaction store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Wraps errors from standard library I/O operations. Automatically converts
    /// from `std::io::Error` using the `#[from]` attribute.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FesnukError {
    /// Returns `true` for failures that happened before any request was sent.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<reqwest::Error> for FesnukError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return Self::Status {
                code: status.as_u16(),
            };
        }
        if error.is_decode() {
            return Self::Decode(error.to_string());
        }
        Self::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for FesnukError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// A specialized `Result` type for Fesnuk operations.
///
/// This is a type alias for `std::result::Result<T, FesnukError>` that simplifies
/// function signatures throughout the codebase.
pub type Result<T> = std::result::Result<T, FesnukError>;
