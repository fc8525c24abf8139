//! Error types for platform parsing, detection and configuration.
//!
//! Matching and ordering never fail, so there is no error variant for them:
//! an unknown Windows build combination is simply "not compatible".

use std::path::PathBuf;

/// Result type alias for platform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving platforms.
///
/// The type is `Clone` so that a memoized failure (detection or overlay load)
/// can be handed to every caller that asks after the first attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Specifier Errors
    // =========================================================================
    /// Specifier string violates the platform grammar.
    #[error("invalid platform specifier '{specifier}': {reason}")]
    InvalidFormat { specifier: String, reason: String },

    // =========================================================================
    // Host Detection Errors
    // =========================================================================
    /// CPU variant or microarchitecture detection could not complete.
    #[error("cpu variant detection failed: {0}")]
    Detection(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Platform configuration overlay exists but could not be read or parsed.
    #[error("failed to load platform config at {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn invalid(specifier: &str, reason: impl Into<String>) -> Self {
        Error::InvalidFormat {
            specifier: specifier.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error came from a malformed specifier.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Error::InvalidFormat { .. })
    }
}
