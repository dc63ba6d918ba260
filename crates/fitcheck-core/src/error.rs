//! Error types for the FitCheck engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire FitCheck workspace.
///
/// Resolution failures degrade a single garment slot, generation failures
/// surface a friendly message, and persistence failures are logged and never
/// reach the user. Operations refused by the studio's guards are not errors;
/// they come back as skipped outcomes.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FitCheckError {
    /// A garment image could not be resolved to bytes
    #[error("Resolution error for '{url}': {message}")]
    Resolution { url: String, message: String },

    /// The generation capability rejected the request or was unreachable
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Durable storage failure (quota, unavailable store, ...)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Typed failure of the external generation capability.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationError {
    /// The request could not be built (missing base image, unreadable payload, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The backend could not be reached at all
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered with an error
    #[error("backend rejected request ({status:?}): {message}")]
    Rejected {
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    /// The backend answered successfully but without an image
    #[error("backend returned no image")]
    EmptyResult,
}

impl GenerationError {
    /// Whether repeating the same action later could succeed.
    ///
    /// Retrying is always left to the user.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Rejected { retryable, .. } => *retryable,
            Self::InvalidInput(_) | Self::EmptyResult => false,
        }
    }
}

impl FitCheckError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Resolution error
    pub fn resolution(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FitCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FitCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FitCheckError>`.
pub type Result<T> = std::result::Result<T, FitCheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_retryable() {
        assert!(GenerationError::Unreachable("offline".into()).is_retryable());
        assert!(
            GenerationError::Rejected {
                status: Some(429),
                message: "slow down".into(),
                retryable: true,
            }
            .is_retryable()
        );
        assert!(!GenerationError::EmptyResult.is_retryable());
        assert!(!GenerationError::InvalidInput("no base".into()).is_retryable());
    }

    #[test]
    fn test_generation_error_converts() {
        let err: FitCheckError = GenerationError::EmptyResult.into();
        assert!(err.is_generation());
        assert!(!err.is_persistence());
    }

    #[test]
    fn test_json_error_is_serialization() {
        let err: FitCheckError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.is_serialization());
    }
}
