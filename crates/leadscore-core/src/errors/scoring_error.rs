//! Scoring engine errors.
//! Aggregates subsystem errors via `From` conversions.

use super::error_code::{self, LeadScoreErrorCode};
use super::{ConfigError, StorageError};

/// Errors surfaced by the scoring engine entry points.
///
/// Data sparsity and bad whitelist/cutoff configuration are not errors:
/// they degrade to "unscored" or no-op results.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Permission denied: {operation} requires delete rights on the frequency table")]
    PermissionDenied { operation: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl LeadScoreErrorCode for ScoringError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::PermissionDenied { .. } => error_code::PERMISSION_DENIED,
            Self::InvalidInput { .. } => error_code::INVALID_INPUT,
        }
    }
}
