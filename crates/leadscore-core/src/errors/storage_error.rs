//! Storage-layer errors for SQLite operations.

use super::error_code::{self, LeadScoreErrorCode};

/// Errors raised by the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Database busy: {message}")]
    Busy { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Lead {id} not found")]
    LeadNotFound { id: i64 },

    #[error("Unknown lead feature column: {column}")]
    UnknownColumn { column: String },
}

impl StorageError {
    /// Map a rusqlite-style error message, keeping lock contention distinguishable.
    pub fn sqlite(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("database is locked") || message.contains("database table is locked") {
            Self::Busy { message }
        } else {
            Self::SqliteError { message }
        }
    }
}

impl LeadScoreErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy { .. } => error_code::DB_BUSY,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::UnknownColumn { .. } => error_code::INVALID_INPUT,
            Self::SqliteError { .. } | Self::LeadNotFound { .. } => error_code::STORAGE_ERROR,
        }
    }
}
