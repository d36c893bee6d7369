//! Error handling for the lead scoring engine.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod scoring_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::LeadScoreErrorCode;
pub use scoring_error::ScoringError;
pub use storage_error::StorageError;
