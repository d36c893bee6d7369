//! # leadscore-core
//!
//! Shared foundation for the predictive lead scoring engine:
//! typed identifiers, constants, per-subsystem errors, layered TOML
//! configuration and tracing setup.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;

pub use config::LeadScoreConfig;
pub use errors::{ConfigError, LeadScoreErrorCode, ScoringError, StorageError};
pub use types::{LeadId, StageId, TagId, TeamId};
