//! Configuration system for the lead scoring engine.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod leadscore_config;
pub mod scoring_config;
pub mod storage_config;

pub use leadscore_config::{CliOverrides, LeadScoreConfig};
pub use scoring_config::{parse_cutoff_date, ScoringConfig, TransactionBoundary};
pub use storage_config::StorageConfig;
