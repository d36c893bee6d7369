//! Top-level configuration with 4-layer resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ScoringConfig, StorageConfig, TransactionBoundary};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`LEADSCORE_*`)
/// 3. Project config (`leadscore.toml` in project root)
/// 4. User config (`~/.leadscore/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LeadScoreConfig {
    pub scoring: ScoringConfig,
    pub storage: StorageConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub pls_fields: Option<String>,
    pub pls_start_date: Option<String>,
    pub compute_batch_size: Option<usize>,
    pub update_batch_size: Option<usize>,
    pub transaction_boundary: Option<TransactionBoundary>,
    pub database_path: Option<String>,
}

impl LeadScoreConfig {
    /// Load configuration with 4-layer resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(err @ ConfigError::ParseError { .. }) => return Err(err),
                    Err(err) => {
                        tracing::warn!(error = %err, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the values the engine owns.
    ///
    /// The whitelist and the cutoff date belong to the surrounding system and
    /// are deliberately not checked here.
    pub fn validate(config: &LeadScoreConfig) -> Result<(), ConfigError> {
        if config.scoring.compute_batch_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scoring.compute_batch_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.scoring.update_batch_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scoring.update_batch_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(samples) = config.scoring.tag_min_samples {
            if !samples.is_finite() || samples < 0.0 {
                return Err(ConfigError::ValidationFailed {
                    field: "scoring.tag_min_samples".to_string(),
                    message: "must be a non-negative number".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.leadscore/config.toml`.
    fn user_config_path() -> Option<std::path::PathBuf> {
        home_dir().map(|h| h.join(".leadscore").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut LeadScoreConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: LeadScoreConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut LeadScoreConfig, other: &LeadScoreConfig) {
        let scoring = &other.scoring;
        if scoring.pls_fields.is_some() {
            base.scoring.pls_fields = scoring.pls_fields.clone();
        }
        if scoring.pls_start_date.is_some() {
            base.scoring.pls_start_date = scoring.pls_start_date.clone();
        }
        if scoring.compute_batch_size.is_some() {
            base.scoring.compute_batch_size = scoring.compute_batch_size;
        }
        if scoring.update_batch_size.is_some() {
            base.scoring.update_batch_size = scoring.update_batch_size;
        }
        if scoring.tag_min_samples.is_some() {
            base.scoring.tag_min_samples = scoring.tag_min_samples;
        }
        if scoring.transaction_boundary.is_some() {
            base.scoring.transaction_boundary = scoring.transaction_boundary;
        }

        if other.storage.database_path.is_some() {
            base.storage.database_path = other.storage.database_path.clone();
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `LEADSCORE_PLS_FIELDS`, `LEADSCORE_COMPUTE_BATCH_SIZE`, etc.
    fn apply_env_overrides(config: &mut LeadScoreConfig) {
        if let Ok(val) = std::env::var("LEADSCORE_PLS_FIELDS") {
            config.scoring.pls_fields = Some(val);
        }
        if let Ok(val) = std::env::var("LEADSCORE_PLS_START_DATE") {
            config.scoring.pls_start_date = Some(val);
        }
        if let Ok(val) = std::env::var("LEADSCORE_COMPUTE_BATCH_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.scoring.compute_batch_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("LEADSCORE_UPDATE_BATCH_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.scoring.update_batch_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("LEADSCORE_TRANSACTION_BOUNDARY") {
            match val.as_str() {
                "sub_batch" => {
                    config.scoring.transaction_boundary = Some(TransactionBoundary::SubBatch)
                }
                "whole_job" => {
                    config.scoring.transaction_boundary = Some(TransactionBoundary::WholeJob)
                }
                _ => {}
            }
        }
        if let Ok(val) = std::env::var("LEADSCORE_DATABASE_PATH") {
            config.storage.database_path = Some(val);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut LeadScoreConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.pls_fields {
            config.scoring.pls_fields = Some(v.clone());
        }
        if let Some(ref v) = cli.pls_start_date {
            config.scoring.pls_start_date = Some(v.clone());
        }
        if let Some(v) = cli.compute_batch_size {
            config.scoring.compute_batch_size = Some(v);
        }
        if let Some(v) = cli.update_batch_size {
            config.scoring.update_batch_size = Some(v);
        }
        if let Some(v) = cli.transaction_boundary {
            config.scoring.transaction_boundary = Some(v);
        }
        if let Some(ref v) = cli.database_path {
            config.storage.database_path = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}
