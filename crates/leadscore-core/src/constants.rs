//! Shared constants for the lead scoring engine.

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default feature whitelist (comma-delimited lead field names).
pub const DEFAULT_PLS_FIELDS: &str = "phone_state,email_state";

/// Number of leads handed to one classifier invocation during a refresh.
pub const DEFAULT_COMPUTE_BATCH_SIZE: usize = 50_000;

/// Number of leads persisted by one bulk UPDATE (one transaction) during a refresh.
pub const DEFAULT_UPDATE_BATCH_SIZE: usize = 5_000;

/// Tags observed fewer times than this (won + lost, all teams) are ignored by the classifier.
pub const DEFAULT_TAG_MIN_SAMPLES: f64 = 50.0;

/// Smoothing constant added to the counts of a newly created frequency row.
pub const LAPLACE_SMOOTHING: f64 = 0.1;

/// Lower bound for every won/lost count in the frequency table.
pub const FREQUENCY_FLOOR: f64 = 0.1;

/// Lowest probability the classifier emits for a scorable lead.
pub const MIN_SCORED_PROBABILITY: f64 = 0.01;

/// Highest probability the classifier emits for a scorable lead.
pub const MAX_SCORED_PROBABILITY: f64 = 99.99;

/// Probability of a won lead.
pub const WON_PROBABILITY: f64 = 100.0;

/// Probability of a lost lead (or of a lead that cannot be staged).
pub const LOST_PROBABILITY: f64 = 0.0;

/// Maximum ids bound in one `IN (...)` clause.
pub const SQL_IN_CHUNK: usize = 900;

/// Date format accepted for the scoring cutoff.
pub const CUTOFF_DATE_FORMAT: &str = "%Y-%m-%d";

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = "leadscore.toml";

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "LEADSCORE_LOG";

/// Lead counts up to this use per-record feature extraction; larger sets use the bulk queries.
pub const PER_RECORD_EXTRACTION_LIMIT: usize = 50;
