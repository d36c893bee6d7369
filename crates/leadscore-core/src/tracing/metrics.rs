//! Structured span field names shared by the scoring subsystems.
//!
//! Using the same field names in every span keeps log queries uniform.

/// Frequency rebuild: number of won leads scanned.
pub const REBUILD_WON_LEADS: &str = "rebuild_won_leads";

/// Frequency rebuild: number of lost leads scanned.
pub const REBUILD_LOST_LEADS: &str = "rebuild_lost_leads";

/// Frequency rebuild / increment: frequency rows written.
pub const FREQUENCY_ROWS_WRITTEN: &str = "frequency_rows_written";

/// Refresh: open leads selected for recomputation.
pub const REFRESH_LEADS_SELECTED: &str = "refresh_leads_selected";

/// Refresh: update transactions attempted.
pub const REFRESH_TRANSACTIONS: &str = "refresh_transactions";

/// Refresh: update transactions that failed and were skipped.
pub const REFRESH_FAILED_TRANSACTIONS: &str = "refresh_failed_transactions";

/// Classifier: leads scored per invocation.
pub const CLASSIFIER_BATCH_SIZE: &str = "classifier_batch_size";

/// Any job: wall-clock duration in milliseconds.
pub const JOB_DURATION_MS: &str = "job_duration_ms";
