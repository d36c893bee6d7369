//! Scoring configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CUTOFF_DATE_FORMAT, DEFAULT_COMPUTE_BATCH_SIZE, DEFAULT_PLS_FIELDS, DEFAULT_TAG_MIN_SAMPLES,
    DEFAULT_UPDATE_BATCH_SIZE,
};

/// Where the probability refresh commits its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionBoundary {
    /// Every update sub-batch commits in its own transaction.
    #[default]
    SubBatch,
    /// One transaction for the whole job; sub-batches are savepoints.
    WholeJob,
}

/// Configuration for the scoring subsystem.
///
/// `pls_fields` and `pls_start_date` are owned by the surrounding system.
/// They are stored verbatim and only interpreted when the engine is built,
/// where bad values degrade instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoringConfig {
    /// Comma-delimited lead field whitelist. Default: "phone_state,email_state".
    pub pls_fields: Option<String>,
    /// Earliest creation date (YYYY-MM-DD) of leads taking part in scoring.
    pub pls_start_date: Option<String>,
    /// Leads per classifier invocation during refresh. Default: 50000.
    pub compute_batch_size: Option<usize>,
    /// Leads per bulk UPDATE during refresh. Default: 5000.
    pub update_batch_size: Option<usize>,
    /// Minimum won+lost observations for a tag to be used. Default: 50.
    pub tag_min_samples: Option<f64>,
    /// Commit boundary for the refresh job. Default: sub_batch.
    pub transaction_boundary: Option<TransactionBoundary>,
}

impl ScoringConfig {
    /// Returns the effective whitelist string.
    pub fn effective_pls_fields(&self) -> &str {
        self.pls_fields.as_deref().unwrap_or(DEFAULT_PLS_FIELDS)
    }

    /// Returns the parsed cutoff date, or `None` when unset or unparsable.
    pub fn effective_cutoff(&self) -> Option<NaiveDate> {
        self.pls_start_date.as_deref().and_then(parse_cutoff_date)
    }

    /// Returns the effective compute batch size, defaulting to 50000.
    pub fn effective_compute_batch_size(&self) -> usize {
        self.compute_batch_size.unwrap_or(DEFAULT_COMPUTE_BATCH_SIZE)
    }

    /// Returns the effective update batch size, defaulting to 5000.
    pub fn effective_update_batch_size(&self) -> usize {
        self.update_batch_size.unwrap_or(DEFAULT_UPDATE_BATCH_SIZE)
    }

    /// Returns the effective tag sample threshold, defaulting to 50.
    pub fn effective_tag_min_samples(&self) -> f64 {
        self.tag_min_samples.unwrap_or(DEFAULT_TAG_MIN_SAMPLES)
    }

    /// Returns the effective transaction boundary, defaulting to sub-batch.
    pub fn effective_transaction_boundary(&self) -> TransactionBoundary {
        self.transaction_boundary.unwrap_or_default()
    }
}

/// Parse a cutoff date. Accepts `YYYY-MM-DD`, optionally followed by a time part.
pub fn parse_cutoff_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.split([' ', 'T']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, CUTOFF_DATE_FORMAT).ok()
}
