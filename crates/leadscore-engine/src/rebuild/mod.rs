//! BatchRebuilder: the scheduled maintenance job.
//!
//! Phase A truncates the frequency table and rebuilds it from every closed
//! lead created after the cutoff. Phase B rescores open leads in classifier
//! chunks and persists them in short sub-batch transactions.

mod refresh;
mod report;
mod writer;

pub use report::{RebuildReport, RefreshReport, WriteStats};
pub use writer::write_probabilities;

use std::time::Instant;

use chrono::{NaiveDate, NaiveTime};
use leadscore_core::config::TransactionBoundary;
use leadscore_core::errors::ScoringError;
use leadscore_core::tracing::metrics;
use leadscore_storage::connection::writer::within_unit_of_work;
use leadscore_storage::queries::frequencies;
use leadscore_storage::queries::leads::{select_ids, LeadFilter, LeadOutcome};
use rusqlite::Connection;

use crate::classifier::NaiveBayesClassifier;
use crate::features::{ExtractionMode, FeatureExtractor, LeadSelection};
use crate::frequency::{apply_delta, FrequencyDelta, LEAD_WEIGHT};
use crate::stages::StageCatalog;
use crate::state::LeadState;

/// Rights of the caller on the frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRights {
    pub can_delete_frequencies: bool,
}

impl AccessRights {
    pub fn granted() -> Self {
        Self {
            can_delete_frequencies: true,
        }
    }

    pub fn read_only() -> Self {
        Self {
            can_delete_frequencies: false,
        }
    }
}

/// Batch sizes and commit boundary of the maintenance job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildSettings {
    pub compute_batch_size: usize,
    pub update_batch_size: usize,
    pub boundary: TransactionBoundary,
}

/// Runs Phase A and Phase B against one connection.
pub struct BatchRebuilder<'a> {
    extractor: &'a FeatureExtractor,
    classifier: &'a NaiveBayesClassifier,
    settings: RebuildSettings,
}

impl<'a> BatchRebuilder<'a> {
    pub fn new(
        extractor: &'a FeatureExtractor,
        classifier: &'a NaiveBayesClassifier,
        settings: RebuildSettings,
    ) -> Self {
        Self {
            extractor,
            classifier,
            settings: RebuildSettings {
                compute_batch_size: settings.compute_batch_size.max(1),
                update_batch_size: settings.update_batch_size.max(1),
                boundary: settings.boundary,
            },
        }
    }

    /// Phase A. Requires delete rights; a missing cutoff skips the job.
    pub fn rebuild_frequency_table(
        &self,
        conn: &Connection,
        cutoff: Option<NaiveDate>,
        rights: AccessRights,
    ) -> Result<RebuildReport, ScoringError> {
        if !rights.can_delete_frequencies {
            return Err(ScoringError::PermissionDenied {
                operation: "rebuild_frequency_table".to_string(),
            });
        }
        let Some(cutoff) = cutoff else {
            tracing::warn!("no valid scoring cutoff date, frequency rebuild skipped");
            return Ok(RebuildReport {
                skipped: true,
                ..Default::default()
            });
        };

        let span = tracing::info_span!("rebuild_frequency_table", %cutoff);
        let _guard = span.enter();
        let start = Instant::now();

        let mut report = within_unit_of_work(conn, |conn| self.rebuild(conn, cutoff))?;
        report.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            { metrics::REBUILD_WON_LEADS } = report.won_leads,
            { metrics::REBUILD_LOST_LEADS } = report.lost_leads,
            { metrics::FREQUENCY_ROWS_WRITTEN } = report.entries_written,
            { metrics::JOB_DURATION_MS } = report.duration_ms,
            "frequency table rebuilt"
        );
        Ok(report)
    }

    fn rebuild(&self, conn: &Connection, cutoff: NaiveDate) -> Result<RebuildReport, ScoringError> {
        let stages = StageCatalog::load(conn)?;
        let removed = frequencies::truncate(conn)?;
        tracing::debug!(rows = removed, "frequency table truncated");

        let closed = LeadFilter {
            created_since: Some(cutoff_timestamp(cutoff)),
            outcome: Some(LeadOutcome::Closed),
            ..Default::default()
        };
        let ids = select_ids(conn, &closed)?;

        let mut report = RebuildReport::default();
        let mut delta = FrequencyDelta::new();
        for chunk in ids.chunks(self.settings.compute_batch_size) {
            let (Some(&low), Some(&high)) = (chunk.first(), chunk.last()) else {
                continue;
            };
            let selection = LeadSelection::Filter(LeadFilter {
                id_range: Some((low, high)),
                ..closed.clone()
            });
            for lead in self.extractor.extract(conn, &selection, ExtractionMode::Bulk)? {
                match lead.state {
                    LeadState::Won => report.won_leads += 1,
                    LeadState::Lost => report.lost_leads += 1,
                    LeadState::Open => continue,
                }
                delta.record(&lead, lead.state, LEAD_WEIGHT, &stages);
            }
        }

        let merged = apply_delta(conn, &delta)?;
        report.entries_written = merged.created + merged.updated;
        Ok(report)
    }
}

/// Unix timestamp of midnight UTC on `cutoff`.
pub fn cutoff_timestamp(cutoff: NaiveDate) -> i64 {
    cutoff.and_time(NaiveTime::MIN).and_utc().timestamp()
}
