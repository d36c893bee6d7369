//! Phase B: rescore every open lead created after the cutoff.

use std::time::Instant;

use chrono::NaiveDate;
use leadscore_core::config::TransactionBoundary;
use leadscore_core::errors::ScoringError;
use leadscore_core::tracing::metrics;
use leadscore_storage::connection::writer::within_unit_of_work;
use leadscore_storage::queries::leads::{select_ids, LeadFilter, LeadOutcome};
use rusqlite::Connection;

use super::{cutoff_timestamp, write_probabilities, BatchRebuilder, RefreshReport};
use crate::features::{ExtractionMode, LeadSelection};
use crate::stages::StageCatalog;

impl BatchRebuilder<'_> {
    /// Phase B. A missing cutoff skips the job.
    ///
    /// Leads are scored `compute_batch_size` at a time and each chunk is
    /// persisted before the next is read, `update_batch_size` rows per
    /// transaction (or savepoint, under a whole-job boundary).
    pub fn refresh_all_open_probabilities(
        &self,
        conn: &Connection,
        cutoff: Option<NaiveDate>,
    ) -> Result<RefreshReport, ScoringError> {
        let Some(cutoff) = cutoff else {
            tracing::warn!("no valid scoring cutoff date, probability refresh skipped");
            return Ok(RefreshReport::skipped());
        };

        let span = tracing::info_span!(
            "refresh_open_probabilities",
            %cutoff,
            boundary = ?self.settings.boundary,
        );
        let _guard = span.enter();
        let start = Instant::now();

        let mut report = match self.settings.boundary {
            TransactionBoundary::SubBatch => self.refresh(conn, cutoff)?,
            TransactionBoundary::WholeJob => {
                within_unit_of_work(conn, |conn| self.refresh(conn, cutoff))?
            }
        };
        report.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            { metrics::REFRESH_LEADS_SELECTED } = report.leads_selected,
            leads_scored = report.leads_scored,
            { metrics::REFRESH_TRANSACTIONS } = report.transactions_attempted,
            { metrics::REFRESH_FAILED_TRANSACTIONS } = report.transactions_failed,
            { metrics::JOB_DURATION_MS } = report.duration_ms,
            "open lead probabilities refreshed"
        );
        Ok(report)
    }

    fn refresh(&self, conn: &Connection, cutoff: NaiveDate) -> Result<RefreshReport, ScoringError> {
        let stages = StageCatalog::load(conn)?;
        let open = LeadFilter {
            created_since: Some(cutoff_timestamp(cutoff)),
            outcome: Some(LeadOutcome::Open),
            ..Default::default()
        };
        let ids = select_ids(conn, &open)?;

        let mut report = RefreshReport {
            leads_selected: ids.len(),
            ..Default::default()
        };

        for (index, chunk) in ids.chunks(self.settings.compute_batch_size).enumerate() {
            let (Some(&low), Some(&high)) = (chunk.first(), chunk.last()) else {
                continue;
            };
            // An id range keeps the chunk query free of bound id lists.
            let selection = LeadSelection::Filter(LeadFilter {
                id_range: Some((low, high)),
                ..open.clone()
            });
            let leads = self.extractor.extract(conn, &selection, ExtractionMode::Bulk)?;
            let probabilities = self.classifier.classify(conn, &leads, &stages)?;
            report.classifier_chunks.push(leads.len());
            report.leads_scored += probabilities.len();

            let stats = write_probabilities(conn, &probabilities, self.settings.update_batch_size);
            report.add_writes(stats);

            tracing::debug!(
                chunk = index,
                { metrics::CLASSIFIER_BATCH_SIZE } = leads.len(),
                scored = probabilities.len(),
                failed = stats.transactions_failed,
                "refresh chunk persisted"
            );
        }
        Ok(report)
    }
}
