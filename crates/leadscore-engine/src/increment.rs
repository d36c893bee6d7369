//! LiveIncrementer: moves frequency counts when leads change outcome state.
//!
//! Must run before the caller persists the change: the decrement side reads
//! the lead's current features.

use serde::Serialize;

use leadscore_core::errors::ScoringError;
use leadscore_core::types::LeadId;
use leadscore_storage::connection::writer::within_unit_of_work;
use rusqlite::Connection;

use crate::features::{ExtractionMode, FeatureExtractor, LeadSelection};
use crate::frequency::{apply_delta, FrequencyDelta, LEAD_WEIGHT};
use crate::stages::StageCatalog;
use crate::state::Transition;

/// Result of one incremental update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IncrementReport {
    pub leads: usize,
    pub entries_updated: usize,
    pub entries_created: usize,
}

impl IncrementReport {
    pub fn absorb(&mut self, other: IncrementReport) {
        self.leads += other.leads;
        self.entries_updated += other.entries_updated;
        self.entries_created += other.entries_created;
    }
}

/// Applies state transitions to the frequency table.
pub struct LiveIncrementer<'a> {
    extractor: &'a FeatureExtractor,
    stages: &'a StageCatalog,
}

impl<'a> LiveIncrementer<'a> {
    pub fn new(extractor: &'a FeatureExtractor, stages: &'a StageCatalog) -> Self {
        Self { extractor, stages }
    }

    /// Remove `leads` from the counts of `transition.from` and add them to
    /// `transition.to`. Joins the caller's transaction when one is open.
    pub fn apply(
        &self,
        conn: &Connection,
        leads: &[LeadId],
        transition: Transition,
    ) -> Result<IncrementReport, ScoringError> {
        if leads.is_empty() {
            return Ok(IncrementReport::default());
        }

        within_unit_of_work(conn, |conn| {
            let features = self.extractor.extract(
                conn,
                &LeadSelection::Ids(leads.to_vec()),
                ExtractionMode::for_count(leads.len()),
            )?;

            let mut delta = FrequencyDelta::new();
            for lead in &features {
                delta.record(lead, transition.from, -LEAD_WEIGHT, self.stages);
                delta.record(lead, transition.to, LEAD_WEIGHT, self.stages);
            }
            let merged = apply_delta(conn, &delta)?;

            tracing::info!(
                leads = features.len(),
                from = ?transition.from,
                to = ?transition.to,
                frequency_rows_written = merged.updated + merged.created,
                "frequency table incremented"
            );
            Ok(IncrementReport {
                leads: features.len(),
                entries_updated: merged.updated,
                entries_created: merged.created,
            })
        })
    }
}
