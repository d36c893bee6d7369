//! ScoringEngine: the entry points the surrounding CRM calls.
//!
//! Every call takes the connection and, where it matters, the cutoff date
//! explicitly. The only state kept between calls is the resolved whitelist
//! and the job settings.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;

use leadscore_core::config::{ScoringConfig, TransactionBoundary};
use leadscore_core::constants::{LOST_PROBABILITY, SQL_IN_CHUNK, WON_PROBABILITY};
use leadscore_core::errors::ScoringError;
use leadscore_core::types::LeadId;
use leadscore_storage::connection::writer::within_unit_of_work;
use leadscore_storage::queries::leads::{fetch_lead_rows, LeadFilter};
use rusqlite::Connection;

use crate::classifier::{NaiveBayesClassifier, ProbabilityMap};
use crate::features::{ExtractionMode, FeatureExtractor, LeadSelection};
use crate::fields::FieldWhitelist;
use crate::increment::{IncrementReport, LiveIncrementer};
use crate::rebuild::{
    write_probabilities, AccessRights, BatchRebuilder, RebuildReport, RebuildSettings,
    RefreshReport, WriteStats,
};
use crate::stages::StageCatalog;
use crate::state::{plan_transition, LeadState, LeadStatus, PendingChange, Transition};

/// Phase A followed by Phase B.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduledUpdateReport {
    pub rebuild: RebuildReport,
    pub refresh: RefreshReport,
    pub duration_ms: u64,
}

/// Predictive lead scoring engine.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    extractor: FeatureExtractor,
    classifier: NaiveBayesClassifier,
    cutoff: Option<NaiveDate>,
    settings: RebuildSettings,
}

impl ScoringEngine {
    /// Build an engine from resolved configuration. The whitelist and the
    /// cutoff are interpreted here, once; bad values degrade silently.
    pub fn new(config: &ScoringConfig) -> Self {
        let whitelist = FieldWhitelist::parse(config.effective_pls_fields());
        let cutoff = config.effective_cutoff();
        if cutoff.is_none() {
            tracing::debug!(
                raw = ?config.pls_start_date,
                "no usable scoring cutoff, maintenance jobs will no-op"
            );
        }
        Self {
            extractor: FeatureExtractor::new(whitelist),
            classifier: NaiveBayesClassifier::new(config.effective_tag_min_samples()),
            cutoff,
            settings: RebuildSettings {
                compute_batch_size: config.effective_compute_batch_size().max(1),
                update_batch_size: config.effective_update_batch_size().max(1),
                boundary: config.effective_transaction_boundary(),
            },
        }
    }

    pub fn with_transaction_boundary(mut self, boundary: TransactionBoundary) -> Self {
        self.settings.boundary = boundary;
        self
    }

    pub fn whitelist(&self) -> &FieldWhitelist {
        self.extractor.whitelist()
    }

    /// Configured cutoff date, if it parsed.
    pub fn cutoff(&self) -> Option<NaiveDate> {
        self.cutoff
    }

    pub fn settings(&self) -> RebuildSettings {
        self.settings
    }

    /// Score the selected leads. `batch_mode` picks bulk extraction;
    /// otherwise leads are read one at a time. Unscorable leads are absent.
    pub fn recompute_probabilities(
        &self,
        conn: &Connection,
        selection: &LeadSelection,
        batch_mode: bool,
    ) -> Result<ProbabilityMap, ScoringError> {
        let stages = StageCatalog::load(conn)?;
        let leads = self
            .extractor
            .extract(conn, selection, ExtractionMode::from_batch_flag(batch_mode))?;
        Ok(self.classifier.classify(conn, &leads, &stages)?)
    }

    /// Persist probabilities with the sub-batch update used by the refresh job.
    pub fn apply_probabilities(
        &self,
        conn: &Connection,
        probabilities: &ProbabilityMap,
    ) -> Result<WriteStats, ScoringError> {
        if let Some((lead, p)) = probabilities
            .iter()
            .find(|(_, p)| !(LOST_PROBABILITY..=WON_PROBABILITY).contains(*p))
        {
            return Err(ScoringError::InvalidInput {
                message: format!("probability {p} of lead {lead} is outside [0, 100]"),
            });
        }
        Ok(write_probabilities(
            conn,
            probabilities,
            self.settings.update_batch_size,
        ))
    }

    /// Move `leads` from `from` to `to` in the frequency table. Call before
    /// the new state is persisted. Same-state calls do nothing.
    pub fn on_state_transition(
        &self,
        conn: &Connection,
        leads: &[LeadId],
        from: LeadState,
        to: LeadState,
    ) -> Result<IncrementReport, ScoringError> {
        let Some(transition) = Transition::new(from, to) else {
            return Ok(IncrementReport::default());
        };
        let stages = StageCatalog::load(conn)?;
        LiveIncrementer::new(&self.extractor, &stages).apply(conn, leads, transition)
    }

    /// Plan the state transition of each pending change and apply them,
    /// grouped by (from, to). Call before the changes are persisted.
    pub fn on_lead_change(
        &self,
        conn: &Connection,
        changes: &[(LeadId, PendingChange)],
    ) -> Result<IncrementReport, ScoringError> {
        if changes.is_empty() {
            return Ok(IncrementReport::default());
        }
        within_unit_of_work(conn, |conn| {
            let stages = StageCatalog::load(conn)?;
            let mut current: BTreeMap<LeadId, LeadStatus> = BTreeMap::new();
            let ids: Vec<LeadId> = changes.iter().map(|(id, _)| *id).collect();
            for chunk in ids.chunks(SQL_IN_CHUNK) {
                for row in fetch_lead_rows(conn, &LeadFilter::by_ids(chunk.to_vec()), &[])? {
                    current.insert(
                        row.id,
                        LeadStatus {
                            stage_id: row.stage_id,
                            probability: row.probability,
                            active: row.active,
                        },
                    );
                }
            }

            let mut groups: BTreeMap<Transition, Vec<LeadId>> = BTreeMap::new();
            for (id, change) in changes {
                let Some(status) = current.get(id) else {
                    tracing::debug!(lead = %id, "pending change on unknown lead ignored");
                    continue;
                };
                if let Some(transition) = plan_transition(status, change, &stages) {
                    groups.entry(transition).or_default().push(*id);
                }
            }

            let incrementer = LiveIncrementer::new(&self.extractor, &stages);
            let mut report = IncrementReport::default();
            for (transition, leads) in groups {
                report.absorb(incrementer.apply(conn, &leads, transition)?);
            }
            Ok(report)
        })
    }

    /// Phase A: truncate and rebuild the frequency table from closed leads
    /// created on or after `cutoff`.
    pub fn rebuild_frequency_table(
        &self,
        conn: &Connection,
        cutoff: Option<NaiveDate>,
        rights: AccessRights,
    ) -> Result<RebuildReport, ScoringError> {
        self.rebuilder().rebuild_frequency_table(conn, cutoff, rights)
    }

    /// Phase B: rescore open leads created on or after `cutoff`.
    pub fn refresh_all_open_probabilities(
        &self,
        conn: &Connection,
        cutoff: Option<NaiveDate>,
    ) -> Result<RefreshReport, ScoringError> {
        self.rebuilder().refresh_all_open_probabilities(conn, cutoff)
    }

    /// The scheduled job: Phase A then Phase B with the configured cutoff.
    pub fn run_scheduled_update(
        &self,
        conn: &Connection,
        rights: AccessRights,
    ) -> Result<ScheduledUpdateReport, ScoringError> {
        let start = Instant::now();
        let rebuild = self.rebuild_frequency_table(conn, self.cutoff, rights)?;
        let refresh = self.refresh_all_open_probabilities(conn, self.cutoff)?;
        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            duration_ms,
            skipped = rebuild.skipped,
            "scheduled scoring update finished"
        );
        Ok(ScheduledUpdateReport {
            rebuild,
            refresh,
            duration_ms,
        })
    }

    fn rebuilder(&self) -> BatchRebuilder<'_> {
        BatchRebuilder::new(&self.extractor, &self.classifier, self.settings)
    }
}
