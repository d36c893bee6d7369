//! NaiveBayesClassifier: won probability of leads from the frequency table.
//!
//! Per bucket the base rate comes from the first stage's counts. Each
//! feature then multiplies the won and lost scores by its share of the
//! field totals; the stage uses the bucket base totals instead.

mod snapshot;

pub use snapshot::{Bucket, BucketFrequencies, FrequencySnapshot};

use std::collections::BTreeMap;

use leadscore_core::constants::{
    LOST_PROBABILITY, MAX_SCORED_PROBABILITY, MIN_SCORED_PROBABILITY, WON_PROBABILITY,
};
use leadscore_core::errors::StorageError;
use leadscore_core::types::{FxHashMap, LeadId};
use rusqlite::Connection;

use crate::features::LeadFeatures;
use crate::fields::LeadField;
use crate::frequency::{Counts, STAGE_VARIABLE};
use crate::stages::StageCatalog;

/// Probability per lead. Leads that could not be scored are absent.
pub type ProbabilityMap = BTreeMap<LeadId, f64>;

/// Naive-Bayes scorer over the frequency table.
#[derive(Debug, Clone, Copy)]
pub struct NaiveBayesClassifier {
    tag_min_samples: f64,
}

impl NaiveBayesClassifier {
    pub fn new(tag_min_samples: f64) -> Self {
        Self { tag_min_samples }
    }

    /// Load the frequency rows `leads` need and score them.
    pub fn classify(
        &self,
        conn: &Connection,
        leads: &[LeadFeatures],
        stages: &StageCatalog,
    ) -> Result<ProbabilityMap, StorageError> {
        if leads.is_empty() {
            return Ok(ProbabilityMap::new());
        }
        let snapshot = FrequencySnapshot::load(
            conn,
            &variables_of(leads),
            stages.first_stage(),
            self.tag_min_samples,
        )?;
        Ok(self.score(&snapshot, leads, stages))
    }

    /// Score `leads` against an already loaded snapshot.
    pub fn score(
        &self,
        snapshot: &FrequencySnapshot,
        leads: &[LeadFeatures],
        stages: &StageCatalog,
    ) -> ProbabilityMap {
        let span = tracing::debug_span!(
            "classify",
            classifier_batch_size = leads.len(),
        );
        let _guard = span.enter();

        let mut result = ProbabilityMap::new();
        let mut skipped: FxHashMap<Bucket, usize> = FxHashMap::default();

        for lead in leads {
            let Some(stage) = lead.stage_id else {
                result.insert(lead.lead_id, LOST_PROBABILITY);
                continue;
            };
            if stages.is_won(stage) {
                result.insert(lead.lead_id, WON_PROBABILITY);
                continue;
            }
            let Some((bucket_key, bucket)) = snapshot.resolve(lead.team_id) else {
                *skipped.entry(Bucket::Global).or_default() += 1;
                continue;
            };
            if !bucket.is_scorable() {
                *skipped.entry(bucket_key).or_default() += 1;
                continue;
            }
            if let Some(p) = score_lead(snapshot, bucket, lead, &stage.raw().to_string()) {
                result.insert(lead.lead_id, p);
            }
        }

        for (bucket, count) in &skipped {
            tracing::debug!(?bucket, leads = count, "bucket has no won or lost history, leads left unscored");
        }
        result
    }
}

fn score_lead(
    snapshot: &FrequencySnapshot,
    bucket: &BucketFrequencies,
    lead: &LeadFeatures,
    stage_value: &str,
) -> Option<f64> {
    let base = bucket.base();
    let total = base.won + base.lost;
    let mut s_won = base.won / total;
    let mut s_lost = base.lost / total;

    if let Some(stage) = bucket.value(STAGE_VARIABLE, stage_value) {
        multiply(&mut s_won, &mut s_lost, stage, base);
    }

    let tag_variable = LeadField::Tags.variable();
    for feature in &lead.features {
        if feature.variable == tag_variable && snapshot.is_tag_excluded(&feature.value) {
            continue;
        }
        let (Some(counts), Some(totals)) = (
            bucket.value(feature.variable, &feature.value),
            bucket.field_total(feature.variable),
        ) else {
            continue;
        };
        multiply(&mut s_won, &mut s_lost, counts, totals);
    }

    let denominator = s_won + s_lost;
    if denominator <= 0.0 || !denominator.is_finite() {
        return None;
    }
    Some(bound(100.0 * s_won / denominator))
}

fn multiply(s_won: &mut f64, s_lost: &mut f64, counts: Counts, totals: Counts) {
    if totals.won <= 0.0 || totals.lost <= 0.0 {
        return;
    }
    *s_won *= counts.won / totals.won;
    *s_lost *= counts.lost / totals.lost;
}

/// Round to two decimals and keep clear of 0 and 100.
fn bound(probability: f64) -> f64 {
    let rounded = (probability * 100.0).round() / 100.0;
    rounded.clamp(MIN_SCORED_PROBABILITY, MAX_SCORED_PROBABILITY)
}

/// Frequency variables needed to score `leads`.
fn variables_of(leads: &[LeadFeatures]) -> Vec<String> {
    let mut vars: Vec<String> = vec![STAGE_VARIABLE.to_string()];
    for lead in leads {
        for feature in &lead.features {
            if !vars.iter().any(|v| v == feature.variable) {
                vars.push(feature.variable.to_string());
            }
        }
    }
    vars
}
