//! In-memory view of the frequency rows a classifier run needs.

use leadscore_core::errors::StorageError;
use leadscore_core::types::{FxHashMap, FxHashSet, StageId, TeamId};
use leadscore_storage::queries::frequencies::{load_by_variables, FrequencyRow};
use rusqlite::Connection;

use crate::fields::LeadField;
use crate::frequency::{Counts, STAGE_VARIABLE};

/// Frequency bucket: the rows of one team (or of leads without a team), or
/// the global aggregate of every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Team(Option<TeamId>),
    Global,
}

/// Counts of one bucket.
#[derive(Debug, Clone, Default)]
pub struct BucketFrequencies {
    values: FxHashMap<String, FxHashMap<String, Counts>>,
    field_totals: FxHashMap<String, Counts>,
    base: Counts,
}

impl BucketFrequencies {
    fn add(&mut self, row: &FrequencyRow, first_stage: Option<&str>) {
        let counts = Counts {
            won: row.won_count,
            lost: row.lost_count,
        };
        let entry = self
            .values
            .entry(row.variable.clone())
            .or_default()
            .entry(row.value.clone())
            .or_default();
        entry.won += counts.won;
        entry.lost += counts.lost;

        let totals = self.field_totals.entry(row.variable.clone()).or_default();
        totals.won += counts.won;
        totals.lost += counts.lost;

        if row.variable == STAGE_VARIABLE && first_stage == Some(row.value.as_str()) {
            self.base.won += counts.won;
            self.base.lost += counts.lost;
        }
    }

    pub fn value(&self, variable: &str, value: &str) -> Option<Counts> {
        self.values.get(variable)?.get(value).copied()
    }

    pub fn field_total(&self, variable: &str) -> Option<Counts> {
        self.field_totals.get(variable).copied()
    }

    /// Won/lost totals of the team, read from the first stage.
    pub fn base(&self) -> Counts {
        self.base
    }

    /// A bucket with no won or no lost history cannot be scored.
    pub fn is_scorable(&self) -> bool {
        self.base.won > 0.0 && self.base.lost > 0.0
    }
}

/// Frequency rows grouped by bucket, with low-sample tags removed.
#[derive(Debug, Clone, Default)]
pub struct FrequencySnapshot {
    buckets: FxHashMap<Bucket, BucketFrequencies>,
    excluded_tags: FxHashSet<String>,
}

impl FrequencySnapshot {
    pub fn load(
        conn: &Connection,
        variables: &[String],
        first_stage: Option<StageId>,
        tag_min_samples: f64,
    ) -> Result<Self, StorageError> {
        let rows = load_by_variables(conn, variables)?;
        Ok(Self::build(&rows, first_stage, tag_min_samples))
    }

    pub fn build(rows: &[FrequencyRow], first_stage: Option<StageId>, tag_min_samples: f64) -> Self {
        let tag_variable = LeadField::Tags.variable();

        let mut tag_samples: FxHashMap<&str, f64> = FxHashMap::default();
        for row in rows.iter().filter(|r| r.variable == tag_variable) {
            *tag_samples.entry(row.value.as_str()).or_default() += row.won_count + row.lost_count;
        }
        let excluded_tags: FxHashSet<String> = tag_samples
            .into_iter()
            .filter(|(_, samples)| *samples < tag_min_samples)
            .map(|(tag, _)| tag.to_string())
            .collect();

        let first_stage = first_stage.map(|s| s.raw().to_string());
        let mut buckets: FxHashMap<Bucket, BucketFrequencies> = FxHashMap::default();
        for row in rows {
            if row.variable == tag_variable && excluded_tags.contains(&row.value) {
                continue;
            }
            buckets
                .entry(Bucket::Team(row.team_id))
                .or_default()
                .add(row, first_stage.as_deref());
            buckets
                .entry(Bucket::Global)
                .or_default()
                .add(row, first_stage.as_deref());
        }

        Self {
            buckets,
            excluded_tags,
        }
    }

    /// Bucket used for a lead of `team`: its own when the team has rows,
    /// the global aggregate otherwise.
    pub fn resolve(&self, team: Option<TeamId>) -> Option<(Bucket, &BucketFrequencies)> {
        let own = Bucket::Team(team);
        match self.buckets.get(&own) {
            Some(bucket) => Some((own, bucket)),
            None => self.buckets.get(&Bucket::Global).map(|b| (Bucket::Global, b)),
        }
    }

    pub fn bucket(&self, bucket: Bucket) -> Option<&BucketFrequencies> {
        self.buckets.get(&bucket)
    }

    pub fn is_tag_excluded(&self, tag: &str) -> bool {
        self.excluded_tags.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
