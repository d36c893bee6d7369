//! Pipeline stage catalog: ordering, won stages and the base-rate stage.

use leadscore_core::errors::StorageError;
use leadscore_core::types::{FxHashMap, StageId};
use leadscore_storage::queries::stages::{list_stages, StageRow};
use rusqlite::Connection;

/// Stages ordered by (sequence, id), loaded once per engine call.
#[derive(Debug, Clone, Default)]
pub struct StageCatalog {
    stages: Vec<StageRow>,
    index: FxHashMap<StageId, usize>,
    first: Option<StageId>,
}

impl StageCatalog {
    pub fn load(conn: &Connection) -> Result<Self, StorageError> {
        Ok(Self::from_rows(list_stages(conn)?))
    }

    pub fn from_rows(mut stages: Vec<StageRow>) -> Self {
        stages.sort_by_key(|s| (s.sequence, s.id));
        let index = stages.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        // Every closed lead passed through the first shared stage, so its
        // won/lost counts are the team base rate.
        let first = stages
            .iter()
            .find(|s| s.team_id.is_none())
            .or_else(|| stages.first())
            .map(|s| s.id);
        Self {
            stages,
            index,
            first,
        }
    }

    /// Stage whose frequency row carries the team-level won/lost totals.
    pub fn first_stage(&self) -> Option<StageId> {
        self.first
    }

    pub fn is_won(&self, stage: StageId) -> bool {
        self.get(stage).is_some_and(|s| s.is_won)
    }

    pub fn get(&self, stage: StageId) -> Option<&StageRow> {
        self.index.get(&stage).map(|&i| &self.stages[i])
    }

    pub fn ids(&self) -> impl Iterator<Item = StageId> + '_ {
        self.stages.iter().map(|s| s.id)
    }

    /// Stages a lead sitting in `stage` has gone through: every stage whose
    /// sequence is at most `stage`'s. An unknown stage yields itself only.
    pub fn stages_through(&self, stage: StageId) -> Vec<StageId> {
        match self.get(stage) {
            Some(current) => self
                .stages
                .iter()
                .filter(|s| s.sequence <= current.sequence)
                .map(|s| s.id)
                .collect(),
            None => vec![stage],
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
