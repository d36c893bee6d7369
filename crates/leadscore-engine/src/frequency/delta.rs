//! Accumulated won/lost count changes keyed by (team, variable, value).

use std::collections::BTreeMap;

use leadscore_core::types::{StageId, TeamId};

use super::STAGE_VARIABLE;
use crate::features::LeadFeatures;
use crate::stages::StageCatalog;
use crate::state::LeadState;

/// Key of a frequency row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrequencyKey {
    pub team_id: Option<TeamId>,
    pub variable: String,
    pub value: String,
}

impl FrequencyKey {
    pub fn new(team_id: Option<TeamId>, variable: &str, value: impl Into<String>) -> Self {
        Self {
            team_id,
            variable: variable.to_string(),
            value: value.into(),
        }
    }

    pub fn stage(team_id: Option<TeamId>, stage: StageId) -> Self {
        Self::new(team_id, STAGE_VARIABLE, stage.raw().to_string())
    }
}

/// Won/lost count pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Counts {
    pub won: f64,
    pub lost: f64,
}

/// Signed count changes, ordered by key so writes are deterministic.
#[derive(Debug, Clone, Default)]
pub struct FrequencyDelta {
    entries: BTreeMap<FrequencyKey, Counts>,
}

impl FrequencyDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` (negative to remove) to the won or lost count of every
    /// feature of `lead`, as observed in `state`. Open contributes nothing.
    ///
    /// The stage feature is expanded: a won lead counts for every stage, a
    /// lost lead for every stage up to its own.
    pub fn record(
        &mut self,
        lead: &LeadFeatures,
        state: LeadState,
        weight: f64,
        stages: &StageCatalog,
    ) {
        let (won, lost) = match state {
            LeadState::Won => (weight, 0.0),
            LeadState::Lost => (0.0, weight),
            LeadState::Open => return,
        };

        if let Some(stage) = lead.stage_id {
            let passed: Vec<StageId> = match state {
                LeadState::Won if !stages.is_empty() => stages.ids().collect(),
                _ => stages.stages_through(stage),
            };
            for stage in passed {
                self.add(FrequencyKey::stage(lead.team_id, stage), won, lost);
            }
        }
        for feature in &lead.features {
            self.add(
                FrequencyKey::new(lead.team_id, feature.variable, feature.value.as_str()),
                won,
                lost,
            );
        }
    }

    pub fn add(&mut self, key: FrequencyKey, won: f64, lost: f64) {
        let counts = self.entries.entry(key).or_default();
        counts.won += won;
        counts.lost += lost;
    }

    pub fn get(&self, key: &FrequencyKey) -> Option<Counts> {
        self.entries.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FrequencyKey, &Counts)> {
        self.entries.iter()
    }

    /// Distinct variables touched, sorted.
    pub fn variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = self.entries.keys().map(|k| k.variable.clone()).collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// Distinct teams touched, `None` first.
    pub fn teams(&self) -> Vec<Option<TeamId>> {
        let mut teams: Vec<Option<TeamId>> = self.entries.keys().map(|k| k.team_id).collect();
        teams.sort_unstable();
        teams.dedup();
        teams
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
