//! Lead outcome states and the transitions that move frequency counts.
//!
//! Counts move only when the state changes. Re-writing the same state is a
//! no-op, so won -> lost -> won sequences never double count.

use serde::{Deserialize, Serialize};

use leadscore_core::constants::{LOST_PROBABILITY, WON_PROBABILITY};
use leadscore_core::types::StageId;

use crate::stages::StageCatalog;

/// Outcome state of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadState {
    Open,
    Won,
    Lost,
}

impl LeadState {
    /// Won at probability 100, lost at probability 0 when archived.
    pub fn of(probability: Option<f64>, active: bool) -> Self {
        match probability {
            Some(p) if p == WON_PROBABILITY => Self::Won,
            Some(p) if p == LOST_PROBABILITY && !active => Self::Lost,
            _ => Self::Open,
        }
    }

    pub fn is_closed(self) -> bool {
        !matches!(self, Self::Open)
    }
}

/// A change of outcome state. `from != to` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub from: LeadState,
    pub to: LeadState,
}

impl Transition {
    /// `None` when the state does not change.
    pub fn new(from: LeadState, to: LeadState) -> Option<Self> {
        (from != to).then_some(Self { from, to })
    }
}

/// Persisted fields of a lead that decide its state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadStatus {
    pub stage_id: Option<StageId>,
    pub probability: Option<f64>,
    pub active: bool,
}

impl LeadStatus {
    pub fn state(&self) -> LeadState {
        LeadState::of(self.probability, self.active)
    }
}

/// A write the caller is about to persist on a lead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingChange {
    /// New stage, if the stage changes.
    pub stage_id: Option<StageId>,
    /// New archive flag, if it changes.
    pub active: Option<bool>,
}

impl PendingChange {
    pub fn stage(stage_id: StageId) -> Self {
        Self {
            stage_id: Some(stage_id),
            active: None,
        }
    }

    pub fn archive() -> Self {
        Self {
            stage_id: None,
            active: Some(false),
        }
    }

    pub fn restore() -> Self {
        Self {
            stage_id: None,
            active: Some(true),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stage_id.is_none() && self.active.is_none()
    }
}

/// Work out the state transition `change` causes on a lead currently in `current`.
pub fn plan_transition(
    current: &LeadStatus,
    change: &PendingChange,
    stages: &StageCatalog,
) -> Option<Transition> {
    if change.is_empty() {
        return None;
    }
    let from = current.state();
    let active = change.active.unwrap_or(current.active);
    let stage = change.stage_id.or(current.stage_id);

    let to = if !active {
        LeadState::Lost
    } else if stage.is_some_and(|s| stages.is_won(s)) {
        LeadState::Won
    } else {
        match from {
            LeadState::Won if change.stage_id.is_some() => LeadState::Open,
            LeadState::Lost => LeadState::Open,
            other => other,
        }
    };
    Transition::new(from, to)
}
