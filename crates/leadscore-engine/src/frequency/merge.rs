//! Update primitive: merge a delta into the stored frequency table.

use std::collections::BTreeMap;

use leadscore_core::constants::{FREQUENCY_FLOOR, LAPLACE_SMOOTHING, SQL_IN_CHUNK};
use leadscore_core::errors::StorageError;
use leadscore_storage::queries::frequencies::{
    insert_rows, load_for_update, update_counts, NewFrequencyRow,
};
use rusqlite::Connection;

use super::{Counts, FrequencyDelta, FrequencyKey};

/// Rows touched by one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub updated: usize,
    pub created: usize,
}

/// Apply `delta` to the frequency table.
///
/// Existing rows are adjusted additively; new rows start at the observed
/// count plus the smoothing constant. Both counts are clamped to the floor
/// afterwards, so a decrement below zero never fails.
pub fn apply_delta(conn: &Connection, delta: &FrequencyDelta) -> Result<MergeOutcome, StorageError> {
    if delta.is_empty() {
        return Ok(MergeOutcome::default());
    }

    let variables = delta.variables();
    let teams = delta.teams();
    let team_chunk = SQL_IN_CHUNK.saturating_sub(variables.len()).max(1);

    let mut existing: BTreeMap<FrequencyKey, (i64, Counts)> = BTreeMap::new();
    for chunk in teams.chunks(team_chunk) {
        for row in load_for_update(conn, &variables, chunk)? {
            let key = FrequencyKey {
                team_id: row.team_id,
                variable: row.variable,
                value: row.value,
            };
            existing.entry(key).or_insert((
                row.id,
                Counts {
                    won: row.won_count,
                    lost: row.lost_count,
                },
            ));
        }
    }

    let mut updates: Vec<(i64, f64, f64)> = Vec::new();
    let mut inserts: Vec<NewFrequencyRow> = Vec::new();
    for (key, change) in delta.iter() {
        match existing.get(key) {
            Some((id, stored)) => {
                updates.push((
                    *id,
                    clamp(stored.won + change.won),
                    clamp(stored.lost + change.lost),
                ));
            }
            None => inserts.push(NewFrequencyRow {
                team_id: key.team_id,
                variable: key.variable.clone(),
                value: key.value.clone(),
                won_count: clamp(change.won + LAPLACE_SMOOTHING),
                lost_count: clamp(change.lost + LAPLACE_SMOOTHING),
            }),
        }
    }

    let outcome = MergeOutcome {
        updated: update_counts(conn, &updates)?,
        created: insert_rows(conn, &inserts)?,
    };
    tracing::debug!(
        updated = outcome.updated,
        created = outcome.created,
        "frequency delta merged"
    );
    Ok(outcome)
}

fn clamp(count: f64) -> f64 {
    count.max(FREQUENCY_FLOOR)
}
