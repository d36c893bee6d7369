//! Frequency table deltas and the update primitive shared by the live
//! incrementer and the batch rebuild.

mod delta;
mod merge;

pub use delta::{Counts, FrequencyDelta, FrequencyKey};
pub use merge::{apply_delta, MergeOutcome};

/// Frequency-table variable of the stage feature.
pub const STAGE_VARIABLE: &str = "stage_id";

/// Weight of one lead in the frequency table.
pub const LEAD_WEIGHT: f64 = 1.0;
