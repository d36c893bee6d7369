//! Sub-batch persistence of computed probabilities.

use leadscore_core::errors::StorageError;
use leadscore_core::types::LeadId;
use leadscore_storage::connection::writer::{with_immediate_transaction, with_savepoint};
use leadscore_storage::queries::leads::update_automated_probabilities;
use rusqlite::Connection;

use super::WriteStats;
use crate::classifier::ProbabilityMap;

const SUB_BATCH_SAVEPOINT: &str = "leadscore_sub_batch";

/// Persist `probabilities` in sub-batches of `batch_size` rows, one bulk
/// UPDATE each.
///
/// Outside a transaction every sub-batch commits on its own; inside one,
/// every sub-batch is a savepoint. A failing sub-batch is rolled back,
/// logged and counted, and the remaining sub-batches still run.
pub fn write_probabilities(
    conn: &Connection,
    probabilities: &ProbabilityMap,
    batch_size: usize,
) -> WriteStats {
    let rows: Vec<(LeadId, f64)> = probabilities.iter().map(|(id, p)| (*id, *p)).collect();
    let nested = !conn.is_autocommit();
    let mut stats = WriteStats::default();

    for (index, batch) in rows.chunks(batch_size.max(1)).enumerate() {
        stats.transactions_attempted += 1;
        stats.max_rows_per_transaction = stats.max_rows_per_transaction.max(batch.len());

        let result: Result<usize, StorageError> = if nested {
            with_savepoint(conn, SUB_BATCH_SAVEPOINT, |c| update_automated_probabilities(c, batch))
        } else {
            with_immediate_transaction(conn, |tx| update_automated_probabilities(tx, batch))
        };

        match result {
            Ok(updated) => stats.rows_updated += updated,
            Err(e) => {
                stats.transactions_failed += 1;
                tracing::error!(
                    sub_batch = index,
                    rows = batch.len(),
                    failed_so_far = stats.transactions_failed,
                    error = %e,
                    "probability sub-batch failed, continuing"
                );
            }
        }
    }
    stats
}
