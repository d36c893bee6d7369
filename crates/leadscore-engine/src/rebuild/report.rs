//! Reports returned by the maintenance jobs.

use serde::Serialize;

/// Frequency table reconstruction result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    /// No cutoff configured; nothing was touched.
    pub skipped: bool,
    pub won_leads: usize,
    pub lost_leads: usize,
    pub entries_written: usize,
    pub duration_ms: u64,
}

/// Sub-batch write statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteStats {
    pub transactions_attempted: usize,
    pub transactions_failed: usize,
    pub rows_updated: usize,
    pub max_rows_per_transaction: usize,
}

/// Open-lead probability refresh result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// No cutoff configured; nothing was touched.
    pub skipped: bool,
    pub leads_selected: usize,
    pub leads_scored: usize,
    /// Lead count of every classifier invocation, in order.
    pub classifier_chunks: Vec<usize>,
    pub transactions_attempted: usize,
    pub transactions_failed: usize,
    pub rows_updated: usize,
    pub max_rows_per_transaction: usize,
    pub duration_ms: u64,
}

impl RefreshReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }

    pub(crate) fn add_writes(&mut self, stats: WriteStats) {
        self.transactions_attempted += stats.transactions_attempted;
        self.transactions_failed += stats.transactions_failed;
        self.rows_updated += stats.rows_updated;
        self.max_rows_per_transaction = self
            .max_rows_per_transaction
            .max(stats.max_rows_per_transaction);
    }
}
