//! Per-record extraction: one lead at a time.

use leadscore_core::errors::StorageError;
use leadscore_storage::queries::leads::{get_lead_row, select_ids};
use leadscore_storage::queries::tags::tags_for_lead;
use rusqlite::Connection;

use super::{FeatureExtractor, LeadFeatures, LeadSelection};

pub(super) fn extract(
    extractor: &FeatureExtractor,
    conn: &Connection,
    selection: &LeadSelection,
) -> Result<Vec<LeadFeatures>, StorageError> {
    let ids = match selection {
        LeadSelection::Ids(ids) => {
            let mut ids = ids.clone();
            ids.sort_unstable();
            ids.dedup();
            ids
        }
        LeadSelection::Filter(filter) => select_ids(conn, filter)?,
    };

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        // Ids that no longer exist are skipped.
        let Some(row) = get_lead_row(conn, id, extractor.columns())? else {
            continue;
        };
        let tags = if extractor.whitelist().includes_tags() {
            tags_for_lead(conn, id)?
        } else {
            Vec::new()
        };
        out.push(extractor.assemble(row, &tags));
    }
    Ok(out)
}
