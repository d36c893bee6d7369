//! Bulk extraction: scalar columns and tag pairs in two queries per id chunk.

use leadscore_core::constants::SQL_IN_CHUNK;
use leadscore_core::errors::StorageError;
use leadscore_core::types::{FxHashMap, LeadId, TagId};
use leadscore_storage::queries::leads::{fetch_lead_rows, fetch_tag_pairs, LeadFilter};
use rusqlite::Connection;
use smallvec::SmallVec;

use super::{FeatureExtractor, LeadFeatures, LeadSelection};

pub(super) fn extract(
    extractor: &FeatureExtractor,
    conn: &Connection,
    selection: &LeadSelection,
) -> Result<Vec<LeadFeatures>, StorageError> {
    match selection {
        LeadSelection::Filter(filter) => extract_filter(extractor, conn, filter),
        LeadSelection::Ids(ids) => {
            let mut ids = ids.clone();
            ids.sort_unstable();
            ids.dedup();
            let mut out = Vec::with_capacity(ids.len());
            for chunk in ids.chunks(SQL_IN_CHUNK) {
                out.extend(extract_filter(
                    extractor,
                    conn,
                    &LeadFilter::by_ids(chunk.to_vec()),
                )?);
            }
            Ok(out)
        }
    }
}

fn extract_filter(
    extractor: &FeatureExtractor,
    conn: &Connection,
    filter: &LeadFilter,
) -> Result<Vec<LeadFeatures>, StorageError> {
    let rows = fetch_lead_rows(conn, filter, extractor.columns())?;

    let mut tags: FxHashMap<LeadId, SmallVec<[TagId; 4]>> = FxHashMap::default();
    if extractor.whitelist().includes_tags() {
        for (lead, tag) in fetch_tag_pairs(conn, filter)? {
            tags.entry(lead).or_default().push(tag);
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let lead_tags = tags.remove(&row.id).unwrap_or_default();
            extractor.assemble(row, &lead_tags)
        })
        .collect())
}
