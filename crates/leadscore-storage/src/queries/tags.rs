//! Queries for the tags and lead_tags tables.

use leadscore_core::errors::StorageError;
use leadscore_core::types::{LeadId, TagId};
use rusqlite::{params, Connection};

use super::util::sql_err;

/// Insert a tag. Returns its id.
pub fn insert_tag(conn: &Connection, name: &str) -> Result<TagId, StorageError> {
    conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])
        .map_err(sql_err)?;
    Ok(TagId(conn.last_insert_rowid()))
}

/// Replace the tag set of a lead.
pub fn set_lead_tags(conn: &Connection, lead: LeadId, tags: &[TagId]) -> Result<(), StorageError> {
    conn.execute("DELETE FROM lead_tags WHERE lead_id = ?1", params![lead.raw()])
        .map_err(sql_err)?;
    let mut stmt = conn
        .prepare_cached("INSERT OR IGNORE INTO lead_tags (lead_id, tag_id) VALUES (?1, ?2)")
        .map_err(sql_err)?;
    for tag in tags {
        stmt.execute(params![lead.raw(), tag.raw()]).map_err(sql_err)?;
    }
    Ok(())
}

/// Tags of one lead, ordered by id.
pub fn tags_for_lead(conn: &Connection, lead: LeadId) -> Result<Vec<TagId>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT tag_id FROM lead_tags WHERE lead_id = ?1 ORDER BY tag_id")
        .map_err(sql_err)?;
    let rows = stmt
        .query_map(params![lead.raw()], |row| Ok(TagId(row.get(0)?)))
        .map_err(sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sql_err)
}
