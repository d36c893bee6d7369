//! Queries for the teams table.

use leadscore_core::errors::StorageError;
use leadscore_core::types::TeamId;
use rusqlite::{params, Connection};

use super::util::sql_err;

/// Insert a team. Returns its id.
pub fn insert_team(conn: &Connection, name: &str) -> Result<TeamId, StorageError> {
    conn.execute("INSERT INTO teams (name) VALUES (?1)", params![name])
        .map_err(sql_err)?;
    Ok(TeamId(conn.last_insert_rowid()))
}

/// Ids of every team, archived ones included.
pub fn list_team_ids(conn: &Connection) -> Result<Vec<TeamId>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id FROM teams ORDER BY id")
        .map_err(sql_err)?;
    let rows = stmt
        .query_map([], |row| Ok(TeamId(row.get(0)?)))
        .map_err(sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sql_err)
}
