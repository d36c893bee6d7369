//! Queries for the stages table.

use leadscore_core::errors::StorageError;
use leadscore_core::types::{StageId, TeamId};
use rusqlite::{params, Connection};

use super::util::sql_err;

/// A pipeline stage row.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRow {
    pub id: StageId,
    pub name: String,
    pub sequence: i64,
    pub team_id: Option<TeamId>,
    pub is_won: bool,
}

/// Insert a stage. Returns its id.
pub fn insert_stage(
    conn: &Connection,
    name: &str,
    sequence: i64,
    team_id: Option<TeamId>,
    is_won: bool,
) -> Result<StageId, StorageError> {
    conn.execute(
        "INSERT INTO stages (name, sequence, team_id, is_won) VALUES (?1, ?2, ?3, ?4)",
        params![name, sequence, team_id.map(TeamId::raw), is_won],
    )
    .map_err(sql_err)?;
    Ok(StageId(conn.last_insert_rowid()))
}

/// All stages ordered by (sequence, id).
pub fn list_stages(conn: &Connection) -> Result<Vec<StageRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, name, sequence, team_id, is_won FROM stages ORDER BY sequence, id",
        )
        .map_err(sql_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StageRow {
                id: StageId(row.get(0)?),
                name: row.get(1)?,
                sequence: row.get(2)?,
                team_id: row.get::<_, Option<i64>>(3)?.map(TeamId),
                is_won: row.get(4)?,
            })
        })
        .map_err(sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sql_err)
}
