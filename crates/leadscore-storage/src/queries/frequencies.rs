//! Queries for the scoring_frequencies table.

use leadscore_core::errors::StorageError;
use leadscore_core::types::TeamId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use super::util::{placeholders, sql_err};

/// A stored frequency row.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    pub id: i64,
    pub team_id: Option<TeamId>,
    pub variable: String,
    pub value: String,
    pub won_count: f64,
    pub lost_count: f64,
}

/// A frequency row to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFrequencyRow {
    pub team_id: Option<TeamId>,
    pub variable: String,
    pub value: String,
    pub won_count: f64,
    pub lost_count: f64,
}

const SELECT_COLUMNS: &str = "SELECT id, team_id, variable, value, won_count, lost_count \
                              FROM scoring_frequencies";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FrequencyRow> {
    Ok(FrequencyRow {
        id: row.get(0)?,
        team_id: row.get::<_, Option<i64>>(1)?.map(TeamId),
        variable: row.get(2)?,
        value: row.get(3)?,
        won_count: row.get(4)?,
        lost_count: row.get(5)?,
    })
}

fn query_rows(
    conn: &Connection,
    sql: &str,
    values: &[Value],
) -> Result<Vec<FrequencyRow>, StorageError> {
    let mut stmt = conn.prepare(sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), map_row)
        .map_err(sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sql_err)
}

/// Every row whose variable is in `variables`, ordered by (team_id, id).
/// Rows without a team sort first.
pub fn load_by_variables(
    conn: &Connection,
    variables: &[String],
) -> Result<Vec<FrequencyRow>, StorageError> {
    if variables.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "{SELECT_COLUMNS} WHERE variable IN ({}) ORDER BY team_id, id",
        placeholders(variables.len())
    );
    let values: Vec<Value> = variables.iter().map(|v| Value::Text(v.clone())).collect();
    query_rows(conn, &sql, &values)
}

/// Rows matching `variables` for the given teams. `None` in `teams`
/// selects the no-team bucket.
pub fn load_for_update(
    conn: &Connection,
    variables: &[String],
    teams: &[Option<TeamId>],
) -> Result<Vec<FrequencyRow>, StorageError> {
    if variables.is_empty() || teams.is_empty() {
        return Ok(Vec::new());
    }
    let team_ids: Vec<i64> = teams.iter().flatten().map(|t| t.raw()).collect();
    let include_null = teams.iter().any(Option::is_none);

    let mut team_clauses = Vec::new();
    if !team_ids.is_empty() {
        team_clauses.push(format!("team_id IN ({})", placeholders(team_ids.len())));
    }
    if include_null {
        team_clauses.push("team_id IS NULL".to_string());
    }

    let sql = format!(
        "{SELECT_COLUMNS} WHERE variable IN ({}) AND ({}) ORDER BY id",
        placeholders(variables.len()),
        team_clauses.join(" OR ")
    );
    let mut values: Vec<Value> = variables.iter().map(|v| Value::Text(v.clone())).collect();
    values.extend(team_ids.into_iter().map(Value::Integer));
    query_rows(conn, &sql, &values)
}

/// Every row, ordered by id.
pub fn load_all(conn: &Connection) -> Result<Vec<FrequencyRow>, StorageError> {
    query_rows(conn, &format!("{SELECT_COLUMNS} ORDER BY id"), &[])
}

/// Insert rows. Returns the number inserted.
pub fn insert_rows(conn: &Connection, rows: &[NewFrequencyRow]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO scoring_frequencies (team_id, variable, value, won_count, lost_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(sql_err)?;
    let mut inserted = 0;
    for row in rows {
        inserted += stmt
            .execute(params![
                row.team_id.map(TeamId::raw),
                row.variable,
                row.value,
                row.won_count,
                row.lost_count,
            ])
            .map_err(sql_err)?;
    }
    Ok(inserted)
}

/// Overwrite the counts of existing rows: `(id, won_count, lost_count)`.
pub fn update_counts(conn: &Connection, updates: &[(i64, f64, f64)]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "UPDATE scoring_frequencies SET won_count = ?1, lost_count = ?2 WHERE id = ?3",
        )
        .map_err(sql_err)?;
    let mut updated = 0;
    for (id, won, lost) in updates {
        updated += stmt.execute(params![won, lost, id]).map_err(sql_err)?;
    }
    Ok(updated)
}

/// Delete every row. Returns the number deleted.
pub fn truncate(conn: &Connection) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM scoring_frequencies", [])
        .map_err(sql_err)
}

/// Number of stored rows.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM scoring_frequencies", [], |row| row.get(0))
        .map_err(sql_err)
}
