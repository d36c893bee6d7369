//! Queries for the leads table: declarative filters, bulk and per-record
//! feature reads, and the bulk probability update.

use leadscore_core::errors::StorageError;
use leadscore_core::types::{LeadId, StageId, TagId, TeamId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::util::{placeholders, sql_err};

/// Categorical lead columns that may be read as scoring features.
pub const LEAD_FEATURE_COLUMNS: &[&str] = &[
    "stage_id",
    "team_id",
    "country_id",
    "state_id",
    "lang_id",
    "source_id",
    "medium_id",
    "campaign_id",
    "email_state",
    "phone_state",
];

/// Rows bound per bulk UPDATE statement; two parameters per row must stay
/// under SQLite's 32766 variable limit.
const MAX_UPDATE_ROWS_PER_STATEMENT: usize = 16_000;

/// Outcome predicate of a [`LeadFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadOutcome {
    /// Won (probability = 100) or lost (probability = 0 and archived).
    Closed,
    /// Active, staged, and probability unset or strictly between 0 and 100.
    Open,
}

/// Declarative selection over the leads table. Empty filter = every lead.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub ids: Option<Vec<LeadId>>,
    /// Inclusive id range.
    pub id_range: Option<(LeadId, LeadId)>,
    /// Unix seconds; leads created before are excluded.
    pub created_since: Option<i64>,
    pub outcome: Option<LeadOutcome>,
}

impl LeadFilter {
    /// Filter selecting exactly `ids`.
    pub fn by_ids(ids: Vec<LeadId>) -> Self {
        Self {
            ids: Some(ids),
            ..Default::default()
        }
    }

    /// Render the WHERE clause (leads aliased as `l`) and its parameters.
    pub fn where_clause(&self) -> (String, Vec<Value>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(ids) = &self.ids {
            if ids.is_empty() {
                clauses.push("0 = 1".to_string());
            } else {
                clauses.push(format!("l.id IN ({})", placeholders(ids.len())));
                values.extend(ids.iter().map(|id| Value::Integer(id.raw())));
            }
        }
        if let Some((low, high)) = self.id_range {
            clauses.push("l.id BETWEEN ? AND ?".to_string());
            values.push(Value::Integer(low.raw()));
            values.push(Value::Integer(high.raw()));
        }
        if let Some(since) = self.created_since {
            clauses.push("l.create_date >= ?".to_string());
            values.push(Value::Integer(since));
        }
        match self.outcome {
            Some(LeadOutcome::Closed) => clauses.push(
                "(l.probability = 100 OR (l.probability = 0 AND l.active = 0))".to_string(),
            ),
            Some(LeadOutcome::Open) => clauses.push(
                "(l.active = 1 AND l.stage_id IS NOT NULL \
                 AND (l.probability IS NULL OR (l.probability > 0 AND l.probability < 100)))"
                    .to_string(),
            ),
            None => {}
        }

        if clauses.is_empty() {
            ("1 = 1".to_string(), values)
        } else {
            (clauses.join(" AND "), values)
        }
    }
}

/// Structural columns of a lead plus the requested feature columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRow {
    pub id: LeadId,
    pub team_id: Option<TeamId>,
    pub stage_id: Option<StageId>,
    pub probability: Option<f64>,
    pub active: bool,
    /// One value per requested column, in request order.
    pub values: Vec<Value>,
}

/// Insertable lead (used by the surrounding CRM and by fixtures).
#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub stage_id: Option<StageId>,
    pub team_id: Option<TeamId>,
    pub country_id: Option<i64>,
    pub state_id: Option<i64>,
    pub lang_id: Option<i64>,
    pub source_id: Option<i64>,
    pub medium_id: Option<i64>,
    pub campaign_id: Option<i64>,
    pub email_state: Option<String>,
    pub phone_state: Option<String>,
    pub probability: Option<f64>,
    pub automated_probability: Option<f64>,
    pub active: bool,
    pub create_date: i64,
}

impl Default for NewLead {
    fn default() -> Self {
        Self {
            name: String::new(),
            stage_id: None,
            team_id: None,
            country_id: None,
            state_id: None,
            lang_id: None,
            source_id: None,
            medium_id: None,
            campaign_id: None,
            email_state: None,
            phone_state: None,
            probability: None,
            automated_probability: None,
            active: true,
            create_date: 0,
        }
    }
}

/// Probability columns of one lead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadProbabilities {
    pub probability: Option<f64>,
    pub automated_probability: Option<f64>,
}

fn check_columns(columns: &[&str]) -> Result<(), StorageError> {
    for column in columns {
        if !LEAD_FEATURE_COLUMNS.contains(column) {
            return Err(StorageError::UnknownColumn {
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Insert a lead. Returns its id.
pub fn insert_lead(conn: &Connection, lead: &NewLead) -> Result<LeadId, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO leads
             (name, stage_id, team_id, country_id, state_id, lang_id, source_id, medium_id,
              campaign_id, email_state, phone_state, probability, automated_probability,
              active, create_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )
        .map_err(sql_err)?;
    stmt.execute(params![
        lead.name,
        lead.stage_id.map(StageId::raw),
        lead.team_id.map(TeamId::raw),
        lead.country_id,
        lead.state_id,
        lead.lang_id,
        lead.source_id,
        lead.medium_id,
        lead.campaign_id,
        lead.email_state,
        lead.phone_state,
        lead.probability,
        lead.automated_probability,
        lead.active,
        lead.create_date,
    ])
    .map_err(sql_err)?;
    Ok(LeadId(conn.last_insert_rowid()))
}

/// Overwrite the outcome-related columns of a lead.
pub fn update_outcome(
    conn: &Connection,
    id: LeadId,
    stage_id: Option<StageId>,
    active: bool,
    probability: Option<f64>,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE leads SET stage_id = ?1, active = ?2, probability = ?3 WHERE id = ?4",
            params![stage_id.map(StageId::raw), active, probability, id.raw()],
        )
        .map_err(sql_err)?;
    if changed == 0 {
        return Err(StorageError::LeadNotFound { id: id.raw() });
    }
    Ok(())
}

/// Bulk read of structural + feature columns for every lead matching `filter`,
/// ordered by id.
pub fn fetch_lead_rows(
    conn: &Connection,
    filter: &LeadFilter,
    columns: &[&str],
) -> Result<Vec<LeadRow>, StorageError> {
    check_columns(columns)?;
    let (where_sql, values) = filter.where_clause();
    let mut select = String::from("SELECT l.id, l.team_id, l.stage_id, l.probability, l.active");
    for column in columns {
        select.push_str(", l.");
        select.push_str(column);
    }
    let sql = format!("{select} FROM leads l WHERE {where_sql} ORDER BY l.id");

    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), |row| {
            let mut feature_values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                feature_values.push(row.get::<_, Value>(5 + i)?);
            }
            Ok(LeadRow {
                id: LeadId(row.get(0)?),
                team_id: row.get::<_, Option<i64>>(1)?.map(TeamId),
                stage_id: row.get::<_, Option<i64>>(2)?.map(StageId),
                probability: row.get(3)?,
                active: row.get(4)?,
                values: feature_values,
            })
        })
        .map_err(sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sql_err)
}

/// Single-lead read of structural + feature columns.
pub fn get_lead_row(
    conn: &Connection,
    id: LeadId,
    columns: &[&str],
) -> Result<Option<LeadRow>, StorageError> {
    let mut rows = fetch_lead_rows(conn, &LeadFilter::by_ids(vec![id]), columns)?;
    Ok(rows.pop())
}

/// (lead, tag) pairs for every lead matching `filter`, ordered by lead then tag.
pub fn fetch_tag_pairs(
    conn: &Connection,
    filter: &LeadFilter,
) -> Result<Vec<(LeadId, TagId)>, StorageError> {
    let (where_sql, values) = filter.where_clause();
    let sql = format!(
        "SELECT lt.lead_id, lt.tag_id
         FROM lead_tags lt
         JOIN leads l ON l.id = lt.lead_id
         WHERE {where_sql}
         ORDER BY lt.lead_id, lt.tag_id"
    );
    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), |row| {
            Ok((LeadId(row.get(0)?), TagId(row.get(1)?)))
        })
        .map_err(sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sql_err)
}

/// Ids of every lead matching `filter`, ascending.
pub fn select_ids(conn: &Connection, filter: &LeadFilter) -> Result<Vec<LeadId>, StorageError> {
    let (where_sql, values) = filter.where_clause();
    let sql = format!("SELECT l.id FROM leads l WHERE {where_sql} ORDER BY l.id");
    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), |row| Ok(LeadId(row.get(0)?)))
        .map_err(sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sql_err)
}

/// Read the probability columns of one lead.
pub fn get_probabilities(
    conn: &Connection,
    id: LeadId,
) -> Result<Option<LeadProbabilities>, StorageError> {
    conn.query_row(
        "SELECT probability, automated_probability FROM leads WHERE id = ?1",
        params![id.raw()],
        |row| {
            Ok(LeadProbabilities {
                probability: row.get(0)?,
                automated_probability: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(sql_err)
}

/// Write automated probabilities for a batch of leads with one UPDATE.
///
/// `probability` follows the new automated value only when it is unset or
/// still equal to the previous automated value; a manually entered
/// probability is left untouched. Returns the number of rows changed.
pub fn update_automated_probabilities(
    conn: &Connection,
    batch: &[(LeadId, f64)],
) -> Result<usize, StorageError> {
    let mut changed = 0;
    for chunk in batch.chunks(MAX_UPDATE_ROWS_PER_STATEMENT) {
        let mut rows_sql = String::with_capacity(chunk.len() * 8);
        let mut values: Vec<Value> = Vec::with_capacity(chunk.len() * 2);
        for (i, (id, probability)) in chunk.iter().enumerate() {
            if i > 0 {
                rows_sql.push_str(", ");
            }
            rows_sql.push_str("(?, ?)");
            values.push(Value::Integer(id.raw()));
            values.push(Value::Real(*probability));
        }
        let sql = format!(
            "WITH batch(id, p) AS (VALUES {rows_sql})
             UPDATE leads SET
                 probability = CASE
                     WHEN leads.probability IS NULL
                          OR leads.probability = leads.automated_probability
                     THEN batch.p
                     ELSE leads.probability
                 END,
                 automated_probability = batch.p
             FROM batch
             WHERE leads.id = batch.id"
        );
        changed += conn
            .execute(&sql, params_from_iter(values.iter()))
            .map_err(sql_err)?;
    }
    Ok(changed)
}
