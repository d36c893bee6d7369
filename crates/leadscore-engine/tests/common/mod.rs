//! Shared CRM fixture for the engine tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use leadscore_core::config::ScoringConfig;
use leadscore_core::types::{LeadId, StageId, TagId, TeamId};
use leadscore_engine::ScoringEngine;
use leadscore_storage::migrations::run_migrations;
use leadscore_storage::queries::frequencies::{insert_rows, load_all, NewFrequencyRow};
use leadscore_storage::queries::leads::{get_probabilities, insert_lead, LeadProbabilities, NewLead};
use leadscore_storage::queries::stages::insert_stage;
use leadscore_storage::queries::tags::set_lead_tags;
use leadscore_storage::queries::teams::insert_team;
use rusqlite::Connection;

/// 2024-01-01T00:00:00Z, after the fixture cutoff.
pub const CREATED: i64 = 1_704_067_200;

/// 2022-01-01T00:00:00Z, before the fixture cutoff.
pub const CREATED_BEFORE_CUTOFF: i64 = 1_640_995_200;

pub const CUTOFF: &str = "2023-01-01";

pub fn cutoff() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2023, 1, 1)
}

/// Scoring config with the given whitelist and the fixture cutoff.
pub fn config(fields: &str) -> ScoringConfig {
    ScoringConfig {
        pls_fields: Some(fields.to_string()),
        pls_start_date: Some(CUTOFF.to_string()),
        ..Default::default()
    }
}

pub fn engine(fields: &str) -> ScoringEngine {
    ScoringEngine::new(&config(fields))
}

/// In-memory CRM with one team and a four-stage shared pipeline.
pub struct Crm {
    pub conn: Connection,
    pub team: TeamId,
    pub new: StageId,
    pub qualified: StageId,
    pub proposition: StageId,
    pub won: StageId,
}

impl Crm {
    pub fn new() -> Self {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let team = insert_team(&conn, "Direct Sales").unwrap();
        let new = insert_stage(&conn, "New", 1, None, false).unwrap();
        let qualified = insert_stage(&conn, "Qualified", 2, None, false).unwrap();
        let proposition = insert_stage(&conn, "Proposition", 3, None, false).unwrap();
        let won = insert_stage(&conn, "Won", 70, None, true).unwrap();
        Self {
            conn,
            team,
            new,
            qualified,
            proposition,
            won,
        }
    }

    pub fn add_team(&self, name: &str) -> TeamId {
        insert_team(&self.conn, name).unwrap()
    }

    pub fn insert(&self, lead: NewLead) -> LeadId {
        insert_lead(&self.conn, &lead).unwrap()
    }

    /// Open lead of the fixture team.
    pub fn open_lead(&self, stage: StageId, country: Option<i64>) -> LeadId {
        self.insert(NewLead {
            name: "open".to_string(),
            stage_id: Some(stage),
            team_id: Some(self.team),
            country_id: country,
            create_date: CREATED,
            ..Default::default()
        })
    }

    pub fn won_lead(&self, team: Option<TeamId>, country: Option<i64>) -> LeadId {
        self.insert(NewLead {
            name: "won".to_string(),
            stage_id: Some(self.won),
            team_id: team,
            country_id: country,
            probability: Some(100.0),
            create_date: CREATED,
            ..Default::default()
        })
    }

    pub fn lost_lead(&self, team: Option<TeamId>, stage: StageId, country: Option<i64>) -> LeadId {
        self.insert(NewLead {
            name: "lost".to_string(),
            stage_id: Some(stage),
            team_id: team,
            country_id: country,
            probability: Some(0.0),
            active: false,
            create_date: CREATED,
            ..Default::default()
        })
    }

    pub fn tag(&self, lead: LeadId, tags: &[TagId]) {
        set_lead_tags(&self.conn, lead, tags).unwrap();
    }

    pub fn frequency(&self, team: Option<TeamId>, variable: &str, value: &str, won: f64, lost: f64) {
        insert_rows(
            &self.conn,
            &[NewFrequencyRow {
                team_id: team,
                variable: variable.to_string(),
                value: value.to_string(),
                won_count: won,
                lost_count: lost,
            }],
        )
        .unwrap();
    }

    pub fn probabilities(&self, lead: LeadId) -> LeadProbabilities {
        get_probabilities(&self.conn, lead).unwrap().unwrap()
    }

    /// Frequency table as sorted (team, variable, value, won, lost) tuples.
    pub fn frequency_table(&self) -> Vec<(Option<i64>, String, String, f64, f64)> {
        let mut rows: Vec<_> = load_all(&self.conn)
            .unwrap()
            .into_iter()
            .map(|r| {
                (
                    r.team_id.map(TeamId::raw),
                    r.variable,
                    r.value,
                    r.won_count,
                    r.lost_count,
                )
            })
            .collect();
        rows.sort_by(|a, b| (a.0, &a.1, &a.2).cmp(&(b.0, &b.1, &b.2)));
        rows
    }

    /// Counts of one frequency row, if present.
    pub fn counts(&self, team: Option<TeamId>, variable: &str, value: &str) -> Option<(f64, f64)> {
        self.frequency_table()
            .into_iter()
            .find(|r| r.0 == team.map(TeamId::raw) && r.1 == variable && r.2 == value)
            .map(|r| (r.3, r.4))
    }
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
