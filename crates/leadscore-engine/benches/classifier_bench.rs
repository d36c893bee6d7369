use criterion::{criterion_group, criterion_main, Criterion};

use leadscore_core::types::{LeadId, SmallVec8, StageId, TeamId};
use leadscore_engine::classifier::FrequencySnapshot;
use leadscore_engine::{
    ExtractionMode, Feature, FeatureExtractor, FieldWhitelist, LeadFeatures, LeadSelection,
    LeadState, NaiveBayesClassifier, StageCatalog,
};
use leadscore_storage::migrations::run_migrations;
use leadscore_storage::queries::frequencies::FrequencyRow;
use leadscore_storage::queries::leads::{insert_lead, LeadFilter, NewLead};
use leadscore_storage::queries::stages::{insert_stage, StageRow};
use leadscore_storage::queries::teams::insert_team;
use rusqlite::Connection;

const TEAMS: i64 = 5;
const STAGES: i64 = 4;
const COUNTRIES: i64 = 40;

fn stages() -> StageCatalog {
    StageCatalog::from_rows(
        (1..=STAGES)
            .map(|i| StageRow {
                id: StageId(i),
                name: format!("stage {i}"),
                sequence: i,
                team_id: None,
                is_won: i == STAGES,
            })
            .collect(),
    )
}

/// Frequency rows for every (team, stage) and (team, country) pair.
fn frequency_rows() -> Vec<FrequencyRow> {
    let mut rows = Vec::new();
    let mut id = 0;
    for team in 1..=TEAMS {
        for stage in 1..=STAGES {
            id += 1;
            rows.push(FrequencyRow {
                id,
                team_id: Some(TeamId(team)),
                variable: "stage_id".to_string(),
                value: stage.to_string(),
                won_count: 400.1 - stage as f64 * 10.0,
                lost_count: 300.1 - stage as f64 * 60.0,
            });
        }
        for country in 1..=COUNTRIES {
            id += 1;
            rows.push(FrequencyRow {
                id,
                team_id: Some(TeamId(team)),
                variable: "country_id".to_string(),
                value: country.to_string(),
                won_count: (country % 7) as f64 * 3.0 + 0.1,
                lost_count: (country % 5) as f64 * 4.0 + 0.1,
            });
        }
    }
    rows
}

fn leads(count: i64) -> Vec<LeadFeatures> {
    (0..count)
        .map(|i| {
            let mut features = SmallVec8::new();
            features.push(Feature::new("country_id", (i % COUNTRIES + 1).to_string()));
            features.push(Feature::new("email_state", "correct"));
            LeadFeatures {
                lead_id: LeadId(i + 1),
                team_id: Some(TeamId(i % TEAMS + 1)),
                stage_id: Some(StageId(i % (STAGES - 1) + 1)),
                state: LeadState::Open,
                features,
            }
        })
        .collect()
}

fn bench_score_50k(c: &mut Criterion) {
    let stages = stages();
    let snapshot = FrequencySnapshot::build(&frequency_rows(), stages.first_stage(), 50.0);
    let leads = leads(50_000);
    let classifier = NaiveBayesClassifier::new(50.0);

    c.bench_function("score_50k_leads", |b| {
        b.iter(|| {
            let scored = classifier.score(&snapshot, &leads, &stages);
            assert_eq!(scored.len(), 50_000);
        });
    });
}

fn bench_bulk_extract_10k(c: &mut Criterion) {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    let team = insert_team(&conn, "Direct").unwrap();
    let stage = insert_stage(&conn, "New", 1, None, false).unwrap();
    conn.execute_batch("BEGIN").unwrap();
    for i in 0..10_000 {
        insert_lead(
            &conn,
            &NewLead {
                team_id: Some(team),
                stage_id: Some(stage),
                country_id: Some(i % COUNTRIES + 1),
                create_date: 1_700_000_000,
                ..Default::default()
            },
        )
        .unwrap();
    }
    conn.execute_batch("COMMIT").unwrap();

    let extractor = FeatureExtractor::new(FieldWhitelist::parse("country_id,email_state,phone_state"));
    let selection = LeadSelection::Filter(LeadFilter::default());

    c.bench_function("bulk_extract_10k_leads", |b| {
        b.iter(|| {
            let leads = extractor
                .extract(&conn, &selection, ExtractionMode::Bulk)
                .unwrap();
            assert_eq!(leads.len(), 10_000);
        });
    });
}

criterion_group!(benches, bench_score_50k, bench_bulk_extract_10k);
criterion_main!(benches);
