//! Tests for lead filters, feature reads, and the bulk probability update.

use leadscore_core::errors::StorageError;
use leadscore_storage::migrations::run_migrations;
use leadscore_storage::queries::leads::*;
use leadscore_storage::queries::stages::insert_stage;
use leadscore_storage::queries::tags::{insert_tag, set_lead_tags, tags_for_lead};
use leadscore_storage::queries::teams::insert_team;
use leadscore_core::types::{LeadId, StageId};
use rusqlite::types::Value;
use rusqlite::Connection;

fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn
}

fn lead(stage: Option<StageId>, probability: Option<f64>, active: bool, created: i64) -> NewLead {
    NewLead {
        name: "lead".to_string(),
        stage_id: stage,
        probability,
        active,
        create_date: created,
        ..Default::default()
    }
}

#[test]
fn insert_and_read_single_lead() {
    let conn = setup_db();
    let team = insert_team(&conn, "Direct").unwrap();
    let stage = insert_stage(&conn, "New", 1, None, false).unwrap();
    let id = insert_lead(
        &conn,
        &NewLead {
            team_id: Some(team),
            country_id: Some(7),
            email_state: Some("correct".to_string()),
            ..lead(Some(stage), None, true, 1_700_000_000)
        },
    )
    .unwrap();

    let row = get_lead_row(&conn, id, &["country_id", "email_state", "phone_state"])
        .unwrap()
        .unwrap();
    assert_eq!(row.id, id);
    assert_eq!(row.team_id, Some(team));
    assert_eq!(row.stage_id, Some(stage));
    assert!(row.active);
    assert_eq!(row.probability, None);
    assert_eq!(
        row.values,
        vec![Value::Integer(7), Value::Text("correct".to_string()), Value::Null]
    );
}

#[test]
fn missing_lead_reads_none() {
    let conn = setup_db();
    assert!(get_lead_row(&conn, LeadId(404), &[]).unwrap().is_none());
    assert!(get_probabilities(&conn, LeadId(404)).unwrap().is_none());
}

#[test]
fn unknown_column_is_rejected() {
    let conn = setup_db();
    let result = fetch_lead_rows(&conn, &LeadFilter::default(), &["name; DROP TABLE leads"]);
    match result {
        Err(StorageError::UnknownColumn { column }) => {
            assert_eq!(column, "name; DROP TABLE leads");
        }
        other => panic!("expected UnknownColumn, got {other:?}"),
    }
    // The leads table is untouched.
    assert!(fetch_lead_rows(&conn, &LeadFilter::default(), &[]).is_ok());
}

#[test]
fn closed_filter_selects_won_and_archived_lost() {
    let conn = setup_db();
    let stage = insert_stage(&conn, "New", 1, None, false).unwrap();
    let won = insert_lead(&conn, &lead(Some(stage), Some(100.0), true, 0)).unwrap();
    let lost = insert_lead(&conn, &lead(Some(stage), Some(0.0), false, 0)).unwrap();
    // Active with zero probability is not lost.
    insert_lead(&conn, &lead(Some(stage), Some(0.0), true, 0)).unwrap();
    insert_lead(&conn, &lead(Some(stage), Some(40.0), true, 0)).unwrap();

    let filter = LeadFilter {
        outcome: Some(LeadOutcome::Closed),
        ..Default::default()
    };
    assert_eq!(select_ids(&conn, &filter).unwrap(), vec![won, lost]);
}

#[test]
fn open_filter_selects_scorable_leads_after_cutoff() {
    let conn = setup_db();
    let stage = insert_stage(&conn, "New", 1, None, false).unwrap();
    let unset = insert_lead(&conn, &lead(Some(stage), None, true, 100)).unwrap();
    let mid = insert_lead(&conn, &lead(Some(stage), Some(35.0), true, 200)).unwrap();
    insert_lead(&conn, &lead(Some(stage), Some(35.0), true, 50)).unwrap(); // too old
    insert_lead(&conn, &lead(None, None, true, 100)).unwrap(); // no stage
    insert_lead(&conn, &lead(Some(stage), Some(35.0), false, 100)).unwrap(); // archived
    insert_lead(&conn, &lead(Some(stage), Some(100.0), true, 100)).unwrap(); // won
    insert_lead(&conn, &lead(Some(stage), Some(0.0), true, 100)).unwrap(); // zero

    let filter = LeadFilter {
        outcome: Some(LeadOutcome::Open),
        created_since: Some(100),
        ..Default::default()
    };
    assert_eq!(select_ids(&conn, &filter).unwrap(), vec![unset, mid]);
}

#[test]
fn id_range_and_ids_combine() {
    let conn = setup_db();
    let ids: Vec<LeadId> = (0..10)
        .map(|_| insert_lead(&conn, &lead(None, None, true, 0)).unwrap())
        .collect();

    let filter = LeadFilter {
        id_range: Some((ids[2], ids[5])),
        ..Default::default()
    };
    assert_eq!(select_ids(&conn, &filter).unwrap(), ids[2..=5].to_vec());

    let filter = LeadFilter {
        ids: Some(vec![ids[0], ids[3], ids[9]]),
        id_range: Some((ids[2], ids[5])),
        ..Default::default()
    };
    assert_eq!(select_ids(&conn, &filter).unwrap(), vec![ids[3]]);

    assert!(select_ids(&conn, &LeadFilter::by_ids(Vec::new())).unwrap().is_empty());
}

#[test]
fn tag_pairs_are_ordered() {
    let conn = setup_db();
    let a = insert_lead(&conn, &lead(None, None, true, 0)).unwrap();
    let b = insert_lead(&conn, &lead(None, None, true, 0)).unwrap();
    let t1 = insert_tag(&conn, "vip").unwrap();
    let t2 = insert_tag(&conn, "partner").unwrap();
    set_lead_tags(&conn, b, &[t2, t1]).unwrap();
    set_lead_tags(&conn, a, &[t2]).unwrap();

    let pairs = fetch_tag_pairs(&conn, &LeadFilter::default()).unwrap();
    assert_eq!(pairs, vec![(a, t2), (b, t1), (b, t2)]);

    let only_b = fetch_tag_pairs(&conn, &LeadFilter::by_ids(vec![b])).unwrap();
    assert_eq!(only_b.len(), 2);
    assert_eq!(tags_for_lead(&conn, b).unwrap(), vec![t1, t2]);
}

#[test]
fn bulk_update_follows_unset_and_automated_probability() {
    let conn = setup_db();
    let stage = insert_stage(&conn, "New", 1, None, false).unwrap();
    let unset = insert_lead(&conn, &lead(Some(stage), None, true, 0)).unwrap();
    let synced = insert_lead(
        &conn,
        &NewLead {
            automated_probability: Some(30.0),
            ..lead(Some(stage), Some(30.0), true, 0)
        },
    )
    .unwrap();
    let manual = insert_lead(
        &conn,
        &NewLead {
            automated_probability: Some(30.0),
            ..lead(Some(stage), Some(75.0), true, 0)
        },
    )
    .unwrap();

    let changed =
        update_automated_probabilities(&conn, &[(unset, 12.5), (synced, 42.0), (manual, 55.0)])
            .unwrap();
    assert_eq!(changed, 3);

    let p = get_probabilities(&conn, unset).unwrap().unwrap();
    assert_eq!(p.probability, Some(12.5));
    assert_eq!(p.automated_probability, Some(12.5));

    let p = get_probabilities(&conn, synced).unwrap().unwrap();
    assert_eq!(p.probability, Some(42.0));
    assert_eq!(p.automated_probability, Some(42.0));

    let p = get_probabilities(&conn, manual).unwrap().unwrap();
    assert_eq!(p.probability, Some(75.0));
    assert_eq!(p.automated_probability, Some(55.0));
}

#[test]
fn bulk_update_of_empty_batch_is_noop() {
    let conn = setup_db();
    assert_eq!(update_automated_probabilities(&conn, &[]).unwrap(), 0);
}

#[test]
fn update_outcome_of_missing_lead_fails() {
    let conn = setup_db();
    assert!(update_outcome(&conn, LeadId(9), None, false, Some(0.0)).is_err());
}
