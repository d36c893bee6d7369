//! NaiveBayesClassifier behaviour through `recompute_probabilities`.

mod common;

use common::*;
use leadscore_engine::LeadSelection;
use leadscore_storage::queries::leads::NewLead;
use leadscore_storage::queries::tags::insert_tag;

#[test]
fn country_with_won_history_scores_higher() {
    let crm = Crm::new();
    let team = Some(crm.team);
    let new = crm.new.raw().to_string();
    crm.frequency(team, "stage_id", &new, 40.0, 10.0);
    crm.frequency(team, "country_id", "1", 30.0, 2.0);
    crm.frequency(team, "country_id", "3", 10.0, 8.0);

    let us = crm.open_lead(crm.new, Some(1));
    let ca = crm.open_lead(crm.new, Some(2));

    let engine = engine("country_id");
    let scores = engine
        .recompute_probabilities(&crm.conn, &LeadSelection::Ids(vec![us, ca]), false)
        .unwrap();

    // Base rate 40 / 50; CA has no rows so only the base rate applies.
    assert!(approx(scores[&ca], 80.0));
    assert!(approx(scores[&us], 93.75));
    assert!(scores[&us] > scores[&ca]);
}

#[test]
fn batch_and_single_mode_agree() {
    let crm = Crm::new();
    let team = Some(crm.team);
    crm.frequency(team, "stage_id", &crm.new.raw().to_string(), 25.1, 60.1);
    crm.frequency(team, "stage_id", &crm.qualified.raw().to_string(), 25.1, 20.1);
    crm.frequency(team, "country_id", "1", 12.1, 3.1);
    crm.frequency(team, "country_id", "2", 13.1, 57.1);
    let ids: Vec<_> = (0..10)
        .map(|i| {
            let stage = if i % 2 == 0 { crm.new } else { crm.qualified };
            crm.open_lead(stage, Some(i % 3))
        })
        .collect();

    let engine = engine("country_id");
    let selection = LeadSelection::Ids(ids);
    let batch = engine
        .recompute_probabilities(&crm.conn, &selection, true)
        .unwrap();
    let single = engine
        .recompute_probabilities(&crm.conn, &selection, false)
        .unwrap();
    assert_eq!(batch.len(), 10);
    assert_eq!(batch, single);
}

#[test]
fn no_stage_scores_zero_and_won_stage_scores_hundred() {
    let crm = Crm::new();
    crm.frequency(Some(crm.team), "stage_id", &crm.new.raw().to_string(), 5.0, 5.0);
    let unstaged = crm.insert(NewLead {
        team_id: Some(crm.team),
        create_date: CREATED,
        ..Default::default()
    });
    let in_won_stage = crm.open_lead(crm.won, None);

    let scores = engine("")
        .recompute_probabilities(&crm.conn, &LeadSelection::Ids(vec![unstaged, in_won_stage]), true)
        .unwrap();
    assert_eq!(scores[&unstaged], 0.0);
    assert_eq!(scores[&in_won_stage], 100.0);
}

#[test]
fn scores_stay_inside_bounds() {
    let crm = Crm::new();
    let team = Some(crm.team);
    let new = crm.new.raw().to_string();
    crm.frequency(team, "stage_id", &new, 100_000.0, 0.1);
    crm.frequency(team, "country_id", "1", 100_000.0, 0.1);
    crm.frequency(team, "country_id", "2", 0.1, 100_000.0);

    let hot = crm.open_lead(crm.new, Some(1));
    let cold = crm.open_lead(crm.new, Some(2));
    let scores = engine("country_id")
        .recompute_probabilities(&crm.conn, &LeadSelection::Ids(vec![hot, cold]), true)
        .unwrap();
    for p in scores.values() {
        assert!((0.01..=99.99).contains(p), "out of bounds: {p}");
    }
    assert_eq!(scores[&hot], 99.99);
}

#[test]
fn unscorable_team_leaves_all_its_leads_unscored() {
    let crm = Crm::new();
    let sparse = crm.add_team("Sparse");
    // Team rows exist, but none for the first stage.
    crm.frequency(Some(sparse), "stage_id", &crm.qualified.raw().to_string(), 3.1, 1.1);
    crm.frequency(Some(crm.team), "stage_id", &crm.new.raw().to_string(), 3.1, 1.1);

    let ids: Vec<_> = (0..3)
        .map(|_| {
            crm.insert(NewLead {
                stage_id: Some(crm.new),
                team_id: Some(sparse),
                create_date: CREATED,
                ..Default::default()
            })
        })
        .collect();
    let scored = crm.open_lead(crm.new, None);

    let mut selection = ids.clone();
    selection.push(scored);
    let scores = engine("")
        .recompute_probabilities(&crm.conn, &LeadSelection::Ids(selection), true)
        .unwrap();
    assert!(ids.iter().all(|id| !scores.contains_key(id)));
    assert!(scores.contains_key(&scored));
}

#[test]
fn team_without_rows_falls_back_to_global() {
    let crm = Crm::new();
    let a = crm.add_team("A");
    let b = crm.add_team("B");
    let new = crm.new.raw().to_string();
    crm.frequency(Some(a), "stage_id", &new, 30.0, 10.0);
    crm.frequency(None, "stage_id", &new, 10.0, 30.0);

    let orphan = crm.insert(NewLead {
        stage_id: Some(crm.new),
        team_id: Some(b),
        create_date: CREATED,
        ..Default::default()
    });
    let no_team = crm.insert(NewLead {
        stage_id: Some(crm.new),
        create_date: CREATED,
        ..Default::default()
    });
    let scores = engine("")
        .recompute_probabilities(&crm.conn, &LeadSelection::Ids(vec![orphan, no_team]), true)
        .unwrap();
    // Global: 40 won, 40 lost.
    assert!(approx(scores[&orphan], 50.0));
    // Leads without a team use the no-team rows.
    assert!(approx(scores[&no_team], 25.0));
}

#[test]
fn no_frequency_data_leaves_leads_unscored() {
    let crm = Crm::new();
    let lead = crm.open_lead(crm.new, Some(1));
    let scores = engine("country_id")
        .recompute_probabilities(&crm.conn, &LeadSelection::Ids(vec![lead]), false)
        .unwrap();
    assert!(scores.is_empty());
}

#[test]
fn low_sample_tags_do_not_influence_scores() {
    let crm = Crm::new();
    let team = Some(crm.team);
    crm.frequency(team, "stage_id", &crm.new.raw().to_string(), 40.0, 30.0);
    let rare = insert_tag(&crm.conn, "rare").unwrap();
    let common = insert_tag(&crm.conn, "common").unwrap();
    let other = crm.add_team("Other");
    // 30 + 19 = 49 observations over two teams: below the threshold.
    crm.frequency(team, "tag_id", &rare.raw().to_string(), 25.0, 5.0);
    crm.frequency(Some(other), "tag_id", &rare.raw().to_string(), 10.0, 9.0);
    crm.frequency(team, "tag_id", &common.raw().to_string(), 10.0, 50.0);
    crm.frequency(team, "tag_id", "424242", 30.0, 1.0);
    crm.frequency(Some(other), "tag_id", "424242", 30.0, 1.0);

    let plain = crm.open_lead(crm.new, None);
    let tagged = crm.open_lead(crm.new, None);
    crm.tag(tagged, &[rare]);
    let popular = crm.open_lead(crm.new, None);
    crm.tag(popular, &[common]);

    let engine = engine("tag_ids");
    let selection = LeadSelection::Ids(vec![plain, tagged, popular]);
    let with_rows = engine
        .recompute_probabilities(&crm.conn, &selection, true)
        .unwrap();
    assert_eq!(with_rows[&plain], with_rows[&tagged]);
    assert!(with_rows[&popular] < with_rows[&plain]);

    crm.conn
        .execute(
            "DELETE FROM scoring_frequencies WHERE variable = 'tag_id' AND value = ?1",
            [rare.raw().to_string()],
        )
        .unwrap();
    let without_rows = engine
        .recompute_probabilities(&crm.conn, &selection, true)
        .unwrap();
    assert_eq!(with_rows[&tagged], without_rows[&tagged]);
    assert_eq!(with_rows[&plain], without_rows[&plain]);
}
