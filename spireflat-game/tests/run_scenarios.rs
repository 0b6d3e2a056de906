use std::collections::HashSet;

use serde_json::{Value, json};
use spireflat_game::{
    FlattenConfig, FloorRecord, NullReporter, RunFlattener, ValidationMode, flatten_batch,
    flatten_run,
};

fn fixture_runs() -> Vec<Value> {
    serde_json::from_str(include_str!("fixtures/runs.json")).unwrap()
}

fn rows_for(records: &[FloorRecord], run_id: i64) -> Vec<&FloorRecord> {
    records.iter().filter(|r| r.labels.run_id == run_id).collect()
}

fn deck_sizes(rows: &[&FloorRecord]) -> Vec<usize> {
    rows.iter().map(|r| r.deck_size().unwrap()).collect()
}

#[test]
fn every_run_expands_to_one_record_per_floor() {
    let runs = fixture_runs();
    let flattener = RunFlattener::default();
    for raw in runs.iter().filter(|r| r["event"]["character_chosen"] != "HERMIT") {
        let floors = flattener.flatten_value(raw).unwrap();
        let reached = raw["event"]["floor_reached"].as_u64().unwrap();
        assert_eq!(floors.len() as u64, reached + 1);
        for (idx, record) in floors.iter().enumerate() {
            assert_eq!(record.floor, idx);
            assert_eq!(record.to_json()["floor"], json!(idx));
        }
    }
}

#[test]
fn unknown_character_is_excluded_while_batch_continues() {
    let runs = fixture_runs();
    let outcome = flatten_batch(&runs, &RunFlattener::default(), &mut NullReporter, 0);
    assert_eq!(outcome.runs_processed, 4);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].index, 1);
    assert!(rows_for(&outcome.records, 1_546_300_900).is_empty());
    assert_eq!(outcome.records.len(), 7 + 3 + 4);
}

#[test]
fn ironclad_starts_with_the_standard_ten_cards() {
    let floors = flatten_run(&json!({"event": {
        "seed_source_timestamp": 5,
        "character_chosen": "IRONCLAD"
    }}))
    .unwrap();
    let deck = floors[0].deck.clone().unwrap();
    assert_eq!(deck.len(), 10);
    assert_eq!(deck.iter().filter(|c| *c == "Strike_R").count(), 5);
    assert_eq!(deck.iter().filter(|c| *c == "Defend_R").count(), 4);
    assert_eq!(deck.iter().filter(|c| *c == "Bash").count(), 1);
}

#[test]
fn path_symbols_describe_entered_and_next_node() {
    let floors = flatten_run(&json!({"event": {
        "seed_source_timestamp": 5,
        "floor_reached": 3,
        "character_chosen": "WATCHER",
        "path_per_floor": ["M", "M", "B"]
    }}))
    .unwrap();
    let pairs: Vec<(Value, Value)> = floors
        .iter()
        .map(|f| {
            let row = f.to_json();
            (row["path_symbol"].clone(), row["next_path_symbol"].clone())
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            (Value::Null, json!("M")),
            (json!("M"), json!("M")),
            (json!("M"), json!("B")),
            (json!("B"), Value::Null),
        ]
    );
}

#[test]
fn defect_pick_carries_forward() {
    let runs = fixture_runs();
    let floors = RunFlattener::default().flatten_value(&runs[2]).unwrap();
    let rows: Vec<&FloorRecord> = floors.iter().collect();
    assert_eq!(deck_sizes(&rows), [10, 11, 11]);

    let floor_one = floors[1].to_json();
    assert_eq!(floor_one["card_picked"], json!("Zap"));
    assert_eq!(floor_one["not_picked_1"], json!("Dualcast"));
    assert!(!floors[0].to_json().contains_key("card_picked"));
}

#[test]
fn purchases_and_purges_are_independent_tracks() {
    let runs = fixture_runs();
    let floors = RunFlattener::default().flatten_value(&runs[0]).unwrap();

    assert_eq!(
        floors[2].items_purchased.as_deref(),
        Some("Potion,Shrug It Off")
    );
    let deck = floors[2].deck.clone().unwrap();
    assert!(!deck.iter().any(|c| c == "Potion" || c == "Shrug It Off"));
    // The Strike_R purge is the only one that hits a card.
    assert_eq!(deck.iter().filter(|c| *c == "Strike_R").count(), 4);
    assert_eq!(floors[1].deck_size(), Some(11));
    assert_eq!(floors[2].deck_size(), Some(10));
}

#[test]
fn full_ironclad_run_replays_deck_and_relics() {
    let runs = fixture_runs();
    let floors = RunFlattener::default().flatten_value(&runs[0]).unwrap();
    let rows: Vec<&FloorRecord> = floors.iter().collect();

    assert_eq!(deck_sizes(&rows), [10, 11, 10, 10, 11, 12, 12]);
    let upgraded = floors[3].deck.clone().unwrap();
    assert_eq!(upgraded.last().map(String::as_str), Some("Inflame+1"));
    assert!(!upgraded.iter().any(|c| c == "Inflame"));

    let relic_counts: Vec<usize> = floors.iter().map(|f| f.num_relics().unwrap()).collect();
    assert_eq!(relic_counts, [1, 2, 2, 2, 3, 4, 4]);
    assert_eq!(
        floors[6].relics.clone().unwrap(),
        ["Burning Blood", "Vajra", "Golden Idol", "Runic Dome"]
    );

    let boss = floors[5].to_json();
    assert_eq!(boss["path_symbol"], json!("B"));
    assert_eq!(boss["combat_enemies"], json!("The Guardian"));
    assert_eq!(boss["combat_damage"], json!(45.0));
    assert_eq!(boss["card_picked"], json!("Demon Form"));
    assert_eq!(boss["not_picked_2"], json!("Impervious"));

    let event = floors[4].to_json();
    assert_eq!(event["event_name"], json!("Golden Idol"));
    assert_eq!(event["event_cards_obtained"], json!(["Injury"]));
    assert_eq!(event["card_picked"], json!("SKIP"));

    assert_eq!(floors[3].to_json()["campfire_action"], json!("SMITH"));
    assert_eq!(floors[6].labels.asc_level, Some(5));
}

#[test]
fn relic_snapshots_never_repeat_a_relic() {
    let runs = fixture_runs();
    let outcome = flatten_batch(&runs, &RunFlattener::default(), &mut NullReporter, 0);
    for record in &outcome.records {
        let relics = record.relics.clone().unwrap();
        let unique: HashSet<&String> = relics.iter().collect();
        assert_eq!(unique.len(), relics.len(), "floor {}", record.floor);
    }
}

#[test]
fn deck_only_shrinks_by_successful_purges() {
    let runs = fixture_runs();
    let outcome = flatten_batch(&runs, &RunFlattener::default(), &mut NullReporter, 0);
    for window in outcome.records.windows(2) {
        let (prev, next) = (&window[0], &window[1]);
        if prev.labels.run_id != next.labels.run_id {
            continue;
        }
        let (before, after) = (prev.deck_size().unwrap(), next.deck_size().unwrap());
        if after < before {
            let run = &runs
                .iter()
                .find(|r| r["event"]["seed_source_timestamp"] == json!(next.labels.run_id))
                .unwrap()["event"];
            let purges = run["items_purged"]
                .as_array()
                .unwrap()
                .iter()
                .zip(run["item_purchase_floors"].as_array().unwrap())
                .filter(|(card, floor)| {
                    floor.as_u64() == Some(next.floor as u64)
                        && prev.deck.as_ref().unwrap().iter().any(|c| c == card.as_str().unwrap())
                })
                .count();
            assert_eq!(before - after, purges);
        }
    }
}

#[test]
fn lenient_mode_keeps_entries_strict_mode_discards() {
    let runs = fixture_runs();
    let strict = RunFlattener::default().flatten_value(&runs[3]).unwrap();
    assert_eq!(strict[1].to_json()["card_picked"], json!("Backflip"));
    assert!(strict[3].card_choice.is_none());

    let lenient = RunFlattener::new(
        FlattenConfig::default().with_validation(ValidationMode::Lenient),
    )
    .flatten_value(&runs[3])
    .unwrap();
    assert_eq!(lenient[3].to_json()["card_picked"], json!("Footwork"));

    // Out-of-range tags never match a floor, so both modes replay the same deck.
    let strict_rows: Vec<&FloorRecord> = strict.iter().collect();
    let lenient_rows: Vec<&FloorRecord> = lenient.iter().collect();
    assert_eq!(deck_sizes(&strict_rows), [12, 13, 13, 14]);
    assert_eq!(deck_sizes(&strict_rows), deck_sizes(&lenient_rows));
}

#[test]
fn untagged_card_choice_drops_deck_but_keeps_rows() {
    let floors = flatten_run(&json!({"event": {
        "seed_source_timestamp": 8,
        "floor_reached": 2,
        "character_chosen": "IRONCLAD",
        "card_choices": [{"picked": "Anger"}, {"floor": 1, "picked": "Cleave"}]
    }}))
    .unwrap();
    assert_eq!(floors.len(), 3);
    assert!(floors.iter().all(|f| f.deck.is_none()));
    assert!(floors.iter().all(|f| f.card_choice.is_none()));
    assert!(floors.iter().all(|f| f.num_relics() == Some(0)));
}
