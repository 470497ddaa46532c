use std::fs;

use chrono::{TimeZone, Utc};

use simfut_terminal::config::MatchConfig;
use simfut_terminal::history::{History, HistoryRecord, MAX_HISTORY};
use simfut_terminal::persist::{self, FileStore, HISTORY_KEY, KvStore, MemoryStore};
use simfut_terminal::ratings::ClimateId;
use simfut_terminal::rng::RngSource;
use simfut_terminal::simulate_match;
use simfut_terminal::state::AppState;

fn played(n: u64) -> HistoryRecord {
    let cfg = MatchConfig::for_teams("Cobresal", "Huachipato");
    let res = simulate_match(&cfg, &mut RngSource::seeded(n)).unwrap();
    let ts = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap() + chrono::Duration::minutes(n as i64);
    HistoryRecord::from_result(&res, ts)
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");

    let cfg = MatchConfig {
        climate: ClimateId::Viento,
        extra_time: true,
        ..MatchConfig::for_teams("Colo-Colo", "Palestino")
    };
    {
        let mut store = FileStore::open(&path);
        persist::save_config(&mut store, &cfg).unwrap();
        persist::append_history(&mut store, played(1)).unwrap();
        persist::append_history(&mut store, played(2)).unwrap();
    }
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let store = FileStore::open(&path);
    assert_eq!(persist::load_config(&store), Some(cfg));
    let history = persist::load_history(&store);
    assert_eq!(history.len(), 2);
    assert_eq!(history.get(0), Some(&played(2)));
}

#[test]
fn corrupt_store_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    fs::write(&path, "{ this is not json").unwrap();

    let mut store = FileStore::open(&path);
    assert!(persist::load_config(&store).is_none());
    assert!(persist::load_history(&store).is_empty());

    // The next write replaces the broken file.
    persist::append_history(&mut store, played(3)).unwrap();
    let reopened = FileStore::open(&path);
    assert_eq!(persist::load_history(&reopened).len(), 1);
}

#[test]
fn stale_version_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    fs::write(
        &path,
        r#"{"version":0,"entries":{"sim-form":"{\"home_team\":\"X\"}"}}"#,
    )
    .unwrap();
    let store = FileStore::open(&path);
    assert!(persist::load_config(&store).is_none());
}

#[test]
fn partial_form_fills_defaults() {
    let mut store = MemoryStore::new();
    store
        .set(
            persist::CONFIG_KEY,
            r#"{"home_team":"Cobresal","away_team":"Palestino","climate":"calor"}"#.to_string(),
        )
        .unwrap();
    let cfg = persist::load_config(&store).unwrap();
    assert_eq!(cfg.home_team, "Cobresal");
    assert_eq!(cfg.climate, ClimateId::Calor);
    assert_eq!(cfg.duration_minutes, MatchConfig::default().duration_minutes);
}

#[test]
fn stored_history_is_capped_newest_first() {
    let mut store = MemoryStore::new();
    let base = played(0);
    let mut history = History::new();
    for n in 0..(MAX_HISTORY + 10) {
        let mut record = base.clone();
        record.home_team = format!("Team {n}");
        history.push(record);
    }
    persist::save_history(&mut store, &history).unwrap();

    let loaded = persist::load_history(&store);
    assert_eq!(loaded.len(), MAX_HISTORY);
    assert_eq!(loaded.get(0).unwrap().home_team, format!("Team {}", MAX_HISTORY + 9));

    let next = persist::append_history(&mut store, base.clone()).unwrap();
    assert_eq!(next.len(), MAX_HISTORY);
    assert_eq!(next.get(0), Some(&base));
}

#[test]
fn records_without_outcome_still_load() {
    let mut store = MemoryStore::new();
    let mut value = serde_json::to_value(vec![played(4)]).unwrap();
    value[0].as_object_mut().unwrap().remove("outcome");
    store.set(HISTORY_KEY, value.to_string()).unwrap();
    let history = persist::load_history(&store);
    assert_eq!(history.len(), 1);
    assert!(history.get(0).unwrap().outcome.is_none());
}

#[test]
fn clear_history_removes_the_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path().join("store.json"));
    persist::append_history(&mut store, played(5)).unwrap();
    persist::clear_history(&mut store).unwrap();
    assert!(store.get(HISTORY_KEY).is_none());
    assert!(persist::load_history(&FileStore::open(store.path())).is_empty());
}

#[test]
fn state_round_trips_through_store() {
    let mut store = MemoryStore::new();
    let mut state = AppState::new();
    state.form = MatchConfig::for_teams("Audax Italiano", "O'Higgins");
    state.history.push(played(6));
    persist::save_from_state(&state, &mut store).unwrap();

    let mut fresh = AppState::new();
    persist::load_into_state(&mut fresh, &store);
    assert_eq!(fresh.form, state.form);
    assert_eq!(fresh.history, state.history);
}
