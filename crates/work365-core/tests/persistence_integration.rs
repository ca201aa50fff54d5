//! Integration tests for restoring timer state from SQLite and config files.

use work365_core::storage::load_engine;
use work365_core::{
    Config, Database, IntervalTimerEngine, PersistedTimer, TimerPhase, TimerStore, WorkoutProgram,
};

#[test]
fn test_run_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("work365.db");

    let expected = {
        let db = Database::open_at(&path).unwrap();
        let mut engine = load_engine(&db);
        assert!(engine.program().is_none());

        let tabata = engine.presets().find("Tabata").cloned().unwrap();
        engine.set_workout_config(tabata);
        engine.start_timer();
        engine.advance(125);
        engine.pause_timer();
        db.save(&PersistedTimer::from_engine(&engine)).unwrap();
        engine.state().clone()
    };

    let db = Database::open_at(&path).unwrap();
    let mut engine = load_engine(&db);
    assert_eq!(engine.state(), &expected);
    assert_eq!(engine.phase(), TimerPhase::Paused);
    assert_eq!(engine.state().current_interval_index, 1);
    assert_eq!(engine.state().seconds_remaining_in_interval, 15);

    engine.resume_timer();
    engine.advance(15);
    assert_eq!(engine.state().current_interval_index, 2);
    assert_eq!(engine.state().total_seconds_elapsed, 140);
}

#[test]
fn test_user_presets_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("work365.db");

    {
        let db = Database::open_at(&path).unwrap();
        let mut engine = IntervalTimerEngine::new();
        engine.add_preset(WorkoutProgram::hiit(
            "Lunch Break",
            3,
            2,
            (30, "Warm Up"),
            (20, "Work"),
            (10, "Rest"),
            (30, "Cool Down"),
        ));
        engine.remove_preset("Classic HIIT");
        db.save(&PersistedTimer::from_engine(&engine)).unwrap();
    }

    let engine = load_engine(&Database::open_at(&path).unwrap());
    let names: Vec<&str> = engine.presets().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        ["Tabata", "Endurance Builder", "Sprint Intervals", "Lunch Break"]
    );
}

#[test]
fn test_corrupt_record_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("work365.db")).unwrap();
    db.kv_set("timer_state", "not json at all").unwrap();

    let engine = load_engine(&db);
    assert_eq!(engine.phase(), TimerPhase::Idle);
    assert_eq!(engine.presets().len(), 4);
}

#[test]
fn test_hand_edited_record_is_clamped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("work365.db")).unwrap();
    let record = serde_json::json!({
        "program": {
            "name": "Edited",
            "rounds": 2,
            "sets": 1,
            "intervals": [
                {"kind": "warmup", "duration_secs": 5, "label": "Warm Up"},
                {"kind": "high", "duration_secs": 3, "label": "High"},
                {"kind": "low", "duration_secs": 2, "label": "Low"},
                {"kind": "cooldown", "duration_secs": 4, "label": "Cool Down"}
            ]
        },
        "running": true,
        "current_round": 7,
        "current_interval_index": 1,
        "seconds_remaining_in_interval": 999,
        "total_seconds_elapsed": 5
    });
    db.kv_set("timer_state", &record.to_string()).unwrap();

    let mut engine = load_engine(&db);
    assert_eq!(engine.state().current_round, 2);
    assert_eq!(engine.state().seconds_remaining_in_interval, 3);

    engine.advance(3);
    assert_eq!(engine.state().current_interval_index, 2);
    assert_eq!(engine.state().total_seconds_elapsed, 8);
}

#[test]
fn test_config_drives_engine_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::load_from(&path).unwrap();
    config.set("timer.warning_threshold_secs", "0").unwrap();
    config.set("custom.rounds", "2").unwrap();
    config.set("custom.high", "5").unwrap();
    config.set("custom.low", "5").unwrap();
    config.save_to(&path).unwrap();

    let config = Config::load_from(&path).unwrap();
    let mut engine =
        IntervalTimerEngine::new().with_warning_threshold(config.timer.warning_threshold_secs);
    engine.set_workout_config(WorkoutProgram::custom(config.custom.clone()));
    engine.start_timer();

    let events = engine.advance(1_000);
    assert_eq!(engine.state().total_seconds_elapsed, 60 + 10 * 2 + 60);
    assert!(events
        .iter()
        .all(|e| !matches!(e, work365_core::Event::LowTimeWarning { .. })));
}
