//! Integration tests for the real-time clock driver.
//!
//! Tokio's paused clock makes these deterministic: sleeping auto-advances
//! time once every task is idle.

use std::time::Duration;

use work365_core::workout::spawn_clock;
use work365_core::{
    Command, Event, IntervalTimerEngine, MemoryStore, TimerPhase, TimerStore, WorkoutProgram,
};

fn sample() -> WorkoutProgram {
    WorkoutProgram::hiit(
        "Sample",
        2,
        1,
        (5, "Warm Up"),
        (3, "High"),
        (2, "Low"),
        (4, "Cool Down"),
    )
}

#[tokio::test(start_paused = true)]
async fn test_driver_runs_workout_to_completion() {
    let store = MemoryStore::new();
    let (handle, task) = spawn_clock(IntervalTimerEngine::new(), store.clone(), Duration::from_secs(1));
    let mut events = handle.subscribe();

    handle.send(Command::SetWorkoutConfig(sample())).await.unwrap();
    handle.send(Command::Start).await.unwrap();
    tokio::time::sleep(Duration::from_millis(19_500)).await;

    let state = handle.state();
    assert!(!state.running);
    assert_eq!(state.total_seconds_elapsed, 19);

    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        names.push(event.name());
    }
    assert_eq!(names.first(), Some(&"program_loaded"));
    assert_eq!(names.get(1), Some(&"timer_started"));
    assert_eq!(names.last(), Some(&"workout_completed"));
    assert_eq!(names.iter().filter(|n| **n == "round_started").count(), 1);

    handle.send(Command::Shutdown).await.unwrap();
    let engine = task.await.unwrap();
    assert_eq!(engine.phase(), TimerPhase::Complete);
    assert_eq!(store.load().unwrap().map(|r| r.state), Some(engine.state().clone()));
}

#[tokio::test(start_paused = true)]
async fn test_start_between_ticks_credits_full_seconds() {
    let (handle, task) =
        spawn_clock(IntervalTimerEngine::new(), MemoryStore::new(), Duration::from_secs(1));

    handle.send(Command::SetWorkoutConfig(sample())).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.send(Command::Start).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(handle.state().total_seconds_elapsed, 1);

    tokio::time::sleep(Duration::from_millis(3_600)).await;
    assert_eq!(handle.state().total_seconds_elapsed, 5);

    // Resume off the tick boundary as well.
    handle.send(Command::Pause).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_300)).await;
    handle.send(Command::Resume).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_200)).await;
    assert_eq!(handle.state().total_seconds_elapsed, 6);

    drop(handle);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_paused_time_is_not_credited() {
    let (handle, task) =
        spawn_clock(IntervalTimerEngine::new(), MemoryStore::new(), Duration::from_secs(1));

    handle.send(Command::SetWorkoutConfig(sample())).await.unwrap();
    handle.send(Command::Start).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(handle.state().total_seconds_elapsed, 5);

    handle.send(Command::Pause).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    let paused = handle.state();
    assert!(paused.paused);
    assert_eq!(paused.total_seconds_elapsed, 5);

    handle.send(Command::Resume).await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_700)).await;
    assert_eq!(handle.state().total_seconds_elapsed, 8);

    drop(handle);
    let engine = task.await.unwrap();
    assert_eq!(engine.state().total_seconds_elapsed, 8);
}

#[tokio::test(start_paused = true)]
async fn test_commands_are_applied_in_order() {
    let (handle, task) =
        spawn_clock(IntervalTimerEngine::new(), MemoryStore::new(), Duration::from_secs(1));
    let mut events = handle.subscribe();

    handle.send(Command::SetWorkoutConfig(sample())).await.unwrap();
    handle.send(Command::NextInterval).await.unwrap();
    handle.send(Command::NextInterval).await.unwrap();
    handle.send(Command::RemovePreset("Tabata".into())).await.unwrap();
    handle.send(Command::RemovePreset("Tabata".into())).await.unwrap();
    handle.send(Command::Shutdown).await.unwrap();

    let engine = task.await.unwrap();
    assert_eq!(engine.state().current_interval_index, 2);
    assert!(engine.presets().find("Tabata").is_none());

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(received.len(), 4);
    assert!(matches!(received[3], Event::PresetRemoved { removed: 1, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_send_fails_after_shutdown() {
    let (handle, task) =
        spawn_clock(IntervalTimerEngine::new(), MemoryStore::new(), Duration::from_secs(1));
    handle.send(Command::Shutdown).await.unwrap();
    task.await.unwrap();

    assert!(handle.send(Command::Start).await.is_err());
}
