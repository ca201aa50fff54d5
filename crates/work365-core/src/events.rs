use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workout::{IntervalKind, TimerPhase};

/// Every state change in the engine produces an Event.
/// The CLI prints them; the clock driver broadcasts them to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ProgramLoaded {
        name: String,
        interval_count: usize,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        interval_index: usize,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// Moved to another interval inside the current round, out of warmup,
    /// or into cooldown.
    IntervalStarted {
        interval_index: usize,
        kind: IntervalKind,
        label: String,
        duration_secs: u32,
        round: u32,
        set: u32,
        at: DateTime<Utc>,
    },
    RoundStarted {
        round: u32,
        set: u32,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// A new set began, either by finishing the last round or by skipping.
    SetStarted {
        set: u32,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    WorkoutCompleted {
        name: String,
        total_elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// Remaining time in the interval dropped to the warning threshold.
    LowTimeWarning {
        interval_index: usize,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    PresetAdded {
        name: String,
        at: DateTime<Utc>,
    },
    PresetRemoved {
        name: String,
        removed: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: TimerPhase,
        program: Option<String>,
        interval_index: usize,
        kind: Option<IntervalKind>,
        label: String,
        remaining_secs: u32,
        interval_secs: u32,
        round: u32,
        rounds: u32,
        set: u32,
        sets: u32,
        total_elapsed_secs: u64,
        total_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Stable name of the variant, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::ProgramLoaded { .. } => "program_loaded",
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerResumed { .. } => "timer_resumed",
            Event::TimerReset { .. } => "timer_reset",
            Event::IntervalStarted { .. } => "interval_started",
            Event::RoundStarted { .. } => "round_started",
            Event::SetStarted { .. } => "set_started",
            Event::WorkoutCompleted { .. } => "workout_completed",
            Event::LowTimeWarning { .. } => "low_time_warning",
            Event::PresetAdded { .. } => "preset_added",
            Event::PresetRemoved { .. } => "preset_removed",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
