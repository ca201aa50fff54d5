//! Interval timer engine.
//!
//! The engine is a tick-driven state machine with no internal thread or
//! clock. Each call to `tick()` stands for exactly one elapsed second; the
//! caller (see [`super::clock`]) decides when to deliver them.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Ready -> Running <-> Paused
//!                     |
//!                     v
//!                  Complete -> (reset) -> Ready
//! ```
//!
//! ## Sequencing
//!
//! Transitions are positional: slot 0 is the warmup, the last slot is the
//! cooldown, and the slots in between are replayed once per round and once
//! per set. Interval kinds are never inspected; [`WorkoutProgram::validate`]
//! checks that kinds agree with positions.
//!
//! An interval is left in the same tick that drains it to zero, so a
//! program's total elapsed time equals the sum of its interval durations.
//! An interval that starts at zero seconds is left on the following tick,
//! and that tick does not count toward elapsed time.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::presets::PresetLibrary;
use super::program::{IntervalSpec, WorkoutProgram};
use crate::events::Event;

/// Seconds-remaining threshold at which `LowTimeWarning` fires.
pub const DEFAULT_WARNING_THRESHOLD_SECS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// No program selected.
    Idle,
    /// Program selected, not started (or stopped by reset).
    Ready,
    Running,
    Paused,
    /// Cooldown finished.
    Complete,
}

/// Mutable countdown state. `paused` only matters while `running`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerRunState {
    pub program: Option<WorkoutProgram>,
    pub running: bool,
    pub paused: bool,
    pub current_round: u32,
    pub current_set: u32,
    pub current_interval_index: usize,
    pub seconds_remaining_in_interval: u32,
    pub total_seconds_elapsed: u64,
}

impl Default for TimerRunState {
    fn default() -> Self {
        Self {
            program: None,
            running: false,
            paused: false,
            current_round: 1,
            current_set: 1,
            current_interval_index: 0,
            seconds_remaining_in_interval: 0,
            total_seconds_elapsed: 0,
        }
    }
}

impl TimerRunState {
    fn rewind(&mut self) {
        self.current_round = 1;
        self.current_set = 1;
        self.current_interval_index = 0;
        self.seconds_remaining_in_interval = self
            .program
            .as_ref()
            .map(|p| p.duration_of(0))
            .unwrap_or(0);
        self.total_seconds_elapsed = 0;
        self.running = false;
        self.paused = false;
    }

    /// Pull a restored state back inside the bounds of its program.
    fn clamp_to_program(&mut self) {
        let Some(program) = &self.program else {
            self.rewind();
            return;
        };
        let index = self
            .current_interval_index
            .min(program.intervals.len().saturating_sub(1));
        self.current_interval_index = index;
        self.seconds_remaining_in_interval = self
            .seconds_remaining_in_interval
            .min(program.duration_of(index));
        self.current_round = self.current_round.clamp(1, program.rounds.max(1));
        self.current_set = self.current_set.clamp(1, program.sets.max(1));
        self.paused &= self.running;
    }
}

/// Interval timer engine.
///
/// Owns the active program, its countdown state and the preset library.
/// Every operation is total: commands that make no sense in the current
/// state are no-ops and return `None`.
#[derive(Debug, Clone)]
pub struct IntervalTimerEngine {
    state: TimerRunState,
    presets: PresetLibrary,
    warning_threshold_secs: u32,
}

impl IntervalTimerEngine {
    /// Create an engine with the built-in presets and no program.
    pub fn new() -> Self {
        Self::from_parts(TimerRunState::default(), PresetLibrary::new())
    }

    /// Rebuild an engine from persisted parts. Out-of-range counters are
    /// clamped to the program.
    pub fn from_parts(mut state: TimerRunState, presets: PresetLibrary) -> Self {
        state.clamp_to_program();
        Self {
            state,
            presets,
            warning_threshold_secs: DEFAULT_WARNING_THRESHOLD_SECS,
        }
    }

    /// Set the low-time warning threshold. Zero disables the warning.
    pub fn with_warning_threshold(mut self, secs: u32) -> Self {
        self.warning_threshold_secs = secs;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerRunState {
        &self.state
    }

    pub fn presets(&self) -> &PresetLibrary {
        &self.presets
    }

    pub fn program(&self) -> Option<&WorkoutProgram> {
        self.state.program.as_ref()
    }

    pub fn warning_threshold_secs(&self) -> u32 {
        self.warning_threshold_secs
    }

    pub fn phase(&self) -> TimerPhase {
        let Some(program) = &self.state.program else {
            return TimerPhase::Idle;
        };
        if self.state.running {
            if self.state.paused {
                TimerPhase::Paused
            } else {
                TimerPhase::Running
            }
        } else if self.state.seconds_remaining_in_interval == 0
            && self.state.current_interval_index + 1 >= program.intervals.len()
        {
            TimerPhase::Complete
        } else {
            TimerPhase::Ready
        }
    }

    /// Whether `tick()` would currently advance time.
    pub fn is_ticking(&self) -> bool {
        self.state.running && !self.state.paused && self.state.program.is_some()
    }

    pub fn current_interval(&self) -> Option<&IntervalSpec> {
        self.state
            .program
            .as_ref()?
            .intervals
            .get(self.state.current_interval_index)
    }

    /// 1.0 at the start of an interval, 0.0 when it runs out.
    pub fn interval_progress(&self) -> f64 {
        let total = self.current_interval().map(|i| i.duration_secs).unwrap_or(0);
        if total == 0 {
            return 0.0;
        }
        f64::from(self.state.seconds_remaining_in_interval) / f64::from(total)
    }

    /// 0.0 .. 100.0 progress across the whole workout.
    pub fn workout_progress_pct(&self) -> f64 {
        let total = self
            .state
            .program
            .as_ref()
            .map(|p| p.total_duration_secs())
            .unwrap_or(0);
        if total == 0 {
            return 0.0;
        }
        (self.state.total_seconds_elapsed as f64 / total as f64 * 100.0).min(100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let program = self.state.program.as_ref();
        let interval = self.current_interval();
        Event::StateSnapshot {
            phase: self.phase(),
            program: program.map(|p| p.name.clone()),
            interval_index: self.state.current_interval_index,
            kind: interval.map(|i| i.kind),
            label: interval.map(|i| i.label.clone()).unwrap_or_default(),
            remaining_secs: self.state.seconds_remaining_in_interval,
            interval_secs: interval.map(|i| i.duration_secs).unwrap_or(0),
            round: self.state.current_round,
            rounds: program.map(|p| p.rounds).unwrap_or(0),
            set: self.state.current_set,
            sets: program.map(|p| p.sets).unwrap_or(0),
            total_elapsed_secs: self.state.total_seconds_elapsed,
            total_secs: program.map(|p| p.total_duration_secs()).unwrap_or(0),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the active program and rewind to its first interval.
    ///
    /// Accepts any program, including empty ones: an empty program starts
    /// with zero remaining and finishes on the first tick after start.
    pub fn set_workout_config(&mut self, program: WorkoutProgram) -> Option<Event> {
        info!(
            program = %program.name,
            intervals = program.intervals.len(),
            rounds = program.rounds,
            sets = program.sets,
            "workout program loaded"
        );
        let event = Event::ProgramLoaded {
            name: program.name.clone(),
            interval_count: program.intervals.len(),
            total_secs: program.total_duration_secs(),
            at: Utc::now(),
        };
        self.state.program = Some(program);
        self.state.rewind();
        Some(event)
    }

    pub fn start_timer(&mut self) -> Option<Event> {
        if self.state.program.is_none() || (self.state.running && !self.state.paused) {
            return None;
        }
        self.state.running = true;
        self.state.paused = false;
        debug!(index = self.state.current_interval_index, "timer started");
        Some(Event::TimerStarted {
            interval_index: self.state.current_interval_index,
            remaining_secs: self.state.seconds_remaining_in_interval,
            at: Utc::now(),
        })
    }

    pub fn pause_timer(&mut self) -> Option<Event> {
        if !self.state.running || self.state.paused {
            return None;
        }
        self.state.paused = true;
        debug!(remaining = self.state.seconds_remaining_in_interval, "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: self.state.seconds_remaining_in_interval,
            at: Utc::now(),
        })
    }

    pub fn resume_timer(&mut self) -> Option<Event> {
        if !self.state.running || !self.state.paused {
            return None;
        }
        self.state.paused = false;
        debug!(remaining = self.state.seconds_remaining_in_interval, "timer resumed");
        Some(Event::TimerResumed {
            remaining_secs: self.state.seconds_remaining_in_interval,
            at: Utc::now(),
        })
    }

    /// Play/pause button: start when stopped, resume when paused, else pause.
    pub fn toggle(&mut self) -> Option<Event> {
        if !self.state.running {
            self.start_timer()
        } else if self.state.paused {
            self.resume_timer()
        } else {
            self.pause_timer()
        }
    }

    pub fn reset_timer(&mut self) -> Option<Event> {
        self.state.program.as_ref()?;
        self.state.rewind();
        debug!("timer reset");
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Advance time by one second.
    ///
    /// Returns the transition event when an interval ends, or a
    /// `LowTimeWarning` while the remaining time is at or below the
    /// threshold.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_ticking() {
            return None;
        }
        if self.state.seconds_remaining_in_interval == 0 {
            return self.next_interval();
        }

        self.state.seconds_remaining_in_interval -= 1;
        self.state.total_seconds_elapsed += 1;

        let remaining = self.state.seconds_remaining_in_interval;
        if remaining == 0 {
            self.next_interval()
        } else if remaining <= self.warning_threshold_secs {
            Some(Event::LowTimeWarning {
                interval_index: self.state.current_interval_index,
                remaining_secs: remaining,
                at: Utc::now(),
            })
        } else {
            None
        }
    }

    /// Apply `seconds` ticks, stopping early once the timer stops.
    pub fn advance(&mut self, seconds: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..seconds {
            if !self.is_ticking() {
                break;
            }
            events.extend(self.tick());
        }
        events
    }

    /// Move to the next interval, round, set, cooldown, or completion.
    pub fn next_interval(&mut self) -> Option<Event> {
        let program = self.state.program.as_ref()?;
        let len = program.intervals.len();
        let rounds = program.rounds;
        let sets = program.sets;
        let index = self.state.current_interval_index;

        if index == 0 {
            if len <= 1 {
                return Some(self.finish());
            }
            self.load_interval(1);
            return self.interval_started();
        }

        let last = len - 1;
        if index >= last {
            return Some(self.finish());
        }

        let next = index + 1;
        if next < last {
            self.load_interval(next);
            self.interval_started()
        } else if self.state.current_round < rounds {
            self.state.current_round += 1;
            self.load_interval(1);
            debug!(round = self.state.current_round, set = self.state.current_set, "round started");
            Some(Event::RoundStarted {
                round: self.state.current_round,
                set: self.state.current_set,
                duration_secs: self.state.seconds_remaining_in_interval,
                at: Utc::now(),
            })
        } else if self.state.current_set < sets {
            self.begin_next_set()
        } else {
            self.load_interval(last);
            debug!("cooldown started");
            self.interval_started()
        }
    }

    /// Jump to the first work interval of the next set, skipping the rest
    /// of the current set. No-op on the last set.
    pub fn skip_to_next_set(&mut self) -> Option<Event> {
        let program = self.state.program.as_ref()?;
        if self.state.current_set >= program.sets || program.intervals.len() < 2 {
            return None;
        }
        self.begin_next_set()
    }

    pub fn add_preset(&mut self, program: WorkoutProgram) -> Option<Event> {
        let name = program.name.clone();
        self.presets.add(program);
        debug!(preset = %name, "preset added");
        Some(Event::PresetAdded {
            name,
            at: Utc::now(),
        })
    }

    /// Remove every preset with this name.
    pub fn remove_preset(&mut self, name: &str) -> Option<Event> {
        let removed = self.presets.remove(name);
        if removed == 0 {
            return None;
        }
        debug!(preset = name, removed, "preset removed");
        Some(Event::PresetRemoved {
            name: name.to_string(),
            removed,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn load_interval(&mut self, index: usize) {
        self.state.current_interval_index = index;
        self.state.seconds_remaining_in_interval = self
            .state
            .program
            .as_ref()
            .map(|p| p.duration_of(index))
            .unwrap_or(0);
    }

    fn begin_next_set(&mut self) -> Option<Event> {
        self.state.current_set += 1;
        self.state.current_round = 1;
        self.load_interval(1);
        debug!(set = self.state.current_set, "set started");
        Some(Event::SetStarted {
            set: self.state.current_set,
            duration_secs: self.state.seconds_remaining_in_interval,
            at: Utc::now(),
        })
    }

    fn interval_started(&self) -> Option<Event> {
        let interval = self.current_interval()?;
        debug!(
            index = self.state.current_interval_index,
            kind = %interval.kind,
            "interval started"
        );
        Some(Event::IntervalStarted {
            interval_index: self.state.current_interval_index,
            kind: interval.kind,
            label: interval.label.clone(),
            duration_secs: interval.duration_secs,
            round: self.state.current_round,
            set: self.state.current_set,
            at: Utc::now(),
        })
    }

    fn finish(&mut self) -> Event {
        let len = self
            .state
            .program
            .as_ref()
            .map(|p| p.intervals.len())
            .unwrap_or(0);
        self.state.running = false;
        self.state.paused = false;
        self.state.current_interval_index = len.saturating_sub(1);
        self.state.seconds_remaining_in_interval = 0;

        let name = self
            .state
            .program
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        info!(
            program = %name,
            elapsed = self.state.total_seconds_elapsed,
            "workout completed"
        );
        Event::WorkoutCompleted {
            name,
            total_elapsed_secs: self.state.total_seconds_elapsed,
            at: Utc::now(),
        }
    }
}

impl Default for IntervalTimerEngine {
    fn default() -> Self {
        Self::new()
    }
}
