//! # work365 Core Library
//!
//! Core logic for the work365 workout interval timer. The CLI binary is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Interval engine**: a tick-driven state machine that sequences
//!   warmup, rounds and sets of work intervals, then cooldown. The caller
//!   delivers one `tick()` per elapsed second.
//! - **Clock driver**: a tokio task that owns the engine, serializes
//!   commands, ticks it in real time and broadcasts events.
//! - **Storage**: TOML configuration and a SQLite key-value store holding
//!   the preset library and last run state.
//!
//! ## Key Components
//!
//! - [`IntervalTimerEngine`]: Core timer state machine
//! - [`PresetLibrary`]: Built-in and user workout programs
//! - [`ClockDriver`]: Real-time driver
//! - [`Database`]: Timer state persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod workout;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use storage::{Config, Database, MemoryStore, PersistedTimer, TimerStore};
pub use workout::{
    ClockDriver, Command, CustomProgram, DriverHandle, IntervalKind, IntervalSpec,
    IntervalTimerEngine, PresetLibrary, TimerPhase, TimerRunState, WorkoutProgram,
};
