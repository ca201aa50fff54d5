mod clock;
mod engine;
mod presets;
mod program;

pub use clock::{spawn_clock, ClockDriver, Command, DriverHandle, DEFAULT_TICK_INTERVAL};
pub use engine::{IntervalTimerEngine, TimerPhase, TimerRunState, DEFAULT_WARNING_THRESHOLD_SECS};
pub use presets::{builtin_presets, PresetLibrary, BUILTIN_PRESETS};
pub use program::{format_clock, CustomProgram, IntervalKind, IntervalSpec, WorkoutProgram};
