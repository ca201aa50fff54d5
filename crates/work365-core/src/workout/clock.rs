//! Real-time driver for the interval timer engine.
//!
//! One tokio task owns the engine and its store. Commands arrive over an
//! mpsc channel and are applied in order, so the engine never sees
//! concurrent callers. Events go out on a broadcast channel and the latest
//! run state on a watch channel.
//!
//! Ticks are credited from elapsed time rather than counted: a late wakeup
//! delivers every whole interval that passed, and the leftover fraction
//! carries over to the next wakeup. Time spent stopped or paused is never
//! credited.

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::engine::{IntervalTimerEngine, TimerRunState};
use super::program::WorkoutProgram;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::storage::{PersistedTimer, TimerStore};

/// One engine second.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone)]
pub enum Command {
    SetWorkoutConfig(WorkoutProgram),
    Start,
    Pause,
    Resume,
    Toggle,
    Reset,
    NextInterval,
    SkipToNextSet,
    AddPreset(WorkoutProgram),
    RemovePreset(String),
    /// Persist and stop the driver task.
    Shutdown,
}

/// Cloneable handle to a running driver.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
    state: watch::Receiver<TimerRunState>,
}

impl DriverHandle {
    /// Queue a command for the driver.
    ///
    /// # Errors
    /// Returns `CoreError::DriverStopped` once the driver task has exited.
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::DriverStopped)
    }

    /// Receive every event produced from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Latest published run state.
    pub fn state(&self) -> TimerRunState {
        self.state.borrow().clone()
    }

    /// Watch the run state; resolves whenever it changes.
    pub fn watch(&self) -> watch::Receiver<TimerRunState> {
        self.state.clone()
    }
}

pub struct ClockDriver<S> {
    engine: IntervalTimerEngine,
    store: S,
    tick_interval: Duration,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<Event>,
    state: watch::Sender<TimerRunState>,
}

impl<S: TimerStore> ClockDriver<S> {
    pub fn new(engine: IntervalTimerEngine, store: S, tick_interval: Duration) -> (Self, DriverHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        let (state_tx, state_rx) = watch::channel(engine.state().clone());

        let driver = Self {
            engine,
            store,
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            commands: command_rx,
            events: event_tx.clone(),
            state: state_tx,
        };
        let handle = DriverHandle {
            commands: command_tx,
            events: event_tx,
            state: state_rx,
        };
        (driver, handle)
    }

    /// Run until `Command::Shutdown` or until every handle is dropped.
    /// Returns the engine in its final state.
    pub async fn run(mut self) -> IntervalTimerEngine {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut credited = Instant::now();

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command.filter(|c| !matches!(c, Command::Shutdown)) else {
                        debug!("clock driver shutting down");
                        break;
                    };
                    let was_ticking = self.engine.is_ticking();
                    let event = self.apply(command);
                    if !was_ticking && self.engine.is_ticking() {
                        // Realign the ticker so the first second lands one period after start.
                        credited = Instant::now();
                        ticker.reset();
                    }
                    self.publish(event.into_iter().collect());
                }
                _ = ticker.tick() => {
                    let now = Instant::now();
                    if !self.engine.is_ticking() {
                        credited = now;
                        continue;
                    }
                    let whole = now.duration_since(credited).as_nanos() / self.tick_interval.as_nanos();
                    if whole == 0 {
                        continue;
                    }
                    let whole = u32::try_from(whole).unwrap_or(u32::MAX);
                    credited += self.tick_interval * whole;
                    let events = self.engine.advance(u64::from(whole));
                    self.publish(events);
                }
            }
        }

        self.persist();
        self.engine
    }

    fn apply(&mut self, command: Command) -> Option<Event> {
        match command {
            Command::SetWorkoutConfig(program) => self.engine.set_workout_config(program),
            Command::Start => self.engine.start_timer(),
            Command::Pause => self.engine.pause_timer(),
            Command::Resume => self.engine.resume_timer(),
            Command::Toggle => self.engine.toggle(),
            Command::Reset => self.engine.reset_timer(),
            Command::NextInterval => self.engine.next_interval(),
            Command::SkipToNextSet => self.engine.skip_to_next_set(),
            Command::AddPreset(program) => self.engine.add_preset(program),
            Command::RemovePreset(name) => self.engine.remove_preset(&name),
            Command::Shutdown => None,
        }
    }

    fn publish(&self, events: Vec<Event>) {
        let current = self.engine.state();
        let changed = self.state.send_if_modified(|state| {
            if state == current {
                return false;
            }
            *state = current.clone();
            true
        });
        if changed || !events.is_empty() {
            self.persist();
        }
        for event in events {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&PersistedTimer::from_engine(&self.engine)) {
            warn!(error = %e, "failed to persist timer state");
        }
    }
}

/// Spawn a driver on the current tokio runtime.
pub fn spawn_clock<S>(
    engine: IntervalTimerEngine,
    store: S,
    tick_interval: Duration,
) -> (DriverHandle, JoinHandle<IntervalTimerEngine>)
where
    S: TimerStore + Send + 'static,
{
    let (driver, handle) = ClockDriver::new(engine, store, tick_interval);
    (handle, tokio::spawn(driver.run()))
}
