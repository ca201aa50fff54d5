use clap::{Args, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use work365_core::storage::{load_engine, SoundConfig};
use work365_core::workout::spawn_clock;
use work365_core::{
    Command, Config, CustomProgram, Database, Event, IntervalTimerEngine, PersistedTimer,
    TimerStore, WorkoutProgram,
};

use super::print_json;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Select a preset by name
    Load {
        /// Preset name
        name: String,
    },
    /// Select a custom program; omitted values come from the [custom] config section
    Custom(CustomArgs),
    /// Start the timer, selecting the default preset if none is loaded
    Start,
    /// Pause the timer
    Pause,
    /// Resume a paused timer
    Resume,
    /// Start, pause or resume, like a play button
    Toggle,
    /// Rewind to the first interval
    Reset,
    /// Skip to the next interval
    Next,
    /// Skip to the first work interval of the next set
    NextSet,
    /// Deliver ticks by hand and print the resulting events
    Tick {
        /// Number of one-second ticks
        #[arg(long, default_value = "1")]
        count: u64,
    },
    /// Run the timer in the foreground until the workout completes (Ctrl-C pauses)
    Run,
}

#[derive(Args)]
pub struct CustomArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    rounds: Option<u32>,
    #[arg(long)]
    sets: Option<u32>,
    /// Warmup seconds
    #[arg(long)]
    warmup: Option<u32>,
    /// High-intensity seconds
    #[arg(long)]
    high: Option<u32>,
    /// Low-intensity seconds
    #[arg(long)]
    low: Option<u32>,
    /// Cooldown seconds
    #[arg(long)]
    cooldown: Option<u32>,
}

impl CustomArgs {
    fn over(self, mut form: CustomProgram) -> CustomProgram {
        if let Some(name) = self.name {
            form.name = name;
        }
        form.rounds = self.rounds.unwrap_or(form.rounds);
        form.sets = self.sets.unwrap_or(form.sets);
        form.warmup = self.warmup.unwrap_or(form.warmup);
        form.high = self.high.unwrap_or(form.high);
        form.low = self.low.unwrap_or(form.low);
        form.cooldown = self.cooldown.unwrap_or(form.cooldown);
        form
    }
}

/// Print the event a command produced, or the current state if it was a no-op.
fn emit(event: Option<Event>, engine: &IntervalTimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => print_json(&event),
        None => print_json(&engine.snapshot()),
    }
}

fn find_preset(engine: &IntervalTimerEngine, name: &str) -> Result<WorkoutProgram, String> {
    engine
        .presets()
        .find(name)
        .cloned()
        .ok_or_else(|| format!("unknown preset: {name}"))
}

fn ensure_program(engine: &mut IntervalTimerEngine, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if engine.program().is_some() {
        return Ok(());
    }
    let program = find_preset(engine, &config.timer.default_preset)?;
    if let Some(event) = engine.set_workout_config(program) {
        print_json(&event)?;
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let mut engine = load_engine(&db).with_warning_threshold(config.timer.warning_threshold_secs);

    match action {
        TimerAction::Run => return run_live(engine, db, &config),
        TimerAction::Status => print_json(&engine.snapshot())?,
        TimerAction::Load { name } => {
            let program = find_preset(&engine, &name)?;
            emit(engine.set_workout_config(program), &engine)?;
        }
        TimerAction::Custom(args) => {
            let program = WorkoutProgram::custom(args.over(config.custom.clone()));
            program.validate()?;
            emit(engine.set_workout_config(program), &engine)?;
        }
        TimerAction::Start => {
            ensure_program(&mut engine, &config)?;
            emit(engine.start_timer(), &engine)?;
        }
        TimerAction::Pause => emit(engine.pause_timer(), &engine)?,
        TimerAction::Resume => emit(engine.resume_timer(), &engine)?,
        TimerAction::Toggle => emit(engine.toggle(), &engine)?,
        TimerAction::Reset => emit(engine.reset_timer(), &engine)?,
        TimerAction::Next => emit(engine.next_interval(), &engine)?,
        TimerAction::NextSet => emit(engine.skip_to_next_set(), &engine)?,
        TimerAction::Tick { count } => {
            for event in engine.advance(count) {
                print_json(&event)?;
            }
            print_json(&engine.snapshot())?;
        }
    }

    db.save(&PersistedTimer::from_engine(&engine))?;
    Ok(())
}

fn run_live(
    mut engine: IntervalTimerEngine,
    db: Database,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_program(&mut engine, config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(engine, db, config))
}

async fn drive(
    engine: IntervalTimerEngine,
    db: Database,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let (handle, task) = spawn_clock(engine, db, config.tick_interval());
    let mut events = handle.subscribe();
    handle.send(Command::Start).await?;

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    cue(&event, &config.sound);
                    println!("{}", serde_json::to_string(&event)?);
                    if matches!(event, Event::WorkoutCompleted { .. }) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
            _ = &mut interrupted => {
                info!("interrupted, pausing timer");
                handle.send(Command::Pause).await?;
                break;
            }
        }
    }

    handle.send(Command::Shutdown).await?;
    let engine = task.await?;
    print_json(&engine.snapshot())?;
    Ok(())
}

/// Ring the terminal bell for cue-worthy events.
fn cue(event: &Event, sound: &SoundConfig) {
    if !sound.enabled {
        return;
    }
    let pitch_hz = match event {
        Event::LowTimeWarning { .. } => sound.warning_pitch_hz,
        Event::IntervalStarted { .. }
        | Event::RoundStarted { .. }
        | Event::SetStarted { .. }
        | Event::WorkoutCompleted { .. } => sound.tick_pitch_hz,
        _ => return,
    };
    debug!(pitch_hz, event = event.name(), "sound cue");
    eprint!("\x07");
}
