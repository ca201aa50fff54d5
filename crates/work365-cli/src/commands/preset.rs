use clap::Subcommand;
use std::path::PathBuf;
use work365_core::storage::load_engine;
use work365_core::workout::format_clock;
use work365_core::{Database, PersistedTimer, TimerStore, WorkoutProgram};

use super::print_json;

#[derive(Subcommand)]
pub enum PresetAction {
    /// List presets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one preset as JSON
    Show {
        /// Preset name
        name: String,
    },
    /// Add a preset from a JSON file
    Add {
        /// Path to a program JSON file
        #[arg(long)]
        file: PathBuf,
    },
    /// Remove every preset with this name
    Remove {
        /// Preset name
        name: String,
    },
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut engine = load_engine(&db);

    match action {
        PresetAction::List { json } => {
            if json {
                print_json(engine.presets())?;
            } else if engine.presets().is_empty() {
                println!("No presets.");
            } else {
                for preset in engine.presets().iter() {
                    println!(
                        "{:<20} {:>2} rounds x {:>2} sets  {}",
                        preset.name,
                        preset.rounds,
                        preset.sets,
                        format_clock(preset.total_duration_secs())
                    );
                }
            }
            return Ok(());
        }
        PresetAction::Show { name } => {
            let preset = engine
                .presets()
                .find(&name)
                .ok_or_else(|| format!("unknown preset: {name}"))?;
            print_json(preset)?;
            return Ok(());
        }
        PresetAction::Add { file } => {
            let content = std::fs::read_to_string(&file)?;
            let program: WorkoutProgram = serde_json::from_str(&content)?;
            program.validate()?;
            if let Some(event) = engine.add_preset(program) {
                print_json(&event)?;
            }
        }
        PresetAction::Remove { name } => {
            let event = engine
                .remove_preset(&name)
                .ok_or_else(|| format!("unknown preset: {name}"))?;
            print_json(&event)?;
        }
    }

    db.save(&PersistedTimer::from_engine(&engine))?;
    Ok(())
}
