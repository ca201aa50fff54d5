mod config;
pub mod database;
mod store;

pub use config::{Config, SoundConfig, TimerConfig};
pub use database::Database;
pub use store::{load_engine, MemoryStore, PersistedTimer, TimerStore};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/work365[-dev]/` based on WORK365_ENV.
///
/// Set WORK365_ENV=dev to use development data directory.
/// WORK365_DATA_DIR overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("WORK365_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WORK365_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("work365-dev")
            } else {
                base_dir.join("work365")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
