//! Preset workout library.
//!
//! Ships with four built-in programs. Users may add programs (duplicate
//! names allowed) and remove them by name, which drops every match.

use serde::{Deserialize, Serialize};

use super::program::WorkoutProgram;

/// Names of the built-in programs, in library order.
pub const BUILTIN_PRESETS: [&str; 4] = [
    "Classic HIIT",
    "Tabata",
    "Endurance Builder",
    "Sprint Intervals",
];

/// Get all built-in programs.
pub fn builtin_presets() -> Vec<WorkoutProgram> {
    vec![
        WorkoutProgram::hiit(
            "Classic HIIT",
            4,
            4,
            (60, "Warm Up"),
            (40, "High Intensity"),
            (20, "Rest"),
            (60, "Cool Down"),
        ),
        WorkoutProgram::hiit(
            "Tabata",
            8,
            1,
            (120, "Warm Up"),
            (20, "Work"),
            (10, "Rest"),
            (120, "Cool Down"),
        ),
        WorkoutProgram::hiit(
            "Endurance Builder",
            3,
            5,
            (180, "Warm Up"),
            (60, "Push"),
            (30, "Recover"),
            (180, "Cool Down"),
        ),
        WorkoutProgram::hiit(
            "Sprint Intervals",
            10,
            1,
            (300, "Warm Up"),
            (30, "Sprint"),
            (90, "Walk/Jog"),
            (300, "Cool Down"),
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetLibrary {
    programs: Vec<WorkoutProgram>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self {
            programs: builtin_presets(),
        }
    }

    pub fn add(&mut self, program: WorkoutProgram) {
        self.programs.push(program);
    }

    /// Remove every program named `name`. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.programs.len();
        self.programs.retain(|p| p.name != name);
        before - self.programs.len()
    }

    /// First program with this name.
    pub fn find(&self, name: &str) -> Option<&WorkoutProgram> {
        self.programs.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkoutProgram> {
        self.programs.iter()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_valid_and_ordered() {
        let lib = PresetLibrary::new();
        let names: Vec<&str> = lib.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, BUILTIN_PRESETS);
        for p in lib.iter() {
            assert!(p.validate().is_ok(), "{} should validate", p.name);
        }
    }

    #[test]
    fn tabata_totals() {
        let lib = PresetLibrary::new();
        let tabata = lib.find("Tabata").unwrap();
        assert_eq!(tabata.rounds, 8);
        assert_eq!(tabata.total_duration_secs(), 120 + 30 * 8 + 120);
    }

    #[test]
    fn add_allows_duplicates_and_remove_drops_all() {
        let mut lib = PresetLibrary::new();
        let extra = lib.find("Tabata").unwrap().clone();
        lib.add(extra.clone());
        lib.add(extra);
        assert_eq!(lib.len(), 6);

        assert_eq!(lib.remove("Tabata"), 3);
        assert_eq!(lib.len(), 3);
        assert!(lib.find("Tabata").is_none());
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut lib = PresetLibrary::new();
        assert_eq!(lib.remove("Nope"), 0);
        assert_eq!(lib.len(), 4);
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut lib = PresetLibrary::new();
        for name in BUILTIN_PRESETS {
            lib.remove(name);
        }
        assert!(lib.is_empty());
        assert_eq!(serde_json::to_string(&lib).unwrap(), "[]");
    }
}
