use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    Warmup,
    High,
    Low,
    Cooldown,
    /// Valid as data; the transition logic never produces it.
    Rest,
}

impl IntervalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalKind::Warmup => "warmup",
            IntervalKind::High => "high",
            IntervalKind::Low => "low",
            IntervalKind::Cooldown => "cooldown",
            IntervalKind::Rest => "rest",
        }
    }

    fn is_bookend(&self) -> bool {
        matches!(self, IntervalKind::Warmup | IntervalKind::Cooldown)
    }
}

impl std::fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSpec {
    pub kind: IntervalKind,
    /// Duration in seconds.
    pub duration_secs: u32,
    pub label: String,
}

impl IntervalSpec {
    pub fn new(kind: IntervalKind, duration_secs: u32, label: impl Into<String>) -> Self {
        Self {
            kind,
            duration_secs,
            label: label.into(),
        }
    }
}

/// A named workout: one warmup, an interior cycle replayed `rounds` times
/// per set and `sets` times overall, then one cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutProgram {
    pub name: String,
    pub rounds: u32,
    pub sets: u32,
    pub intervals: Vec<IntervalSpec>,
}

/// Inputs of the custom workout form, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomProgram {
    #[serde(default = "default_custom_name")]
    pub name: String,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(default = "default_warmup")]
    pub warmup: u32,
    #[serde(default = "default_high")]
    pub high: u32,
    #[serde(default = "default_low")]
    pub low: u32,
    #[serde(default = "default_cooldown")]
    pub cooldown: u32,
}

fn default_custom_name() -> String {
    "Custom Workout".into()
}
fn default_rounds() -> u32 {
    4
}
fn default_sets() -> u32 {
    1
}
fn default_warmup() -> u32 {
    60
}
fn default_high() -> u32 {
    40
}
fn default_low() -> u32 {
    20
}
fn default_cooldown() -> u32 {
    60
}

impl Default for CustomProgram {
    fn default() -> Self {
        Self {
            name: default_custom_name(),
            rounds: default_rounds(),
            sets: default_sets(),
            warmup: default_warmup(),
            high: default_high(),
            low: default_low(),
            cooldown: default_cooldown(),
        }
    }
}

impl WorkoutProgram {
    pub fn new(name: impl Into<String>, rounds: u32, sets: u32, intervals: Vec<IntervalSpec>) -> Self {
        Self {
            name: name.into(),
            rounds,
            sets,
            intervals,
        }
    }

    /// The standard four-slot program: warmup, high, low, cooldown.
    pub fn hiit(
        name: impl Into<String>,
        rounds: u32,
        sets: u32,
        warmup: (u32, &str),
        high: (u32, &str),
        low: (u32, &str),
        cooldown: (u32, &str),
    ) -> Self {
        Self::new(
            name,
            rounds,
            sets,
            vec![
                IntervalSpec::new(IntervalKind::Warmup, warmup.0, warmup.1),
                IntervalSpec::new(IntervalKind::High, high.0, high.1),
                IntervalSpec::new(IntervalKind::Low, low.0, low.1),
                IntervalSpec::new(IntervalKind::Cooldown, cooldown.0, cooldown.1),
            ],
        )
    }

    /// Build a program from the custom form. Zero rounds or sets become 1.
    pub fn custom(form: CustomProgram) -> Self {
        Self::hiit(
            form.name,
            form.rounds.max(1),
            form.sets.max(1),
            (form.warmup, "Warm Up"),
            (form.high, "Work"),
            (form.low, "Rest"),
            (form.cooldown, "Cool Down"),
        )
    }

    /// Check that the program matches the shape the engine sequences by
    /// position: warmup first, cooldown last, work intervals in between.
    ///
    /// # Errors
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rounds == 0 {
            return Err(invalid("rounds", "must be at least 1"));
        }
        if self.sets == 0 {
            return Err(invalid("sets", "must be at least 1"));
        }
        if self.intervals.len() < 3 {
            return Err(ValidationError::TooFewIntervals {
                program: self.name.clone(),
                len: self.intervals.len(),
            });
        }

        let last = self.intervals.len() - 1;
        for (index, interval) in self.intervals.iter().enumerate() {
            let expected = match index {
                0 => Some(IntervalKind::Warmup),
                i if i == last => Some(IntervalKind::Cooldown),
                _ => None,
            };
            let misplaced = match expected {
                Some(kind) => interval.kind != kind,
                None => interval.kind.is_bookend(),
            };
            if misplaced {
                return Err(ValidationError::MisplacedInterval {
                    index,
                    kind: interval.kind.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Interior slots replayed every round.
    pub fn work_intervals(&self) -> &[IntervalSpec] {
        match self.intervals.len() {
            0..=2 => &[],
            n => &self.intervals[1..n - 1],
        }
    }

    /// Total planned seconds: warmup + work × rounds × sets + cooldown.
    ///
    /// Warmup and cooldown are found by kind; everything else counts as work.
    pub fn total_duration_secs(&self) -> u64 {
        let by_kind = |kind: IntervalKind| {
            self.intervals
                .iter()
                .find(|i| i.kind == kind)
                .map(|i| u64::from(i.duration_secs))
                .unwrap_or(0)
        };
        let work: u64 = self
            .intervals
            .iter()
            .filter(|i| !i.kind.is_bookend())
            .map(|i| u64::from(i.duration_secs))
            .sum();
        let cycles = u64::from(self.rounds).saturating_mul(u64::from(self.sets));
        by_kind(IntervalKind::Warmup)
            .saturating_add(work.saturating_mul(cycles))
            .saturating_add(by_kind(IntervalKind::Cooldown))
    }

    pub fn duration_of(&self, index: usize) -> u32 {
        self.intervals.get(index).map(|i| i.duration_secs).unwrap_or(0)
    }
}

fn invalid(field: &str, message: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

/// Render seconds as `MM:SS`; minutes keep growing past 99.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
