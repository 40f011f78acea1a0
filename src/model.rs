use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::error::ValidationError;

/// One graduated completion level within a habit (e.g. "Basic" / "Good" / "Great").
///
/// The id must stay bound to the same level for the habit's whole lifetime;
/// historical entries reference levels by id and would be misattributed if an
/// id were reused for a different level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitLevel {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Ordinal rank within the habit, lowest first.
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    #[default]
    Active,
    Inactive,
    #[serde(rename = "built-in")]
    BuiltIn,
}

/// Whether a record has been acknowledged by its backend yet.
///
/// Carried explicitly on the entity instead of being inferred from the shape
/// of the id string. Records persisted before this field existed are by
/// definition saved, so deserialization defaults to `Saved`; constructors
/// start records as `Unsaved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    Unsaved,
    Saved,
}

impl SaveState {
    fn saved() -> Self {
        SaveState::Saved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Ordered; never empty (enforced by [`validate_habit`]).
    pub levels: Vec<HabitLevel>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: HabitStatus,
    #[serde(default = "SaveState::saved")]
    pub save_state: SaveState,
}

impl Habit {
    /// New unsaved habit with a locally generated id.
    pub fn new(name: impl Into<String>, description: impl Into<String>, levels: Vec<HabitLevel>) -> Self {
        Self {
            id: local_record_id(),
            name: name.into(),
            description: description.into(),
            levels,
            created_at: Utc::now(),
            status: HabitStatus::Active,
            save_state: SaveState::Unsaved,
        }
    }

    pub fn level(&self, level_id: &str) -> Option<&HabitLevel> {
        self.levels.iter().find(|l| l.id == level_id)
    }

    pub fn mark_saved(&mut self) {
        self.save_state = SaveState::Saved;
    }
}

/// A single day's completion record for one habit.
///
/// The steady-state invariant is at most one entry per (habit_id, date);
/// updates replace the level in place and toggling the same level off deletes
/// the record entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    pub id: String,
    pub habit_id: String,
    /// Canonical `YYYY-MM-DD` key in the user's local calendar.
    pub date: String,
    pub level_id: String,
    /// Wall clock of the last write.
    pub timestamp: DateTime<Utc>,
}

impl HabitEntry {
    /// New entry with the deterministic local id for its (habit, date) slot,
    /// so repeated optimistic writes for the same day collapse onto one record.
    pub fn new(habit_id: impl Into<String>, date: impl Into<String>, level_id: impl Into<String>) -> Self {
        let habit_id = habit_id.into();
        let date = date.into();
        Self {
            id: Self::local_id(&habit_id, &date),
            habit_id,
            date,
            level_id: level_id.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn local_id(habit_id: &str, date: &str) -> String {
        format!("{habit_id}@{date}")
    }
}

/// Locally generated record id: creation millis plus a process-wide sequence
/// so rapid successive creations never collide.
fn local_record_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", Utc::now().timestamp_millis(), seq)
}

/// Pre-mutation habit validation.
///
/// Name uniqueness is checked trimmed and case-insensitively against the full
/// existing set (active, inactive and built-in alike), excluding the habit
/// being edited.
pub fn validate_habit(candidate: &Habit, existing: &[Habit]) -> Result<(), ValidationError> {
    let name = candidate.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyHabitName);
    }
    if candidate.levels.is_empty() {
        return Err(ValidationError::NoLevels);
    }

    let lowered = name.to_lowercase();
    for habit in existing {
        if habit.id != candidate.id && habit.name.trim().to_lowercase() == lowered {
            return Err(ValidationError::DuplicateHabitName(habit.name.clone()));
        }
    }
    Ok(())
}
