use crate::model::HabitEntry;

#[derive(Debug, Clone)]
pub enum ReconcilerEvent {
    /// User tapped a level for a habit on a given local calendar day.
    LevelSelected {
        habit_id: String,
        level_id: String,
        date: String,
    },
    /// Authoritative full snapshot from the active backend. Always a complete
    /// replacement, never an incremental merge.
    EntriesSnapshot(Vec<HabitEntry>),
    /// The parent habit is gone; every entry referencing it must go too.
    HabitDeleted { habit_id: String },
    /// Fed back by the driver when a SaveEntry command failed.
    WriteFailed {
        entry: HabitEntry,
        replaced: Option<HabitEntry>,
    },
    /// Fed back by the driver when a DeleteEntry command failed.
    DeleteFailed { entry: HabitEntry },
}

#[derive(Debug, Clone)]
pub enum ReconcilerCommand {
    /// Persist this entry. `replaced` is the previously visible entry for the
    /// same (habit, date) slot; the driver echoes it back on failure so the
    /// rollback is exact.
    SaveEntry {
        entry: HabitEntry,
        replaced: Option<HabitEntry>,
    },
    DeleteEntry { entry: HabitEntry },
}
