use crate::model::{Habit, HabitEntry};
use crate::sync::error::StoreError;

/// On-device persistence. Full scans, no pagination; callers re-load after
/// writes because there is no push channel.
pub trait LocalStore {
    fn habits(&self) -> Result<Vec<Habit>, StoreError>;
    fn entries(&self) -> Result<Vec<HabitEntry>, StoreError>;

    /// Upsert by id.
    fn save_habit(&mut self, habit: &Habit) -> Result<(), StoreError>;
    /// Upsert by id.
    fn save_entry(&mut self, entry: &HabitEntry) -> Result<(), StoreError>;

    /// Cascades: every entry referencing the habit is deleted too.
    fn delete_habit(&mut self, habit_id: &str) -> Result<(), StoreError>;
    fn delete_entry(&mut self, entry_id: &str) -> Result<(), StoreError>;

    /// Wipes all local state (logout / account deletion).
    fn clear_all(&mut self) -> Result<(), StoreError>;
}

/// A full snapshot pushed over the subscription channel. Snapshots are always
/// complete replacements of the collection they describe.
#[derive(Debug, Clone)]
pub enum StorePush {
    Habits(Vec<Habit>),
    Entries(Vec<HabitEntry>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub habits_copied: usize,
    pub entries_copied: usize,
    /// Entries referencing a habit that failed to copy.
    pub entries_skipped: usize,
}

/// Cloud document store scoped by an opaque user id, with a push
/// subscription drained poll-style by the driver loop.
pub trait RemoteStore {
    fn habits(&mut self, user_id: &str) -> Result<Vec<Habit>, StoreError>;
    fn entries(&mut self, user_id: &str) -> Result<Vec<HabitEntry>, StoreError>;

    /// Upsert. Unsaved habits get a backend-assigned id; the saved copy is
    /// returned so the caller can pick it up.
    fn save_habit(&mut self, user_id: &str, habit: &Habit) -> Result<Habit, StoreError>;

    /// Upsert, transactional per (user, habit, date): any existing entry for
    /// that slot is overwritten in place rather than duplicated, even under
    /// concurrent writers.
    fn save_entry(&mut self, user_id: &str, entry: &HabitEntry) -> Result<(), StoreError>;

    /// Cascades entry deletion.
    fn delete_habit(&mut self, user_id: &str, habit_id: &str) -> Result<(), StoreError>;
    fn delete_entry(&mut self, user_id: &str, entry_id: &str) -> Result<(), StoreError>;

    /// Open the push channel for this user. Implementations push an initial
    /// full snapshot and a fresh one after every change.
    fn subscribe(&mut self, user_id: &str);
    fn unsubscribe(&mut self);

    /// Drain the next pushed snapshot, if any.
    fn poll_push(&mut self) -> Option<StorePush>;

    /// One-shot bulk copy of guest data, remapping locally-generated habit
    /// ids to backend ids and rewriting entry foreign keys to match.
    fn migrate_local_data(
        &mut self,
        user_id: &str,
        habits: &[Habit],
        entries: &[HabitEntry],
    ) -> Result<MigrationReport, StoreError>;
}
