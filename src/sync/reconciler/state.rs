use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::model::HabitEntry;

/// The at-most-one-per-day slot an entry occupies.
pub type EntryKey = (String, String);

pub fn entry_key(entry: &HabitEntry) -> EntryKey {
    (entry.habit_id.clone(), entry.date.clone())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Writes are synchronous-equivalent; confirmed state is updated directly
    /// and no pending bookkeeping is needed.
    LocalOnly,
    /// Writes are fire-and-forget; confirmation arrives via snapshot pushes.
    RemoteSyncing,
}

/// An optimistic write awaiting backend confirmation. `written_at` makes the
/// grace-window policy auditable instead of an ad hoc boolean.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub entry: HabitEntry,
    pub written_at: Instant,
}

/// An optimistic delete hiding a confirmed entry until the backend converges.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub entry: HabitEntry,
    pub deleted_at: Instant,
}

#[derive(Debug)]
pub struct ReconcilerState {
    pub mode: SyncMode,
    /// How long a pending write/delete is protected from being dropped by a
    /// stale snapshot. A bounded heuristic against flicker, not a guarantee.
    pub grace: Duration,
    /// Last known-good snapshot from the active backend, one entry per slot.
    pub confirmed: BTreeMap<EntryKey, HabitEntry>,
    pub pending: BTreeMap<EntryKey, PendingWrite>,
    pub pending_deletes: BTreeMap<EntryKey, PendingDelete>,
}

impl ReconcilerState {
    /// What the UI should show for one slot: pending wins (latest local
    /// intent), a tombstoned slot shows nothing, otherwise confirmed.
    pub fn visible_entry(&self, key: &EntryKey) -> Option<&HabitEntry> {
        if let Some(pending) = self.pending.get(key) {
            return Some(&pending.entry);
        }
        if self.pending_deletes.contains_key(key) {
            return None;
        }
        self.confirmed.get(key)
    }

    /// The merged view, sorted by (habit, date) for determinism.
    pub fn visible_entries(&self) -> Vec<HabitEntry> {
        let mut out: Vec<HabitEntry> = self
            .confirmed
            .iter()
            .filter(|(key, _)| !self.pending.contains_key(*key) && !self.pending_deletes.contains_key(*key))
            .map(|(_, entry)| entry.clone())
            .collect();
        out.extend(self.pending.values().map(|p| p.entry.clone()));
        out.sort_by(|a, b| (&a.habit_id, &a.date).cmp(&(&b.habit_id, &b.date)));
        out
    }
}
