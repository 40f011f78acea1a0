use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;

use crate::model::HabitEntry;
use crate::sync::reconciler::state::{entry_key, PendingDelete, PendingWrite, ReconcilerState, SyncMode};
use crate::sync::reconciler::types::ReconcilerCommand;

pub fn on_level_selected(
    state: &mut ReconcilerState,
    habit_id: String,
    level_id: String,
    date: String,
) -> Vec<ReconcilerCommand> {
    let key = (habit_id.clone(), date.clone());

    match state.visible_entry(&key).cloned() {
        // Same level re-selected: toggle-off deletes the record.
        Some(existing) if existing.level_id == level_id => {
            log::debug!("[RECONCILER] toggle-off {}/{}", habit_id, date);
            state.pending.remove(&key);
            match state.mode {
                SyncMode::LocalOnly => {
                    state.confirmed.remove(&key);
                }
                SyncMode::RemoteSyncing => {
                    // Hide the confirmed copy until the backend delete lands.
                    if state.confirmed.contains_key(&key) {
                        state.pending_deletes.insert(
                            key,
                            PendingDelete {
                                entry: existing.clone(),
                                deleted_at: Instant::now(),
                            },
                        );
                    }
                }
            }
            vec![ReconcilerCommand::DeleteEntry { entry: existing }]
        }

        // Different level: replace in place, keeping the entry id.
        Some(existing) => {
            log::debug!(
                "[RECONCILER] replace {}/{}: {} -> {}",
                habit_id,
                date,
                existing.level_id,
                level_id
            );
            let entry = HabitEntry {
                level_id,
                timestamp: Utc::now(),
                ..existing.clone()
            };
            apply_optimistic(state, entry.clone());
            vec![ReconcilerCommand::SaveEntry {
                entry,
                replaced: Some(existing),
            }]
        }

        // No entry today: create one with the deterministic slot id.
        None => {
            log::debug!("[RECONCILER] add {}/{} level {}", habit_id, date, level_id);
            let entry = HabitEntry::new(habit_id, date, level_id);
            apply_optimistic(state, entry.clone());
            vec![ReconcilerCommand::SaveEntry { entry, replaced: None }]
        }
    }
}

fn apply_optimistic(state: &mut ReconcilerState, entry: HabitEntry) {
    let key = entry_key(&entry);
    match state.mode {
        SyncMode::LocalOnly => {
            state.confirmed.insert(key, entry);
        }
        SyncMode::RemoteSyncing => {
            state.pending.insert(
                key,
                PendingWrite {
                    entry,
                    written_at: Instant::now(),
                },
            );
        }
    }
}

/// Full replacement of confirmed state. Idempotent: the same snapshot twice
/// yields the same visible set.
pub fn on_entries_snapshot(state: &mut ReconcilerState, entries: Vec<HabitEntry>) -> Vec<ReconcilerCommand> {
    log::debug!("[RECONCILER] snapshot with {} entries", entries.len());

    // Deduplicate per slot; the latest write wins.
    let mut confirmed: BTreeMap<_, HabitEntry> = BTreeMap::new();
    for entry in entries {
        let key = entry_key(&entry);
        match confirmed.get(&key) {
            Some(prev) if prev.timestamp >= entry.timestamp => {
                log::warn!("[RECONCILER] duplicate entry for {:?} in snapshot, keeping newest", key);
            }
            _ => {
                confirmed.insert(key, entry);
            }
        }
    }
    state.confirmed = confirmed;

    // Pending writes and tombstones are protected for the grace window only;
    // past it the authoritative snapshot is presumed to have caught up and
    // they age out.
    let grace = state.grace;
    state.pending.retain(|key, p| {
        let keep = p.written_at.elapsed() < grace;
        if !keep {
            log::debug!("[RECONCILER] pending write for {:?} aged out", key);
        }
        keep
    });
    let confirmed = &state.confirmed;
    state
        .pending_deletes
        .retain(|key, d| confirmed.contains_key(key) && d.deleted_at.elapsed() < grace);

    Vec::new()
}

/// Rollback for a failed save: drop the optimistic entry, restore exactly
/// what was visible before it.
pub fn on_write_failed(
    state: &mut ReconcilerState,
    entry: HabitEntry,
    replaced: Option<HabitEntry>,
) -> Vec<ReconcilerCommand> {
    let key = entry_key(&entry);
    log::warn!("[RECONCILER] write failed for {:?}, rolling back", key);

    match state.mode {
        SyncMode::LocalOnly => match replaced {
            Some(prev) => {
                state.confirmed.insert(key, prev);
            }
            None => {
                state.confirmed.remove(&key);
            }
        },
        SyncMode::RemoteSyncing => {
            // Only undo our own write; a newer tap may occupy the slot already.
            let is_ours = state
                .pending
                .get(&key)
                .map(|p| p.entry == entry)
                .unwrap_or(false);
            if is_ours {
                state.pending.remove(&key);
                if let Some(prev) = replaced {
                    // Re-seat the previous value unless confirmed already shows it.
                    if state.confirmed.get(&key) != Some(&prev) {
                        state.pending.insert(
                            key,
                            PendingWrite {
                                entry: prev,
                                written_at: Instant::now(),
                            },
                        );
                    }
                }
            }
        }
    }
    Vec::new()
}

/// Rollback for a failed delete: the entry comes back.
pub fn on_delete_failed(state: &mut ReconcilerState, entry: HabitEntry) -> Vec<ReconcilerCommand> {
    let key = entry_key(&entry);
    log::warn!("[RECONCILER] delete failed for {:?}, restoring entry", key);

    match state.mode {
        SyncMode::LocalOnly => {
            state.confirmed.insert(key, entry);
        }
        SyncMode::RemoteSyncing => {
            state.pending_deletes.remove(&key);
            if !state.confirmed.contains_key(&key) {
                // The deleted entry only ever existed optimistically.
                state.pending.insert(
                    key,
                    PendingWrite {
                        entry,
                        written_at: Instant::now(),
                    },
                );
            }
        }
    }
    Vec::new()
}

/// Cascade: no visible entry may outlive its habit.
pub fn on_habit_deleted(state: &mut ReconcilerState, habit_id: &str) -> Vec<ReconcilerCommand> {
    log::debug!("[RECONCILER] purging entries for deleted habit {}", habit_id);
    state.confirmed.retain(|key, _| key.0 != habit_id);
    state.pending.retain(|key, _| key.0 != habit_id);
    state.pending_deletes.retain(|key, _| key.0 != habit_id);
    Vec::new()
}
