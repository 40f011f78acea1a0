//! Entry reconciliation state machine.
//!
//! This is the **functional core** of the sync logic:
//! - **Input**: [`ReconcilerEvent`] (user taps, backend snapshots, failure feedback).
//! - **Output**: `Vec<ReconcilerCommand>` (persistence side effects for the driver).
//!
//! # Architecture guarantees
//! * **No IO**: this module never touches storage or the network.
//! * **No async**: all transitions are plain function calls on one thread.
//! * **Deterministic up to the grace window**: transitions depend only on the
//!   state and the event, except that pending writes and tombstones are aged
//!   against the wall clock when a snapshot is applied.

pub mod state;
mod logic;
pub mod types;


pub use types::{ReconcilerCommand, ReconcilerEvent};

use std::collections::BTreeMap;
use std::time::Duration;

use crate::model::HabitEntry;

use state::{ReconcilerState, SyncMode};

/// Default protection window for optimistic writes racing a snapshot push.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Merges locally-optimistic writes with authoritative backend snapshots into
/// one consistent visible entry set.
#[derive(Debug)]
pub struct Reconciler {
    state: ReconcilerState,
}

impl Reconciler {
    pub fn new(mode: SyncMode) -> Self {
        Self {
            state: ReconcilerState {
                mode,
                grace: DEFAULT_GRACE,
                confirmed: BTreeMap::new(),
                pending: BTreeMap::new(),
                pending_deletes: BTreeMap::new(),
            },
        }
    }

    /// Override the grace window (tests use zero to force immediate aging).
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.state.grace = grace;
        self
    }

    /// The main event handler: consumes an event, mutates the merged view,
    /// and returns the side effects the driver must execute.
    pub fn handle_event(&mut self, event: ReconcilerEvent) -> Vec<ReconcilerCommand> {
        match event {
            ReconcilerEvent::LevelSelected {
                habit_id,
                level_id,
                date,
            } => logic::on_level_selected(&mut self.state, habit_id, level_id, date),
            ReconcilerEvent::EntriesSnapshot(entries) => logic::on_entries_snapshot(&mut self.state, entries),
            ReconcilerEvent::HabitDeleted { habit_id } => logic::on_habit_deleted(&mut self.state, &habit_id),
            ReconcilerEvent::WriteFailed { entry, replaced } => {
                logic::on_write_failed(&mut self.state, entry, replaced)
            }
            ReconcilerEvent::DeleteFailed { entry } => logic::on_delete_failed(&mut self.state, entry),
        }
    }

    pub fn visible_entries(&self) -> Vec<HabitEntry> {
        self.state.visible_entries()
    }

    pub fn visible_entry(&self, habit_id: &str, date: &str) -> Option<HabitEntry> {
        self.state
            .visible_entry(&(habit_id.to_string(), date.to_string()))
            .cloned()
    }

    pub fn mode(&self) -> SyncMode {
        self.state.mode
    }

    /// Direct state access for tests that need to inspect pending sets.
    #[cfg(test)]
    pub(crate) fn state(&self) -> &ReconcilerState {
        &self.state
    }
}
