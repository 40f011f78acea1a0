use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::model::{Habit, HabitEntry, SaveState};
use crate::sync::error::StoreError;
use crate::sync::store::api::{MigrationReport, RemoteStore, StorePush};

/// Pure in-memory remote document store for tests and the demo binary.
///
/// Mimics the behavior that matters to the reconciler: backend-assigned ids,
/// a transactional per-(habit, date) entry upsert, and a push channel that
/// delivers full snapshots, either eagerly after each write or held back to
/// simulate propagation delay.
#[derive(Debug, Default)]
pub struct MockRemoteStore {
    /// Records keyed by (user_id, record_id).
    habits: BTreeMap<(String, String), Habit>,
    entries: BTreeMap<(String, String), HabitEntry>,
    next_id: u64,
    subscribed: Option<String>,
    pushes: VecDeque<StorePush>,
    /// When false, writes succeed but no snapshot is pushed until
    /// [`MockRemoteStore::push_snapshots`] is called (propagation delay).
    pub auto_push: bool,
    pub fail_next_save: bool,
    pub fail_next_delete: bool,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self {
            auto_push: true,
            ..Self::default()
        }
    }

    fn assign_id(&mut self) -> String {
        self.next_id += 1;
        format!("srv-{:04}", self.next_id)
    }

    fn habits_for(&self, user_id: &str) -> Vec<Habit> {
        self.habits
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|(_, h)| h.clone())
            .collect()
    }

    fn entries_for(&self, user_id: &str) -> Vec<HabitEntry> {
        self.entries
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Push fresh snapshots of both collections to the subscriber.
    pub fn push_snapshots(&mut self, user_id: &str) {
        if self.subscribed.as_deref() != Some(user_id) {
            return;
        }
        self.pushes.push_back(StorePush::Habits(self.habits_for(user_id)));
        self.pushes.push_back(StorePush::Entries(self.entries_for(user_id)));
    }

    fn push_after_write(&mut self, user_id: &str) {
        if self.auto_push {
            self.push_snapshots(user_id);
        }
    }
}

impl RemoteStore for MockRemoteStore {
    fn habits(&mut self, user_id: &str) -> Result<Vec<Habit>, StoreError> {
        Ok(self.habits_for(user_id))
    }

    fn entries(&mut self, user_id: &str) -> Result<Vec<HabitEntry>, StoreError> {
        Ok(self.entries_for(user_id))
    }

    fn save_habit(&mut self, user_id: &str, habit: &Habit) -> Result<Habit, StoreError> {
        if self.fail_next_save {
            self.fail_next_save = false;
            return Err(StoreError::WriteFailed("injected save failure".into()));
        }

        let mut saved = habit.clone();
        if saved.save_state == SaveState::Unsaved {
            saved.id = self.assign_id();
            saved.mark_saved();
        }
        self.habits
            .insert((user_id.to_string(), saved.id.clone()), saved.clone());
        self.push_after_write(user_id);
        Ok(saved)
    }

    fn save_entry(&mut self, user_id: &str, entry: &HabitEntry) -> Result<(), StoreError> {
        if self.fail_next_save {
            self.fail_next_save = false;
            return Err(StoreError::WriteFailed("injected save failure".into()));
        }

        // Transactional upsert per (user, habit, date): overwrite any existing
        // entry for the slot in place, keeping its id.
        let existing_id = self
            .entries
            .iter()
            .find(|((user, _), e)| {
                user == user_id && e.habit_id == entry.habit_id && e.date == entry.date
            })
            .map(|((_, id), _)| id.clone());

        let mut saved = entry.clone();
        if let Some(id) = existing_id {
            saved.id = id;
        }
        self.entries
            .insert((user_id.to_string(), saved.id.clone()), saved);
        self.push_after_write(user_id);
        Ok(())
    }

    fn delete_habit(&mut self, user_id: &str, habit_id: &str) -> Result<(), StoreError> {
        if self.fail_next_delete {
            self.fail_next_delete = false;
            return Err(StoreError::WriteFailed("injected delete failure".into()));
        }
        self.habits.remove(&(user_id.to_string(), habit_id.to_string()));
        self.entries
            .retain(|(user, _), e| !(user == user_id && e.habit_id == habit_id));
        self.push_after_write(user_id);
        Ok(())
    }

    fn delete_entry(&mut self, user_id: &str, entry_id: &str) -> Result<(), StoreError> {
        if self.fail_next_delete {
            self.fail_next_delete = false;
            return Err(StoreError::WriteFailed("injected delete failure".into()));
        }
        self.entries.remove(&(user_id.to_string(), entry_id.to_string()));
        self.push_after_write(user_id);
        Ok(())
    }

    fn subscribe(&mut self, user_id: &str) {
        log::debug!("[MOCK] subscribe({user_id})");
        self.subscribed = Some(user_id.to_string());
        // Real-time listeners fire with the current snapshot on attach.
        self.push_snapshots(user_id);
    }

    fn unsubscribe(&mut self) {
        log::debug!("[MOCK] unsubscribe");
        self.subscribed = None;
        self.pushes.clear();
    }

    fn poll_push(&mut self) -> Option<StorePush> {
        self.pushes.pop_front()
    }

    fn migrate_local_data(
        &mut self,
        user_id: &str,
        habits: &[Habit],
        entries: &[HabitEntry],
    ) -> Result<MigrationReport, StoreError> {
        let mut report = MigrationReport::default();
        let mut id_map: HashMap<String, String> = HashMap::new();

        for habit in habits {
            let mut copy = habit.clone();
            copy.id = self.assign_id();
            copy.mark_saved();
            id_map.insert(habit.id.clone(), copy.id.clone());
            self.habits
                .insert((user_id.to_string(), copy.id.clone()), copy);
            report.habits_copied += 1;
        }

        for entry in entries {
            let Some(new_habit_id) = id_map.get(&entry.habit_id) else {
                report.entries_skipped += 1;
                continue;
            };
            let mut copy = entry.clone();
            copy.habit_id = new_habit_id.clone();
            copy.id = HabitEntry::local_id(new_habit_id, &copy.date);
            self.entries
                .insert((user_id.to_string(), copy.id.clone()), copy);
            report.entries_copied += 1;
        }

        self.push_after_write(user_id);
        Ok(report)
    }
}
