use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::{Habit, HabitEntry};
use crate::sync::error::StoreError;
use crate::sync::store::api::LocalStore;

/// On-disk shape of the local store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    habits: Vec<Habit>,
    entries: Vec<HabitEntry>,
}

/// Key-value style local store held in memory and optionally flushed to a
/// JSON file after every write. Tests use the in-memory form.
#[derive(Debug, Default)]
pub struct LocalJsonStore {
    path: Option<PathBuf>,
    habits: BTreeMap<String, Habit>,
    entries: BTreeMap<String, HabitEntry>,
}

impl LocalJsonStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or create) a file-backed store. Records loaded from disk are by
    /// definition saved; the load step marks them so.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut store = Self {
            path: Some(path.clone()),
            ..Self::default()
        };

        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&raw)?;
            log::info!(
                "[LOCAL] loaded {} habits / {} entries from {}",
                file.habits.len(),
                file.entries.len(),
                path.display()
            );
            for mut habit in file.habits {
                habit.mark_saved();
                store.habits.insert(habit.id.clone(), habit);
            }
            for entry in file.entries {
                store.entries.insert(entry.id.clone(), entry);
            }
        }
        Ok(store)
    }

    fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = StoreFile {
            habits: self.habits.values().cloned().collect(),
            entries: self.entries.values().cloned().collect(),
        };
        fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl LocalStore for LocalJsonStore {
    fn habits(&self) -> Result<Vec<Habit>, StoreError> {
        Ok(self.habits.values().cloned().collect())
    }

    fn entries(&self) -> Result<Vec<HabitEntry>, StoreError> {
        Ok(self.entries.values().cloned().collect())
    }

    fn save_habit(&mut self, habit: &Habit) -> Result<(), StoreError> {
        self.habits.insert(habit.id.clone(), habit.clone());
        self.flush()
    }

    fn save_entry(&mut self, entry: &HabitEntry) -> Result<(), StoreError> {
        self.entries.insert(entry.id.clone(), entry.clone());
        self.flush()
    }

    fn delete_habit(&mut self, habit_id: &str) -> Result<(), StoreError> {
        self.habits.remove(habit_id);
        self.entries.retain(|_, e| e.habit_id != habit_id);
        self.flush()
    }

    fn delete_entry(&mut self, entry_id: &str) -> Result<(), StoreError> {
        self.entries.remove(entry_id);
        self.flush()
    }

    fn clear_all(&mut self) -> Result<(), StoreError> {
        self.habits.clear();
        self.entries.clear();
        self.flush()
    }
}
