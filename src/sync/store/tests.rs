#![cfg(test)]
use crate::model::{Habit, HabitEntry, HabitLevel, SaveState};
use crate::sync::error::StoreError;
use crate::sync::store::api::{LocalStore, RemoteStore, StorePush};
use crate::sync::store::{LocalJsonStore, MockRemoteStore, Session, StoreFacade};

// =========================================================================
// Helpers
// =========================================================================

fn habit(name: &str) -> Habit {
    Habit::new(
        name,
        "",
        vec![
            HabitLevel { id: "l1".into(), name: "Basic".into(), description: "".into(), value: 1 },
            HabitLevel { id: "l2".into(), name: "Good".into(), description: "".into(), value: 2 },
        ],
    )
}

fn entry(habit_id: &str, date: &str, level_id: &str) -> HabitEntry {
    HabitEntry::new(habit_id, date, level_id)
}

/// Local store whose reads fail, as with a corrupt or unreadable file.
struct BrokenLocalStore;

impl LocalStore for BrokenLocalStore {
    fn habits(&self) -> Result<Vec<Habit>, StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk read failed",
        )))
    }

    fn entries(&self) -> Result<Vec<HabitEntry>, StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk read failed",
        )))
    }

    fn save_habit(&mut self, _habit: &Habit) -> Result<(), StoreError> {
        Ok(())
    }

    fn save_entry(&mut self, _entry: &HabitEntry) -> Result<(), StoreError> {
        Ok(())
    }

    fn delete_habit(&mut self, _habit_id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn delete_entry(&mut self, _entry_id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn clear_all(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn drain_entries(store: &mut MockRemoteStore) -> Option<Vec<HabitEntry>> {
    let mut last = None;
    while let Some(push) = store.poll_push() {
        if let StorePush::Entries(entries) = push {
            last = Some(entries);
        }
    }
    last
}

// =========================================================================
// LocalJsonStore
// =========================================================================

#[test]
fn local_store_upserts_by_id() {
    let mut store = LocalJsonStore::in_memory();
    let mut h = habit("Reading");
    store.save_habit(&h).unwrap();
    h.description = "updated".into();
    store.save_habit(&h).unwrap();

    let habits = store.habits().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].description, "updated");
}

#[test]
fn local_delete_habit_cascades_to_entries() {
    let mut store = LocalJsonStore::in_memory();
    let h = habit("Reading");
    store.save_habit(&h).unwrap();
    store.save_entry(&entry(&h.id, "2024-01-01", "l1")).unwrap();
    store.save_entry(&entry(&h.id, "2024-01-02", "l1")).unwrap();
    store.save_entry(&entry("other", "2024-01-01", "l1")).unwrap();

    store.delete_habit(&h.id).unwrap();

    assert!(store.habits().unwrap().is_empty());
    let remaining = store.entries().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].habit_id, "other");
}

#[test]
fn local_clear_all_wipes_everything() {
    let mut store = LocalJsonStore::in_memory();
    store.save_habit(&habit("Reading")).unwrap();
    store.save_entry(&entry("h1", "2024-01-01", "l1")).unwrap();

    store.clear_all().unwrap();

    assert!(store.habits().unwrap().is_empty());
    assert!(store.entries().unwrap().is_empty());
}

// =========================================================================
// MockRemoteStore
// =========================================================================

#[test]
fn remote_entry_upsert_is_transactional_per_slot() {
    let mut store = MockRemoteStore::new();
    // Rapid repeated taps produce distinct writes for the same slot.
    store.save_entry("u1", &entry("h1", "2024-01-01", "l1")).unwrap();
    let mut second = entry("h1", "2024-01-01", "l2");
    second.id = "some-other-id".into();
    store.save_entry("u1", &second).unwrap();

    let entries = store.entries("u1").unwrap();
    assert_eq!(entries.len(), 1, "no duplicate for the same (habit, date)");
    assert_eq!(entries[0].level_id, "l2");
    assert_eq!(entries[0].id, "h1@2024-01-01", "first writer's id is kept");
}

#[test]
fn remote_assigns_ids_to_unsaved_habits() {
    let mut store = MockRemoteStore::new();
    let h = habit("Reading");
    assert_eq!(h.save_state, SaveState::Unsaved);

    let saved = store.save_habit("u1", &h).unwrap();

    assert_eq!(saved.save_state, SaveState::Saved);
    assert_ne!(saved.id, h.id);

    // Saving the returned copy again updates in place.
    let again = store.save_habit("u1", &saved).unwrap();
    assert_eq!(again.id, saved.id);
    assert_eq!(store.habits("u1").unwrap().len(), 1);
}

#[test]
fn remote_data_is_scoped_by_user() {
    let mut store = MockRemoteStore::new();
    store.save_entry("u1", &entry("h1", "2024-01-01", "l1")).unwrap();
    store.save_entry("u2", &entry("h1", "2024-01-01", "l1")).unwrap();

    assert_eq!(store.entries("u1").unwrap().len(), 1);
    assert_eq!(store.entries("u2").unwrap().len(), 1);
}

#[test]
fn subscribe_pushes_initial_snapshot_and_writes_push_fresh_ones() {
    let mut store = MockRemoteStore::new();
    store.save_entry("u1", &entry("h1", "2024-01-01", "l1")).unwrap();
    store.subscribe("u1");

    let initial = drain_entries(&mut store).expect("initial snapshot");
    assert_eq!(initial.len(), 1);

    store.save_entry("u1", &entry("h1", "2024-01-02", "l1")).unwrap();
    let after_write = drain_entries(&mut store).expect("post-write snapshot");
    assert_eq!(after_write.len(), 2);
}

#[test]
fn unsubscribe_stops_pushes() {
    let mut store = MockRemoteStore::new();
    store.subscribe("u1");
    store.unsubscribe();
    store.save_entry("u1", &entry("h1", "2024-01-01", "l1")).unwrap();
    assert!(store.poll_push().is_none());
}

#[test]
fn remote_delete_habit_cascades() {
    let mut store = MockRemoteStore::new();
    let saved = store.save_habit("u1", &habit("Reading")).unwrap();
    store.save_entry("u1", &entry(&saved.id, "2024-01-01", "l1")).unwrap();
    store.save_entry("u1", &entry("other", "2024-01-01", "l1")).unwrap();

    store.delete_habit("u1", &saved.id).unwrap();

    assert!(store.habits("u1").unwrap().is_empty());
    let remaining = store.entries("u1").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].habit_id, "other");
}

#[test]
fn migration_remaps_habit_ids_and_foreign_keys() {
    let mut store = MockRemoteStore::new();
    let local_habit = habit("Reading");
    let local_entries = vec![
        entry(&local_habit.id, "2024-01-01", "l1"),
        entry("dangling", "2024-01-01", "l1"),
    ];

    let report = store
        .migrate_local_data("u1", &[local_habit.clone()], &local_entries)
        .unwrap();

    assert_eq!(report.habits_copied, 1);
    assert_eq!(report.entries_copied, 1);
    assert_eq!(report.entries_skipped, 1);

    let habits = store.habits("u1").unwrap();
    let entries = store.entries("u1").unwrap();
    assert_ne!(habits[0].id, local_habit.id, "backend id assigned");
    assert_eq!(entries[0].habit_id, habits[0].id, "foreign key rewritten");
}

// =========================================================================
// StoreFacade session machine
// =========================================================================

#[test]
fn facade_starts_uninitialized_and_refuses_writes() {
    let mut facade = StoreFacade::new(LocalJsonStore::in_memory(), MockRemoteStore::new());
    assert_eq!(*facade.session(), Session::Uninitialized);
    assert!(facade.save_entry(&entry("h1", "2024-01-01", "l1")).is_err());
    assert_eq!(facade.load_all().unwrap(), (vec![], vec![]));
}

#[test]
fn guest_session_routes_to_local_storage() {
    let mut facade = StoreFacade::new(LocalJsonStore::in_memory(), MockRemoteStore::new());
    facade.begin_guest();

    let saved = facade.save_habit(&habit("Reading")).unwrap();
    assert_eq!(saved.save_state, SaveState::Saved);
    facade.save_entry(&entry(&saved.id, "2024-01-01", "l1")).unwrap();

    let (habits, entries) = facade.load_all().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(entries.len(), 1);
    assert!(facade.poll_push().is_none(), "local mode has no push channel");
}

#[test]
fn sign_in_migrates_guest_data_and_clears_local() {
    let mut facade = StoreFacade::new(LocalJsonStore::in_memory(), MockRemoteStore::new());
    facade.begin_guest();
    let saved = facade.save_habit(&habit("Reading")).unwrap();
    facade.save_entry(&entry(&saved.id, "2024-01-01", "l1")).unwrap();

    facade.sign_in("u1").unwrap();

    assert_eq!(
        *facade.session(),
        Session::RemoteSyncing { user_id: "u1".into() }
    );
    let (habits, entries) = facade.load_all().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].habit_id, habits[0].id);
    assert!(facade.local().habits().unwrap().is_empty(), "local cleared after copy");
}

#[test]
fn sign_in_proceeds_when_local_data_cannot_be_read() {
    let mut facade = StoreFacade::new(BrokenLocalStore, MockRemoteStore::new());

    // Migration is best effort: an unreadable guest store is logged and
    // skipped, never a sign-in blocker.
    facade.sign_in("u1").unwrap();

    assert_eq!(
        *facade.session(),
        Session::RemoteSyncing { user_id: "u1".into() }
    );
    facade.save_entry(&entry("h1", "2024-01-01", "l1")).unwrap();
    let (_, entries) = facade.load_all().unwrap();
    assert_eq!(entries.len(), 1, "writes route to the remote backend");
}

#[test]
fn sign_out_tears_down_and_returns_to_uninitialized() {
    let mut facade = StoreFacade::new(LocalJsonStore::in_memory(), MockRemoteStore::new());
    facade.sign_in("u1").unwrap();
    facade.save_entry(&entry("h1", "2024-01-01", "l1")).unwrap();

    facade.sign_out();

    assert_eq!(*facade.session(), Session::Uninitialized);
    assert!(facade.poll_push().is_none());
}
