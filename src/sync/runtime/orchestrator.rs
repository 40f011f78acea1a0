use std::time::Duration;

use crate::clock;
use crate::model::{validate_habit, Habit, HabitEntry, HabitStatus};
use crate::summary::{summarize, HabitSummary};
use crate::sync::error::{StoreError, SyncError, ValidationError};
use crate::sync::reconciler::state::SyncMode;
use crate::sync::reconciler::{Reconciler, ReconcilerCommand, ReconcilerEvent, DEFAULT_GRACE};
use crate::sync::store::api::{LocalStore, RemoteStore, StorePush};
use crate::sync::store::StoreFacade;

/// **SyncOrchestrator**
///
/// The imperative shell around the reconciler. Three responsibilities:
/// 1. **Drive the logic core** ([`Reconciler`]) by feeding it events.
/// 2. **Execute side effects** (persistence commands) through the [`StoreFacade`].
/// 3. **Pump the push channel**, delivering backend snapshots back into the core.
///
/// Runs on the host's single event-loop thread; persistence failures are
/// converted into rollback events and surfaced through the error notifier,
/// never thrown past this boundary.
pub struct SyncOrchestrator<L, R> {
    reconciler: Reconciler,
    store: StoreFacade<L, R>,

    /// Current habit list from the active backend.
    habits: Vec<Habit>,

    /// Error surface for the host UI; failures are logged regardless.
    on_error: Option<Box<dyn FnMut(&StoreError)>>,

    /// Grace window carried across session transitions.
    grace: Duration,
}

impl<L, R> SyncOrchestrator<L, R>
where
    L: LocalStore,
    R: RemoteStore,
{
    pub fn new(store: StoreFacade<L, R>) -> Self {
        Self {
            reconciler: Reconciler::new(SyncMode::LocalOnly),
            store,
            habits: Vec::new(),
            on_error: None,
            grace: DEFAULT_GRACE,
        }
    }

    /// Register a callback for surfaced persistence errors.
    pub fn with_error_notifier<F: FnMut(&StoreError) + 'static>(mut self, f: F) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn with_grace_window(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self.reconciler = Reconciler::new(self.reconciler.mode()).with_grace(grace);
        self
    }

    // ---------------------------------------------------------------------
    // Session transitions
    // ---------------------------------------------------------------------

    pub fn start_guest(&mut self) -> Result<(), StoreError> {
        self.store.begin_guest();
        self.reconciler = Reconciler::new(SyncMode::LocalOnly).with_grace(self.grace);
        self.reload()
    }

    pub fn sign_in(&mut self, user_id: &str) -> Result<(), StoreError> {
        self.store.sign_in(user_id)?;
        self.reconciler = Reconciler::new(SyncMode::RemoteSyncing).with_grace(self.grace);
        self.reload()
    }

    pub fn sign_out(&mut self) {
        self.store.sign_out();
        self.habits.clear();
        self.reconciler = Reconciler::new(SyncMode::LocalOnly).with_grace(self.grace);
    }

    /// Eager load from the active backend, seeding the confirmed set.
    fn reload(&mut self) -> Result<(), StoreError> {
        let (habits, entries) = self.store.load_all()?;
        log::info!(
            "[DRIVER] loaded {} habits / {} entries",
            habits.len(),
            entries.len()
        );
        self.habits = habits;
        self.reconciler
            .handle_event(ReconcilerEvent::EntriesSnapshot(entries));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Habit CRUD (validate first, then persist; not optimistic)
    // ---------------------------------------------------------------------

    pub fn create_habit(&mut self, habit: Habit) -> Result<Habit, SyncError> {
        validate_habit(&habit, &self.habits)?;
        let saved = self.store.save_habit(&habit)?;
        self.upsert_habit_row(saved.clone());
        Ok(saved)
    }

    pub fn update_habit(&mut self, habit: Habit) -> Result<Habit, SyncError> {
        if !self.habits.iter().any(|h| h.id == habit.id) {
            return Err(ValidationError::UnknownHabit(habit.id.clone()).into());
        }
        validate_habit(&habit, &self.habits)?;
        let saved = self.store.save_habit(&habit)?;
        self.upsert_habit_row(saved.clone());
        Ok(saved)
    }

    pub fn set_habit_status(&mut self, habit_id: &str, status: HabitStatus) -> Result<(), SyncError> {
        let habit = self
            .habits
            .iter()
            .find(|h| h.id == habit_id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownHabit(habit_id.to_string()))?;
        let updated = Habit { status, ..habit };
        let saved = self.store.save_habit(&updated)?;
        self.upsert_habit_row(saved);
        Ok(())
    }

    /// Delete a habit and every entry referencing it, everywhere.
    pub fn delete_habit(&mut self, habit_id: &str) -> Result<(), SyncError> {
        if !self.habits.iter().any(|h| h.id == habit_id) {
            return Err(ValidationError::UnknownHabit(habit_id.to_string()).into());
        }
        self.store.delete_habit(habit_id)?;
        self.habits.retain(|h| h.id != habit_id);
        self.reconciler.handle_event(ReconcilerEvent::HabitDeleted {
            habit_id: habit_id.to_string(),
        });
        Ok(())
    }

    fn upsert_habit_row(&mut self, habit: Habit) {
        match self.habits.iter_mut().find(|h| h.id == habit.id) {
            Some(row) => *row = habit,
            None => self.habits.push(habit),
        }
    }

    // ---------------------------------------------------------------------
    // Entry write path (optimistic)
    // ---------------------------------------------------------------------

    /// User tapped `level_id` for `habit_id` today. The visible state changes
    /// immediately; the persistence write is issued behind it, and a failure
    /// rolls the change back and reports through the error notifier.
    pub fn select_level(&mut self, habit_id: &str, level_id: &str) -> Result<(), ValidationError> {
        let habit = self
            .habits
            .iter()
            .find(|h| h.id == habit_id)
            .ok_or_else(|| ValidationError::UnknownHabit(habit_id.to_string()))?;
        if habit.level(level_id).is_none() {
            return Err(ValidationError::UnknownLevel {
                habit_id: habit_id.to_string(),
                level_id: level_id.to_string(),
            });
        }

        let cmds = self.reconciler.handle_event(ReconcilerEvent::LevelSelected {
            habit_id: habit_id.to_string(),
            level_id: level_id.to_string(),
            date: clock::today_key(),
        });
        self.execute(cmds);
        Ok(())
    }

    /// Execute persistence commands, feeding failures back as rollback events.
    fn execute(&mut self, cmds: Vec<ReconcilerCommand>) {
        for cmd in cmds {
            match cmd {
                ReconcilerCommand::SaveEntry { entry, replaced } => {
                    if let Err(err) = self.store.save_entry(&entry) {
                        log::warn!("[DRIVER] save_entry failed, rolling back: {err}");
                        self.reconciler
                            .handle_event(ReconcilerEvent::WriteFailed { entry, replaced });
                        self.report(&err);
                    }
                }
                ReconcilerCommand::DeleteEntry { entry } => {
                    if let Err(err) = self.store.delete_entry(&entry) {
                        log::warn!("[DRIVER] delete_entry failed, restoring: {err}");
                        self.reconciler
                            .handle_event(ReconcilerEvent::DeleteFailed { entry });
                        self.report(&err);
                    }
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Push channel
    // ---------------------------------------------------------------------

    /// Drain every queued subscription push into the core. Safe to call from
    /// any host cadence; bursts of snapshots are applied in arrival order and
    /// each application is a full replacement.
    pub fn pump(&mut self) {
        while let Some(push) = self.store.poll_push() {
            match push {
                StorePush::Habits(habits) => {
                    log::debug!("[DRIVER] habits snapshot: {}", habits.len());
                    self.habits = habits;
                }
                StorePush::Entries(entries) => {
                    self.reconciler
                        .handle_event(ReconcilerEvent::EntriesSnapshot(entries));
                }
            }
        }
    }

    fn report(&mut self, err: &StoreError) {
        if let Some(notify) = &mut self.on_error {
            notify(err);
        }
    }

    // ---------------------------------------------------------------------
    // Read side
    // ---------------------------------------------------------------------

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn visible_entries(&self) -> Vec<HabitEntry> {
        self.reconciler.visible_entries()
    }

    pub fn entry_for_today(&self, habit_id: &str) -> Option<HabitEntry> {
        self.reconciler.visible_entry(habit_id, &clock::today_key())
    }

    pub fn summary(&self, habit_id: &str) -> HabitSummary {
        summarize(habit_id, &self.visible_entries(), clock::today_date())
    }

    pub fn store_mut(&mut self) -> &mut StoreFacade<L, R> {
        &mut self.store
    }
}
