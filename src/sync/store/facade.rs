use crate::model::{Habit, HabitEntry};
use crate::sync::error::StoreError;
use crate::sync::store::api::{LocalStore, RemoteStore, StorePush};

/// Which backend the facade routes to. Identity decisions live outside; the
/// facade only receives the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Uninitialized,
    LocalOnly,
    RemoteSyncing { user_id: String },
}

/// Uniform CRUD + subscribe surface over the local and remote backends.
///
/// Per-session state machine: `Uninitialized -> LocalOnly` (guest) or
/// `Uninitialized -> RemoteSyncing` (sign-in), back to `Uninitialized` on
/// sign-out with listeners torn down. Signing in from guest runs the
/// one-shot local-to-remote migration, best effort.
pub struct StoreFacade<L, R> {
    local: L,
    remote: R,
    session: Session,
}

impl<L: LocalStore, R: RemoteStore> StoreFacade<L, R> {
    pub fn new(local: L, remote: R) -> Self {
        Self {
            local,
            remote,
            session: Session::Uninitialized,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn begin_guest(&mut self) {
        log::info!("[FACADE] session -> LocalOnly");
        self.session = Session::LocalOnly;
    }

    /// Enter remote mode for `user_id`. Existing guest data is copied up
    /// first; a failed read or copy is logged and does not block the sign-in.
    pub fn sign_in(&mut self, user_id: &str) -> Result<(), StoreError> {
        match self
            .local
            .habits()
            .and_then(|habits| Ok((habits, self.local.entries()?)))
        {
            Ok((habits, entries)) if !habits.is_empty() => {
                match self.remote.migrate_local_data(user_id, &habits, &entries) {
                    Ok(report) => {
                        log::info!(
                            "[FACADE] migrated {} habits / {} entries ({} skipped)",
                            report.habits_copied,
                            report.entries_copied,
                            report.entries_skipped
                        );
                        if let Err(err) = self.local.clear_all() {
                            log::warn!("[FACADE] failed to clear local data after migration: {err}");
                        }
                    }
                    Err(err) => {
                        log::warn!("[FACADE] local data migration failed, continuing: {err}");
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                log::warn!("[FACADE] could not read local data for migration, skipping: {err}");
            }
        }

        self.remote.subscribe(user_id);
        log::info!("[FACADE] session -> RemoteSyncing({user_id})");
        self.session = Session::RemoteSyncing {
            user_id: user_id.to_string(),
        };
        Ok(())
    }

    /// Tear down listeners and return to `Uninitialized`.
    pub fn sign_out(&mut self) {
        if matches!(self.session, Session::RemoteSyncing { .. }) {
            self.remote.unsubscribe();
        }
        log::info!("[FACADE] session -> Uninitialized");
        self.session = Session::Uninitialized;
    }

    /// Eager full load from whichever backend is active.
    pub fn load_all(&mut self) -> Result<(Vec<Habit>, Vec<HabitEntry>), StoreError> {
        match &self.session {
            Session::Uninitialized => Ok((Vec::new(), Vec::new())),
            Session::LocalOnly => Ok((self.local.habits()?, self.local.entries()?)),
            Session::RemoteSyncing { user_id } => {
                let user_id = user_id.clone();
                Ok((self.remote.habits(&user_id)?, self.remote.entries(&user_id)?))
            }
        }
    }

    /// Upsert, returning the saved copy (the remote backend may assign an id).
    pub fn save_habit(&mut self, habit: &Habit) -> Result<Habit, StoreError> {
        match &self.session {
            Session::Uninitialized => Err(StoreError::NoSession),
            Session::LocalOnly => {
                let mut saved = habit.clone();
                saved.mark_saved();
                self.local.save_habit(&saved)?;
                Ok(saved)
            }
            Session::RemoteSyncing { user_id } => {
                let user_id = user_id.clone();
                self.remote.save_habit(&user_id, habit)
            }
        }
    }

    pub fn save_entry(&mut self, entry: &HabitEntry) -> Result<(), StoreError> {
        match &self.session {
            Session::Uninitialized => Err(StoreError::NoSession),
            Session::LocalOnly => self.local.save_entry(entry),
            Session::RemoteSyncing { user_id } => {
                let user_id = user_id.clone();
                self.remote.save_entry(&user_id, entry)
            }
        }
    }

    /// Cascades entry deletion in the active backend.
    pub fn delete_habit(&mut self, habit_id: &str) -> Result<(), StoreError> {
        match &self.session {
            Session::Uninitialized => Err(StoreError::NoSession),
            Session::LocalOnly => self.local.delete_habit(habit_id),
            Session::RemoteSyncing { user_id } => {
                let user_id = user_id.clone();
                self.remote.delete_habit(&user_id, habit_id)
            }
        }
    }

    pub fn delete_entry(&mut self, entry: &HabitEntry) -> Result<(), StoreError> {
        match &self.session {
            Session::Uninitialized => Err(StoreError::NoSession),
            Session::LocalOnly => self.local.delete_entry(&entry.id),
            Session::RemoteSyncing { user_id } => {
                let user_id = user_id.clone();
                self.remote.delete_entry(&user_id, &entry.id)
            }
        }
    }

    /// Drain the next subscription push; local mode has no push channel.
    pub fn poll_push(&mut self) -> Option<StorePush> {
        match self.session {
            Session::RemoteSyncing { .. } => self.remote.poll_push(),
            _ => None,
        }
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }
}
