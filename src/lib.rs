//! habit-sync: reconciliation and streak engine for a multi-level habit tracker.
//!
//! The crate is the data-consistency core of a habit tracking app: it merges
//! locally-optimistic writes with snapshots pushed by a remote real-time
//! store, derives idempotent "today" semantics from the local calendar, and
//! computes streak statistics from an unordered entry log. Storage backends
//! and identity are pluggable collaborators behind traits.

pub mod clock;
pub mod model;
pub mod persistence;
pub mod summary;
pub mod sync;

pub use model::{Habit, HabitEntry, HabitLevel, HabitStatus};
pub use persistence::setup_local_store;
pub use summary::{summarize, HabitSummary};
pub use sync::error::{StoreError, SyncError, ValidationError};
pub use sync::reconciler::Reconciler;
pub use sync::runtime::SyncOrchestrator;
pub use sync::store::{LocalJsonStore, MockRemoteStore, StoreFacade};
