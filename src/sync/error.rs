use thiserror::Error;

/// Rejected before any state is mutated; surfacing one of these means
/// nothing changed, locally or remotely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a habit named \"{0}\" already exists")]
    DuplicateHabitName(String),

    #[error("habit name must not be empty")]
    EmptyHabitName,

    #[error("habit must define at least one level")]
    NoLevels,

    #[error("unknown habit \"{0}\"")]
    UnknownHabit(String),

    #[error("habit \"{habit_id}\" has no level \"{level_id}\"")]
    UnknownLevel { habit_id: String, level_id: String },
}

/// Persistence-layer failures. Write and delete failures roll the optimistic
/// mutation back; subscription and migration failures are logged and leave
/// the last known-good state in effect.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend rejected write: {0}")]
    WriteFailed(String),

    #[error("subscription channel failed: {0}")]
    Subscription(String),

    #[error("local data migration incomplete: {0}")]
    Migration(String),

    #[error("no active storage session")]
    NoSession,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Combined error surface for session-level operations that validate first
/// and persist second.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
