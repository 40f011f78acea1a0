use anyhow::Result;

use crate::sync::store::LocalJsonStore;

pub const DB_PATH: &str = "habit_db.json";

/// Open or create the on-device JSON store.
pub fn setup_local_store(path: &str) -> Result<LocalJsonStore> {
    let store = LocalJsonStore::open(path)?;
    println!("Local store ready at {path}");
    Ok(store)
}
