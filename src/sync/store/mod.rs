pub mod api;
pub mod facade;
pub mod local;
pub mod mock;

pub use api::{LocalStore, MigrationReport, RemoteStore, StorePush};
pub use facade::{Session, StoreFacade};
pub use local::LocalJsonStore;
pub use mock::MockRemoteStore;

#[cfg(test)]
mod tests;
