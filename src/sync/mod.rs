//! Reconciliation and persistence plumbing.
//!
//! Layered the obvious way: `reconciler` is the pure core, `store` is the
//! pluggable persistence boundary, `runtime` is the shell that wires the two
//! together on the host's event loop.

pub mod error;
pub mod reconciler;
pub mod runtime;
pub mod store;
