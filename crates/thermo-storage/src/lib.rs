//! Settings persistence for the thermostat.
//!
//! Operator settings live in a small line-oriented file (see [`format`]) that
//! is read once at start-up and rewritten on demand from the console.

pub mod error;
pub mod format;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::SettingsStore;
