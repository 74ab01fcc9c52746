//! Core domain types for the thermostat controller.
//!
//! Everything the control loop and the two input surfaces (console and HTTP
//! form) agree on lives here: the operator settings, the latest sensor
//! sample, the actuator bookkeeping, and the [`SharedState`] owner that
//! serializes every read and write of that triple.

pub mod constants;
pub mod error;
pub mod shared;
pub mod types;

pub use error::{Error, Result};
pub use shared::{SharedState, StateSnapshot};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
