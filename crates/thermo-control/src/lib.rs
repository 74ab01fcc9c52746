//! Control decisions for the thermostat.
//!
//! - [`hysteresis`]: pure bang-bang evaluation of settings against a sample.
//! - [`interlock`]: heater/compressor mutual exclusion.
//! - [`phase`]: the start-up warm-up period.
//! - [`control_loop`]: the task that ties them to the sensor and the relays.

pub mod control_loop;
pub mod hysteresis;
pub mod interlock;
pub mod phase;

pub use control_loop::{ControlLoop, ControlLoopConfig};
pub use hysteresis::{Decision, HysteresisEngine};
pub use interlock::{Interlocked, SafetyInterlock};
pub use phase::{ControlPhase, PhaseTracker, PhaseTransition};
