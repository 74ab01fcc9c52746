//! Operator console and process wiring for the thermostat binary.
//!
//! The `thermo` binary reads its flags ([`cli::Cli`]), loads the settings
//! file, and runs the control loop, the HTTP form and the stdin
//! [`console::Console`] side by side until `q`, a signal, or a fatal
//! actuator failure.

pub mod cli;
pub mod commands;
pub mod console;

pub use cli::{ActuatorKind, Cli, SensorKind};
pub use commands::Command;
pub use console::{Console, Outcome};
