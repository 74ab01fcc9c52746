//! Console command grammar.
//!
//! A command is a single token, optionally followed by `= value`. Spaces
//! around the `=` are optional:
//!
//! ```text
//! sht = 72.5
//! shm=HEAT
//! ```

use std::str::FromStr;
use thermo_core::{Error, FanMode, HvacMode, Result};

/// Help text printed by `h`.
pub const HELP: &str = "\
Commands:
  h               show this help
  p               print the current temperature and humidity
  ps              print all settings and actuator states
  s               save settings to the settings file
  q               shut down
  sht = <deg>     set the heat setpoint
  slt = <deg>     set the cool setpoint
  sov = <deg>     set the calibration offset
  shm = AC|HEAT|OFF  set the HVAC mode (actuators reset to off)
  sfm = ON|AUTO   set the fan mode";

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Help,
    Print,
    PrintSettings,
    Save,
    Quit,
    SetHeatSetpoint(f64),
    SetCoolSetpoint(f64),
    SetOffset(f64),
    SetHvacMode(HvacMode),
    SetFanMode(FanMode),
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let (name, value) = match line.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (line.trim(), None),
        };

        match (name, value) {
            ("h", None) => Ok(Command::Help),
            ("p", None) => Ok(Command::Print),
            ("ps", None) => Ok(Command::PrintSettings),
            ("s", None) => Ok(Command::Save),
            ("q", None) => Ok(Command::Quit),
            ("sht", Some(v)) => degrees("heat setpoint", v).map(Command::SetHeatSetpoint),
            ("slt", Some(v)) => degrees("cool setpoint", v).map(Command::SetCoolSetpoint),
            ("sov", Some(v)) => degrees("offset", v).map(Command::SetOffset),
            ("shm", Some(v)) => v.parse().map(Command::SetHvacMode),
            ("sfm", Some(v)) => v.parse().map(Command::SetFanMode),
            ("h" | "p" | "ps" | "s" | "q", Some(_)) => Err(Error::InvalidCommand(format!(
                "{name} takes no value"
            ))),
            ("sht" | "slt" | "sov" | "shm" | "sfm", None) => Err(Error::InvalidCommand(format!(
                "{name} needs a value, e.g. `{name} = ...`"
            ))),
            _ => Err(Error::InvalidCommand(line.trim().to_string())),
        }
    }
}

fn degrees(field: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::invalid_field(field, value))
}
