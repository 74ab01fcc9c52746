//! Core constants for the thermostat controller.
//!
//! Timing, default settings, and the reference GPIO wiring are collected here
//! so the control loop, the persistence layer, and the binary agree on them.
//!
//! # Usage
//!
//! ```
//! use thermo_core::constants::*;
//! use std::time::Duration;
//!
//! let poll = Duration::from_secs(SENSOR_POLL_INTERVAL_SECS);
//! assert_eq!(poll.as_secs(), 3);
//! assert_eq!(DEFAULT_HEAT_SETPOINT, 74.0);
//! ```

// ============================================================================
// Timing
// ============================================================================

/// Sensor polling cadence in seconds.
///
/// The AM2302/DHT22 cannot be sampled faster than once every two seconds; three
/// leaves margin for a retry inside the same cycle.
pub const SENSOR_POLL_INTERVAL_SECS: u64 = 3;

/// Default control evaluation cadence in milliseconds.
///
/// Evaluation is side-effect free until commit, so it runs well inside the
/// poll cadence. Settings mutations also wake the loop immediately.
pub const DEFAULT_EVALUATION_INTERVAL_MS: u64 = 500;

/// Default warm-up period in seconds before actuators may be commanded.
///
/// The sensor needs roughly five minutes after power-up before its reading is
/// trustworthy.
pub const DEFAULT_WARM_UP_SECS: u64 = 300;

/// Default number of consecutive missed polls after which the last sample is
/// treated as not ready.
pub const DEFAULT_MAX_MISSED_POLLS: u32 = 3;

// ============================================================================
// Default settings
// ============================================================================

/// Default heating setpoint (°F).
pub const DEFAULT_HEAT_SETPOINT: f64 = 74.0;

/// Default cooling setpoint (°F).
pub const DEFAULT_COOL_SETPOINT: f64 = 70.0;

/// Default calibration offset (°F).
pub const DEFAULT_CALIBRATION_OFFSET: f64 = 0.0;

/// Default settings file name, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "config.ini";

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

// ============================================================================
// Reference wiring (BCM numbering, active-high)
// ============================================================================

/// Heater relay (header pin 15).
pub const HEATER_GPIO: u32 = 22;

/// Compressor relay (header pin 11).
pub const COMPRESSOR_GPIO: u32 = 17;

/// Blower relay (header pin 13).
pub const BLOWER_GPIO: u32 = 27;
