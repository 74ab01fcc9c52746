//! Common types shared across hardware device implementations.
//!
//! This module defines device metadata, raw sensor readings, and the relay
//! pin assignment.

use serde::{Deserialize, Serialize};
use thermo_core::Channel;
use thermo_core::constants::{BLOWER_GPIO, COMPRESSOR_GPIO, HEATER_GPIO};

/// Generic device information.
///
/// Contains metadata about a hardware device such as name, model,
/// and an optional location (sysfs path, bus address).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "AM2302", "Mock Sensor").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional location the device is reached through.
    pub location: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            location: None,
        }
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// One successful reading from the ambient sensor, in native units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Temperature in degrees Celsius.
    pub temperature_c: f64,

    /// Relative humidity in percent.
    pub humidity: f64,
}

impl SensorReading {
    /// Create a new reading.
    pub fn new(temperature_c: f64, humidity: f64) -> Self {
        Self {
            temperature_c,
            humidity,
        }
    }
}

/// GPIO line for each relay channel (BCM numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMap {
    pub heater: u32,
    pub compressor: u32,
    pub blower: u32,
}

impl PinMap {
    /// GPIO line driving `channel`.
    pub fn pin(&self, channel: Channel) -> u32 {
        match channel {
            Channel::Heater => self.heater,
            Channel::Compressor => self.compressor,
            Channel::Blower => self.blower,
        }
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            heater: HEATER_GPIO,
            compressor: COMPRESSOR_GPIO,
            blower: BLOWER_GPIO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("AM2302", "DHT22").with_location("/sys/bus/iio/devices/iio:device0");
        assert_eq!(info.name, "AM2302");
        assert_eq!(
            info.location.as_deref(),
            Some("/sys/bus/iio/devices/iio:device0")
        );
    }

    #[test]
    fn test_default_pin_map_matches_reference_wiring() {
        let pins = PinMap::default();
        assert_eq!(pins.pin(Channel::Heater), 22);
        assert_eq!(pins.pin(Channel::Compressor), 17);
        assert_eq!(pins.pin(Channel::Blower), 27);
    }
}
