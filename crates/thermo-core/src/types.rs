use crate::{
    Result,
    constants::{DEFAULT_CALIBRATION_OFFSET, DEFAULT_COOL_SETPOINT, DEFAULT_HEAT_SETPOINT},
    error::Error,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Convert a Celsius reading to Fahrenheit.
///
/// # Examples
///
/// ```
/// use thermo_core::celsius_to_fahrenheit;
///
/// assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
/// assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
/// ```
#[inline]
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// HVAC operating mode.
///
/// The integer codes are the ones stored in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum HvacMode {
    Ac = 0,
    Heat = 1,
    Off = 2,
}

impl HvacMode {
    /// Create a mode from its persisted integer code.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` if the code is not 0, 1, or 2.
    #[inline]
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(HvacMode::Ac),
            1 => Ok(HvacMode::Heat),
            2 => Ok(HvacMode::Off),
            _ => Err(Error::ConfigParse(format!("Invalid hvac mode code: {code}"))),
        }
    }

    /// Persisted integer code.
    #[inline]
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HvacMode::Ac => write!(f, "AC"),
            HvacMode::Heat => write!(f, "HEAT"),
            HvacMode::Off => write!(f, "OFF"),
        }
    }
}

impl std::str::FromStr for HvacMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AC" => Ok(HvacMode::Ac),
            "HEAT" => Ok(HvacMode::Heat),
            "OFF" => Ok(HvacMode::Off),
            _ => Err(Error::invalid_field("hvac mode", s)),
        }
    }
}

/// Blower operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum FanMode {
    /// Blower runs continuously.
    On = 0,
    /// Blower runs only while heating or cooling.
    Auto = 1,
}

impl FanMode {
    /// Create a fan mode from its persisted integer code.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` if the code is not 0 or 1.
    #[inline]
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(FanMode::On),
            1 => Ok(FanMode::Auto),
            _ => Err(Error::ConfigParse(format!("Invalid fan mode code: {code}"))),
        }
    }

    /// Persisted integer code.
    #[inline]
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FanMode::On => write!(f, "ON"),
            FanMode::Auto => write!(f, "AUTO"),
        }
    }
}

impl std::str::FromStr for FanMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ON" => Ok(FanMode::On),
            "AUTO" => Ok(FanMode::Auto),
            _ => Err(Error::invalid_field("fan mode", s)),
        }
    }
}

/// One of the three relay outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Heater,
    Compressor,
    Blower,
}

impl Channel {
    /// All channels in shutdown order.
    pub const ALL: [Channel; 3] = [Channel::Heater, Channel::Compressor, Channel::Blower];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Channel::Heater => write!(f, "Heater"),
            Channel::Compressor => write!(f, "Compressor"),
            Channel::Blower => write!(f, "Blower"),
        }
    }
}

/// Operator-controlled configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermostatSettings {
    pub hvac_mode: HvacMode,
    pub fan_mode: FanMode,
    /// Heat below this temperature (°F).
    pub heat_setpoint: f64,
    /// Cool above this temperature (°F).
    pub cool_setpoint: f64,
    /// Added to every converted reading (°F).
    pub calibration_offset: f64,
}

impl Default for ThermostatSettings {
    fn default() -> Self {
        Self {
            hvac_mode: HvacMode::Ac,
            fan_mode: FanMode::On,
            heat_setpoint: DEFAULT_HEAT_SETPOINT,
            cool_setpoint: DEFAULT_COOL_SETPOINT,
            calibration_offset: DEFAULT_CALIBRATION_OFFSET,
        }
    }
}

/// Latest reading from the ambient sensor.
///
/// `raw_temperature` is in the sensor's native unit (°C). A sample with
/// `valid == false` carries no usable reading and must never be read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub raw_temperature: f64,
    pub raw_humidity: f64,
    pub valid: bool,
    pub captured_at: Option<DateTime<Utc>>,
}

impl SensorSample {
    /// The sample in place before the first successful read.
    #[must_use]
    pub fn not_ready() -> Self {
        Self {
            raw_temperature: 0.0,
            raw_humidity: 0.0,
            valid: false,
            captured_at: None,
        }
    }

    /// A successful reading captured at `at`.
    #[must_use]
    pub fn captured(celsius: f64, humidity: f64, at: DateTime<Utc>) -> Self {
        Self {
            raw_temperature: celsius,
            raw_humidity: humidity,
            valid: true,
            captured_at: Some(at),
        }
    }

    /// Converted reading plus `offset`, or `None` if no valid reading exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermo_core::SensorSample;
    /// use chrono::Utc;
    ///
    /// let sample = SensorSample::captured(20.0, 40.0, Utc::now());
    /// assert_eq!(sample.adjusted_temperature(1.5), Some(69.5));
    /// assert_eq!(SensorSample::not_ready().adjusted_temperature(1.5), None);
    /// ```
    #[must_use]
    pub fn adjusted_temperature(&self, offset: f64) -> Option<f64> {
        self.valid
            .then(|| celsius_to_fahrenheit(self.raw_temperature) + offset)
    }

    /// Wall-clock time since capture, or `None` if never captured.
    ///
    /// For display only: the wall clock can step, so staleness decisions use
    /// the monotonic age kept by [`SharedState`](crate::SharedState).
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.captured_at
            .map(|at| (now - at).to_std().unwrap_or(Duration::ZERO))
    }

    /// Returns `true` if the sample is older than `max_age`.
    ///
    /// A sample without a capture time is never stale; it is simply not
    /// valid.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now).is_some_and(|age| age > max_age)
    }

    /// Copy of this sample marked invalid, keeping the last values for display.
    #[must_use]
    pub fn invalidated(mut self) -> Self {
        self.valid = false;
        self
    }
}

impl Default for SensorSample {
    fn default() -> Self {
        Self::not_ready()
    }
}

/// Commanded relay levels.
///
/// Heater and compressor both on is representable on purpose; the safety
/// interlock, not this type, rules it out before anything reaches hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActuatorState {
    pub heater_on: bool,
    pub compressor_on: bool,
    pub blower_on: bool,
}

impl ActuatorState {
    pub const ALL_OFF: ActuatorState = ActuatorState {
        heater_on: false,
        compressor_on: false,
        blower_on: false,
    };

    /// Returns `true` while heating or cooling is commanded.
    #[inline]
    #[must_use]
    pub fn is_conditioning(&self) -> bool {
        self.heater_on || self.compressor_on
    }

    /// Level of one channel.
    #[must_use]
    pub fn channel(&self, channel: Channel) -> bool {
        match channel {
            Channel::Heater => self.heater_on,
            Channel::Compressor => self.compressor_on,
            Channel::Blower => self.blower_on,
        }
    }

    /// Copy with one channel set to `on`.
    #[must_use]
    pub fn with_channel(mut self, channel: Channel, on: bool) -> Self {
        match channel {
            Channel::Heater => self.heater_on = on,
            Channel::Compressor => self.compressor_on = on,
            Channel::Blower => self.blower_on = on,
        }
        self
    }

    /// Channels whose level differs from `other`, in shutdown order.
    #[must_use]
    pub fn changed_channels(&self, other: &ActuatorState) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|&ch| self.channel(ch) != other.channel(ch))
            .collect()
    }
}

impl fmt::Display for ActuatorState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let level = |on: bool| if on { "on" } else { "off" };
        write!(
            f,
            "heater={} compressor={} blower={}",
            level(self.heater_on),
            level(self.compressor_on),
            level(self.blower_on)
        )
    }
}
