//! Linux sysfs backends.
//!
//! The sensor's single-wire timing is handled by the kernel's `dht11` IIO
//! driver, which exposes each transfer as a pair of attribute files. Relays
//! are driven through the legacy `/sys/class/gpio` interface.
//!
//! ```text
//! /sys/bus/iio/devices/iio:device0/in_temp_input              21300  (m°C)
//! /sys/bus/iio/devices/iio:device0/in_humidityrelative_input  45100  (m%RH)
//! /sys/class/gpio/gpio22/value                                1
//! ```

use crate::{
    HardwareError, Result,
    traits::{Actuator, SensorReader},
    types::{DeviceInfo, PinMap, SensorReading},
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thermo_core::Channel;
use tracing::{debug, info};

/// Default IIO device directory for the first sensor.
pub const DEFAULT_IIO_DEVICE: &str = "/sys/bus/iio/devices/iio:device0";

/// Default sysfs GPIO root.
pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

const TEMPERATURE_ATTR: &str = "in_temp_input";
const HUMIDITY_ATTR: &str = "in_humidityrelative_input";

// errno values the dht11 driver returns for a failed transfer.
const EIO: i32 = 5;
const EAGAIN: i32 = 11;
const ETIMEDOUT: i32 = 110;

// A transfer takes a few milliseconds; the driver gives up well before this.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

// AM2302 datasheet operating range.
const MIN_TEMPERATURE_C: f64 = -40.0;
const MAX_TEMPERATURE_C: f64 = 80.0;

/// DHT22/AM2302 read through the kernel IIO driver.
#[derive(Debug, Clone)]
pub struct IioSensor {
    device_dir: PathBuf,
}

impl IioSensor {
    /// Create a sensor reading from `device_dir`.
    pub fn new(device_dir: impl Into<PathBuf>) -> Self {
        Self {
            device_dir: device_dir.into(),
        }
    }

    /// Directory the attributes are read from.
    pub fn device_dir(&self) -> &Path {
        &self.device_dir
    }

    async fn read_milli(&self, attr: &str) -> Result<f64> {
        let path = self.device_dir.join(attr);
        let raw = tokio::time::timeout(READ_TIMEOUT, tokio::fs::read_to_string(&path))
            .await
            .map_err(|_| HardwareError::timeout(READ_TIMEOUT.as_millis() as u64))?
            .map_err(|e| classify_read_error(&path, e))?;

        let milli: i64 = raw
            .trim()
            .parse()
            .map_err(|_| HardwareError::invalid_data(format!("{}: {:?}", path.display(), raw)))?;

        Ok(milli as f64 / 1000.0)
    }
}

impl Default for IioSensor {
    fn default() -> Self {
        Self::new(DEFAULT_IIO_DEVICE)
    }
}

fn classify_read_error(path: &Path, error: std::io::Error) -> HardwareError {
    match (error.kind(), error.raw_os_error()) {
        (ErrorKind::NotFound, _) => HardwareError::disconnected(path.display().to_string()),
        (ErrorKind::TimedOut | ErrorKind::WouldBlock, _)
        | (_, Some(EIO | EAGAIN | ETIMEDOUT)) => {
            HardwareError::not_ready(format!("{}: {}", path.display(), error))
        }
        _ => HardwareError::Io(error),
    }
}

impl SensorReader for IioSensor {
    async fn read(&mut self) -> Result<SensorReading> {
        let temperature_c = self.read_milli(TEMPERATURE_ATTR).await?;
        let humidity = self.read_milli(HUMIDITY_ATTR).await?;

        if !(MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&temperature_c) {
            return Err(HardwareError::invalid_data(format!(
                "temperature {temperature_c}°C outside sensor range"
            )));
        }
        if !(0.0..=100.0).contains(&humidity) {
            return Err(HardwareError::invalid_data(format!(
                "humidity {humidity}% outside sensor range"
            )));
        }

        Ok(SensorReading::new(temperature_c, humidity))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        let name = tokio::fs::read_to_string(self.device_dir.join("name"))
            .await
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|_| "dht11".to_string());

        Ok(DeviceInfo::new(name, "AM2302 (IIO)")
            .with_location(self.device_dir.display().to_string()))
    }
}

/// Relay board on sysfs GPIO lines, active-high.
#[derive(Debug, Clone)]
pub struct SysfsGpioActuator {
    root: PathBuf,
    pins: PinMap,
}

impl SysfsGpioActuator {
    /// Export the pins under `root` and configure them as outputs driven low.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if a line cannot be exported or
    /// configured.
    pub async fn open(root: impl Into<PathBuf>, pins: PinMap) -> Result<Self> {
        let actuator = Self {
            root: root.into(),
            pins,
        };

        for channel in Channel::ALL {
            actuator.export(channel).await?;
        }

        info!(
            root = %actuator.root.display(),
            heater = pins.heater,
            compressor = pins.compressor,
            blower = pins.blower,
            "GPIO relays configured"
        );
        Ok(actuator)
    }

    fn line_dir(&self, channel: Channel) -> PathBuf {
        self.root.join(format!("gpio{}", self.pins.pin(channel)))
    }

    async fn export(&self, channel: Channel) -> Result<()> {
        let pin = self.pins.pin(channel);
        let line = self.line_dir(channel);

        if !tokio::fs::try_exists(&line).await.unwrap_or(false) {
            debug!(pin, "exporting GPIO line");
            tokio::fs::write(self.root.join("export"), pin.to_string())
                .await
                .map_err(|e| {
                    HardwareError::initialization_failed(format!("export gpio{pin}: {e}"))
                })?;
        }

        // Writing "low" sets the direction and the initial level in one step,
        // so the relay never glitches on.
        tokio::fs::write(line.join("direction"), "low")
            .await
            .map_err(|e| HardwareError::initialization_failed(format!("direction gpio{pin}: {e}")))
    }
}

impl Actuator for SysfsGpioActuator {
    async fn set_channel(&mut self, channel: Channel, on: bool) -> Result<()> {
        let path = self.line_dir(channel).join("value");
        tokio::fs::write(&path, if on { "1" } else { "0" })
            .await
            .map_err(|e| HardwareError::communication(format!("{}: {}", path.display(), e)))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("GPIO relays", "sysfs-gpio")
            .with_location(self.root.display().to_string()))
    }
}
