//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so the backend chosen at
//! startup (mock or sysfs) is carried in an enum that forwards each call.
//!
//! # Examples
//!
//! ```
//! use thermo_hardware::devices::AnySensor;
//! use thermo_hardware::mock::MockSensor;
//!
//! let (sensor, _handle) = MockSensor::new();
//! let any_sensor = AnySensor::Mock(sensor);
//! ```

use crate::mock::{MockActuator, MockSensor};
use crate::sysfs::{IioSensor, SysfsGpioActuator};
use crate::traits::{Actuator, SensorReader};
use crate::{DeviceInfo, Result, SensorReading};
use thermo_core::Channel;

/// Enum wrapper for sensor dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnySensor {
    /// Mock sensor for development and testing.
    Mock(MockSensor),

    /// AM2302 through the kernel IIO driver.
    Iio(IioSensor),
}

impl SensorReader for AnySensor {
    async fn read(&mut self) -> Result<SensorReading> {
        match self {
            Self::Mock(device) => device.read().await,
            Self::Iio(device) => device.read().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            Self::Iio(device) => device.get_info().await,
        }
    }
}

/// Enum wrapper for relay board dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyActuator {
    /// Mock relays for development and testing.
    Mock(MockActuator),

    /// Relays on sysfs GPIO lines.
    Gpio(SysfsGpioActuator),
}

impl Actuator for AnyActuator {
    async fn set_channel(&mut self, channel: Channel, on: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_channel(channel, on).await,
            Self::Gpio(device) => device.set_channel(channel, on).await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            Self::Gpio(device) => device.get_info().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_sensor_forwards_to_mock() {
        let (sensor, handle) = MockSensor::new();
        let mut sensor = AnySensor::Mock(sensor);
        handle.set_reading(19.5, 52.0);

        let reading = sensor.read().await.unwrap();
        assert_eq!(reading.temperature_c, 19.5);
        assert_eq!(sensor.get_info().await.unwrap().name, "Mock Sensor");
    }

    #[tokio::test]
    async fn test_any_actuator_forwards_to_mock() {
        let (relays, handle) = MockActuator::new();
        let mut relays = AnyActuator::Mock(relays);

        relays.set_channel(Channel::Compressor, true).await.unwrap();

        assert!(handle.levels().compressor_on);
        assert_eq!(relays.get_info().await.unwrap().name, "Mock Relays");
    }
}
