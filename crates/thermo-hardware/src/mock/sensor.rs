//! Mock ambient sensor for testing and development.
//!
//! This module provides a simulated sensor whose reading, and whether the next
//! polls fail, are set programmatically through a handle.

use crate::{
    HardwareError, Result,
    traits::SensorReader,
    types::{DeviceInfo, SensorReading},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MockSensorState {
    /// Reading returned by every successful poll; `None` means not ready.
    reading: Option<SensorReading>,

    /// Number of upcoming polls that fail regardless of `reading`.
    pending_failures: u32,

    /// Total polls served.
    reads: u64,
}

fn lock(state: &Mutex<MockSensorState>) -> MutexGuard<'_, MockSensorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock sensor device.
///
/// Starts with no reading, so every poll returns not ready until the handle
/// provides one.
///
/// # Examples
///
/// ```
/// use thermo_hardware::mock::MockSensor;
/// use thermo_hardware::traits::SensorReader;
///
/// #[tokio::main]
/// async fn main() -> thermo_hardware::Result<()> {
///     let (mut sensor, handle) = MockSensor::new();
///     assert!(sensor.read().await.is_err());
///
///     handle.set_reading(21.0, 45.0);
///     let reading = sensor.read().await?;
///     assert_eq!(reading.temperature_c, 21.0);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockSensor {
    state: Arc<Mutex<MockSensorState>>,
    name: String,
}

impl MockSensor {
    /// Create a new mock sensor with the default name.
    pub fn new() -> (Self, MockSensorHandle) {
        Self::with_name("Mock Sensor".to_string())
    }

    /// Create a new mock sensor with a custom name.
    pub fn with_name(name: String) -> (Self, MockSensorHandle) {
        let state = Arc::new(Mutex::new(MockSensorState::default()));
        let handle = MockSensorHandle {
            state: Arc::clone(&state),
        };
        (Self { state, name }, handle)
    }
}

impl Default for MockSensor {
    fn default() -> Self {
        Self::new().0
    }
}

impl SensorReader for MockSensor {
    async fn read(&mut self) -> Result<SensorReading> {
        let mut state = lock(&self.state);
        state.reads += 1;

        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            return Err(HardwareError::not_ready("simulated transfer failure"));
        }

        state
            .reading
            .ok_or_else(|| HardwareError::not_ready("no reading available"))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Sensor v1.0"))
    }
}

/// Handle for controlling a mock sensor.
///
/// Cloneable; every clone drives the same sensor.
#[derive(Debug, Clone)]
pub struct MockSensorHandle {
    state: Arc<Mutex<MockSensorState>>,
}

impl MockSensorHandle {
    /// Set the reading returned by subsequent polls.
    pub fn set_reading(&self, temperature_c: f64, humidity: f64) {
        lock(&self.state).reading = Some(SensorReading::new(temperature_c, humidity));
    }

    /// Set the reading from a Fahrenheit temperature.
    ///
    /// Convenient for scenarios written in display units.
    pub fn set_fahrenheit(&self, temperature_f: f64, humidity: f64) {
        self.set_reading((temperature_f - 32.0) * 5.0 / 9.0, humidity);
    }

    /// Make every subsequent poll return not ready.
    pub fn clear_reading(&self) {
        lock(&self.state).reading = None;
    }

    /// Make the next `count` polls fail.
    pub fn fail_next(&self, count: u32) {
        lock(&self.state).pending_failures = count;
    }

    /// Number of polls served so far.
    pub fn read_count(&self) -> u64 {
        lock(&self.state).reads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_sensor_not_ready_initially() {
        let (mut sensor, handle) = MockSensor::new();

        let result = sensor.read().await;
        assert!(matches!(result, Err(HardwareError::NotReady { .. })));
        assert_eq!(handle.read_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_sensor_reading() {
        let (mut sensor, handle) = MockSensor::new();
        handle.set_reading(22.5, 38.0);

        let reading = sensor.read().await.unwrap();
        assert_eq!(reading, SensorReading::new(22.5, 38.0));
    }

    #[tokio::test]
    async fn test_mock_sensor_fahrenheit() {
        let (mut sensor, handle) = MockSensor::new();
        handle.set_fahrenheit(212.0, 50.0);

        let reading = sensor.read().await.unwrap();
        assert!((reading.temperature_c - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_mock_sensor_injected_failures() {
        let (mut sensor, handle) = MockSensor::new();
        handle.set_reading(20.0, 40.0);
        handle.fail_next(2);

        assert!(sensor.read().await.unwrap_err().is_not_ready());
        assert!(sensor.read().await.unwrap_err().is_not_ready());
        assert!(sensor.read().await.is_ok());
        assert_eq!(handle.read_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_sensor_clear_reading() {
        let (mut sensor, handle) = MockSensor::new();
        handle.set_reading(20.0, 40.0);
        handle.clear_reading();

        assert!(sensor.read().await.is_err());
    }

    #[tokio::test]
    async fn test_mock_sensor_get_info() {
        let (sensor, _handle) = MockSensor::with_name("Hallway".to_string());

        let info = sensor.get_info().await.unwrap();
        assert_eq!(info.name, "Hallway");
        assert_eq!(info.model, "Mock Sensor v1.0");
    }
}
