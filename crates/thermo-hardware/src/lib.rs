//! Hardware abstraction layer for the thermostat controller.
//!
//! This crate defines the two physical collaborators the control loop talks
//! to, the ambient sensor ([`SensorReader`]) and the relay board
//! ([`Actuator`]), together with mock implementations for development and
//! tests and Linux sysfs backends for a Raspberry Pi style deployment.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations use native `async fn` in traits.
//! - **Enum dispatch**: Runtime backend selection goes through
//!   [`devices::AnySensor`] and [`devices::AnyActuator`].
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: A sensor that simply has nothing this poll reports
//!   [`HardwareError::NotReady`], distinct from real faults.
//!
//! # Examples
//!
//! ```
//! use thermo_hardware::mock::{MockActuator, MockSensor};
//! use thermo_hardware::traits::{Actuator, SensorReader};
//! use thermo_core::Channel;
//!
//! #[tokio::main]
//! async fn main() -> thermo_hardware::Result<()> {
//!     let (mut sensor, sensor_handle) = MockSensor::new();
//!     let (mut relays, relay_handle) = MockActuator::new();
//!
//!     sensor_handle.set_reading(18.0, 40.0);
//!     let reading = sensor.read().await?;
//!
//!     if reading.temperature_c < 20.0 {
//!         relays.set_channel(Channel::Heater, true).await?;
//!     }
//!
//!     assert!(relay_handle.levels().heater_on);
//!     Ok(())
//! }
//! ```

pub mod devices;
pub mod error;
pub mod mock;
pub mod sysfs;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyActuator, AnySensor};
pub use error::{HardwareError, Result};
pub use traits::{Actuator, SensorReader};
pub use types::{DeviceInfo, PinMap, SensorReading};
