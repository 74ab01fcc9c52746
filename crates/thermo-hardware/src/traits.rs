//! Hardware device trait definitions.
//!
//! These traits are the contract between the control loop and the physical
//! collaborators: an ambient sensor that yields readings, and a relay board
//! that switches the heater, compressor, and blower.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceInfo, SensorReading};
use thermo_core::Channel;

/// Ambient temperature/humidity sensor.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters, or the enum wrapper from the
/// [`devices`](crate::devices) module when the backend is chosen at runtime.
///
/// # Examples
///
/// ```no_run
/// use thermo_hardware::traits::SensorReader;
/// use thermo_hardware::error::Result;
///
/// async fn print_reading<S: SensorReader>(sensor: &mut S) -> Result<()> {
///     let reading = sensor.read().await?;
///     println!("{:.1}°C {:.1}%", reading.temperature_c, reading.humidity);
///     Ok(())
/// }
/// ```
pub trait SensorReader: Send + Sync {
    /// Take one reading.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::NotReady`](crate::HardwareError::NotReady) when
    /// the sensor has nothing valid this time round, and other variants for
    /// disconnection or malformed data.
    async fn read(&mut self) -> Result<SensorReading>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Relay board driving the three HVAC channels.
///
/// # Examples
///
/// ```no_run
/// use thermo_hardware::traits::Actuator;
/// use thermo_hardware::error::Result;
/// use thermo_core::Channel;
///
/// async fn all_off<A: Actuator>(relays: &mut A) -> Result<()> {
///     for channel in Channel::ALL {
///         relays.set_channel(channel, false).await?;
///     }
///     Ok(())
/// }
/// ```
pub trait Actuator: Send + Sync {
    /// Drive `channel` on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the write did not reach the hardware.
    async fn set_channel(&mut self, channel: Channel, on: bool) -> Result<()>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
