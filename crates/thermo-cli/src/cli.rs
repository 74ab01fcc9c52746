//! Process arguments.
//!
//! Every flag has a `THERMO_*` environment fallback so the service can be
//! configured from a unit file without editing its command line.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thermo_control::ControlLoopConfig;
use thermo_core::constants::{
    DEFAULT_HTTP_ADDR, DEFAULT_MAX_MISSED_POLLS, DEFAULT_SETTINGS_FILE, DEFAULT_WARM_UP_SECS,
    SENSOR_POLL_INTERVAL_SECS,
};
use thermo_hardware::mock::{MockActuator, MockSensor};
use thermo_hardware::sysfs::{DEFAULT_GPIO_ROOT, DEFAULT_IIO_DEVICE, IioSensor, SysfsGpioActuator};
use thermo_hardware::{AnyActuator, AnySensor, PinMap};
use thermo_network::HttpServerConfig;

/// Ambient sensor backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SensorKind {
    /// Simulated sensor holding a fixed reading.
    Mock,
    /// AM2302 through the kernel IIO driver.
    Iio,
}

/// Relay board backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ActuatorKind {
    /// Simulated relays.
    Mock,
    /// Relays on sysfs GPIO lines.
    Gpio,
}

#[derive(Parser, Debug)]
#[command(name = "thermo", version, about = "Single-zone HVAC thermostat")]
pub struct Cli {
    #[arg(long, env = "THERMO_CONFIG", default_value = DEFAULT_SETTINGS_FILE, help = "Settings file")]
    pub config: PathBuf,

    #[arg(long, env = "THERMO_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR, help = "HTTP form listen address")]
    pub http_addr: SocketAddr,

    #[arg(long, env = "THERMO_NO_HTTP", help = "Do not start the HTTP form")]
    pub no_http: bool,

    #[arg(long, env = "THERMO_WARM_UP_SECS", default_value_t = DEFAULT_WARM_UP_SECS, help = "Seconds before the first actuation")]
    pub warm_up_secs: u64,

    #[arg(
        long,
        env = "THERMO_POLL_SECS",
        default_value_t = SENSOR_POLL_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Sensor poll interval in seconds"
    )]
    pub poll_secs: u64,

    #[arg(
        long,
        env = "THERMO_STALE_AFTER_POLLS",
        default_value_t = DEFAULT_MAX_MISSED_POLLS,
        help = "Missed polls before the sample is considered stale (0 disables)"
    )]
    pub stale_after_polls: u32,

    #[arg(long, value_enum, env = "THERMO_SENSOR", default_value_t = SensorKind::Mock)]
    pub sensor: SensorKind,

    #[arg(long, env = "THERMO_IIO_DEVICE", default_value = DEFAULT_IIO_DEVICE, help = "IIO device directory")]
    pub iio_device: PathBuf,

    #[arg(
        long,
        env = "THERMO_MOCK_FAHRENHEIT",
        default_value_t = 72.0,
        help = "Temperature reported by the mock sensor, in °F"
    )]
    pub mock_fahrenheit: f64,

    #[arg(long, value_enum, env = "THERMO_ACTUATOR", default_value_t = ActuatorKind::Mock)]
    pub actuator: ActuatorKind,

    #[arg(long, env = "THERMO_GPIO_ROOT", default_value = DEFAULT_GPIO_ROOT, help = "sysfs GPIO root")]
    pub gpio_root: PathBuf,
}

impl Cli {
    /// Control loop timing derived from the flags.
    ///
    /// A sample goes stale once `stale_after_polls` consecutive polls have
    /// been missed, i.e. after `poll * (n + 1)`.
    pub fn control_config(&self) -> ControlLoopConfig {
        let poll = Duration::from_secs(self.poll_secs);
        let stale_after = (self.stale_after_polls > 0)
            .then(|| poll.saturating_mul(self.stale_after_polls.saturating_add(1)));

        ControlLoopConfig::new()
            .with_poll_interval(poll)
            .with_warm_up(Duration::from_secs(self.warm_up_secs))
            .with_stale_after(stale_after)
    }

    pub fn http_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            bind_addr: self.http_addr,
        }
    }

    pub fn sensor(&self) -> AnySensor {
        match self.sensor {
            SensorKind::Mock => {
                let (sensor, handle) = MockSensor::new();
                handle.set_fahrenheit(self.mock_fahrenheit, 45.0);
                AnySensor::Mock(sensor)
            }
            SensorKind::Iio => AnySensor::Iio(IioSensor::new(&self.iio_device)),
        }
    }

    /// Open the relay board.
    ///
    /// # Errors
    ///
    /// Fails if the GPIO lines cannot be exported or configured.
    pub async fn actuator(&self) -> thermo_hardware::Result<AnyActuator> {
        match self.actuator {
            ActuatorKind::Mock => Ok(AnyActuator::Mock(MockActuator::new().0)),
            ActuatorKind::Gpio => SysfsGpioActuator::open(&self.gpio_root, PinMap::default())
                .await
                .map(AnyActuator::Gpio),
        }
    }
}
