//! The periodic controller.
//!
//! One task owns the sensor and the relays. It polls the sensor on a slow
//! cadence, re-evaluates on a faster one (and immediately after any settings
//! change), and commits only the channels whose level actually changes.
//!
//! Whatever ends the loop (cancellation, an actuator fault) the relays are
//! commanded off before [`ControlLoop::run`] returns.

use crate::hysteresis::{Decision, HysteresisEngine};
use crate::interlock::SafetyInterlock;
use crate::phase::{ControlPhase, PhaseTracker};
use chrono::Utc;
use std::time::Duration;
use thermo_core::constants::{
    DEFAULT_EVALUATION_INTERVAL_MS, DEFAULT_MAX_MISSED_POLLS, DEFAULT_WARM_UP_SECS,
    SENSOR_POLL_INTERVAL_SECS,
};
use thermo_core::{ActuatorState, Channel, Error, Result, SensorSample, SharedState};
use thermo_hardware::{Actuator, SensorReader, SensorReading};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Control loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlLoopConfig {
    /// Time between sensor reads.
    pub poll_interval: Duration,

    /// Time between evaluations when nothing else wakes the loop.
    pub evaluation_interval: Duration,

    /// Actuators stay off for this long after start-up.
    pub warm_up: Duration,

    /// Samples older than this are treated as invalid, measured on the
    /// monotonic clock. `None` trusts the last good sample indefinitely.
    pub stale_after: Option<Duration>,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        let poll_interval = Duration::from_secs(SENSOR_POLL_INTERVAL_SECS);
        Self {
            poll_interval,
            evaluation_interval: Duration::from_millis(DEFAULT_EVALUATION_INTERVAL_MS),
            warm_up: Duration::from_secs(DEFAULT_WARM_UP_SECS),
            stale_after: Some(poll_interval * (DEFAULT_MAX_MISSED_POLLS + 1)),
        }
    }
}

impl ControlLoopConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_evaluation_interval(mut self, interval: Duration) -> Self {
        self.evaluation_interval = interval;
        self
    }

    pub fn with_warm_up(mut self, warm_up: Duration) -> Self {
        self.warm_up = warm_up;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Option<Duration>) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Consecutive failed polls tolerated before the sample is stale.
    ///
    /// Derived from `stale_after`; `None` when staleness is disabled.
    pub fn max_missed_polls(&self) -> Option<u32> {
        let max_age = self.stale_after?;
        let polls = max_age.as_nanos() / self.poll_interval.as_nanos().max(1);
        Some(u32::try_from(polls.saturating_sub(1)).unwrap_or(u32::MAX))
    }

    /// Check that the timing can drive a loop.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if either interval is zero.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be non-zero".to_string()));
        }
        if self.evaluation_interval.is_zero() {
            return Err(Error::Config(
                "evaluation interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Thermostat controller over a sensor `S` and a relay board `A`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use thermo_control::{ControlLoop, ControlLoopConfig};
/// use thermo_core::{HvacMode, SharedState, ThermostatSettings};
/// use thermo_hardware::mock::{MockActuator, MockSensor};
///
/// #[tokio::main]
/// async fn main() -> thermo_core::Result<()> {
///     let state = SharedState::new(ThermostatSettings {
///         hvac_mode: HvacMode::Heat,
///         ..ThermostatSettings::default()
///     });
///     let (sensor, sensor_handle) = MockSensor::new();
///     let (relays, relay_handle) = MockActuator::new();
///     sensor_handle.set_fahrenheit(68.0, 40.0);
///
///     let config = ControlLoopConfig::new().with_warm_up(Duration::ZERO);
///     let mut control = ControlLoop::new(config, state, sensor, relays);
///
///     control.start().await?;
///     control.poll_sensor().await;
///     control.tick().await?;
///     assert!(relay_handle.levels().heater_on);
///
///     control.shutdown_actuators().await?;
///     assert!(!relay_handle.levels().heater_on);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ControlLoop<S, A> {
    config: ControlLoopConfig,
    state: SharedState,
    sensor: S,
    actuator: A,
    phase: PhaseTracker,

    /// Levels last written to the relays.
    committed: ActuatorState,

    /// Last `mode_changes` value acted upon.
    seen_mode_changes: u64,

    /// Suppresses repeated warnings while the sensor stays unusable.
    degraded: bool,
}

impl<S: SensorReader, A: Actuator> ControlLoop<S, A> {
    /// Create a controller. The warm-up clock starts now.
    pub fn new(config: ControlLoopConfig, state: SharedState, sensor: S, actuator: A) -> Self {
        let seen_mode_changes = state.snapshot().mode_changes;
        Self {
            phase: PhaseTracker::new(config.warm_up),
            config,
            state,
            sensor,
            actuator,
            committed: ActuatorState::ALL_OFF,
            seen_mode_changes,
            degraded: false,
        }
    }

    pub fn config(&self) -> &ControlLoopConfig {
        &self.config
    }

    pub fn phase(&self) -> ControlPhase {
        self.phase.current()
    }

    /// Levels last written to the relays.
    pub fn committed(&self) -> ActuatorState {
        self.committed
    }

    /// Run until `shutdown` is cancelled or an actuator fails.
    ///
    /// The relays are commanded off before returning, on every path.
    ///
    /// # Errors
    ///
    /// Returns `Error::ActuatorCommandFailure` if a relay write failed, either
    /// while running or during the final cleanup, and `Error::Config` if the
    /// timing is unusable.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        let outcome = self.control(&shutdown).await;
        match &outcome {
            Err(e) if e.is_fatal() => error!(error = %e, "control loop stopped on error"),
            Err(e) => warn!(error = %e, "control loop did not start"),
            Ok(()) => {}
        }

        let cleanup = self.shutdown_actuators().await;
        outcome.and(cleanup)
    }

    async fn control(&mut self, shutdown: &CancellationToken) -> Result<()> {
        self.config.validate()?;
        self.start().await?;

        let state = self.state.clone();
        let mut poll = time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut evaluation = time::interval(self.config.evaluation_interval);
        evaluation.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    info!("control loop shutdown requested");
                    return Ok(());
                }
                _ = poll.tick() => {
                    self.poll_sensor().await;
                }
                _ = evaluation.tick() => {}
                () = state.changed() => {
                    debug!("settings changed, re-evaluating");
                }
            }

            self.tick().await?;
        }
    }

    /// Command every channel off, regardless of what was committed before.
    ///
    /// Called once before the first tick; the relays may have been left in
    /// any state by a previous process.
    ///
    /// # Errors
    ///
    /// Returns `Error::ActuatorCommandFailure` on the first failed write.
    pub async fn start(&mut self) -> Result<()> {
        for channel in Channel::ALL {
            self.write(channel, false).await?;
        }
        self.committed = ActuatorState::ALL_OFF;
        self.state.record_actuator_state(self.committed);

        let sensor = self.sensor.get_info().await.map(|info| info.model);
        let relays = self.actuator.get_info().await.map(|info| info.model);
        info!(
            sensor = sensor.as_deref().unwrap_or("unknown"),
            relays = relays.as_deref().unwrap_or("unknown"),
            warm_up_secs = self.config.warm_up.as_secs(),
            poll_ms = self.config.poll_interval.as_millis() as u64,
            "control loop started, actuators off"
        );
        Ok(())
    }

    /// Read the sensor once and publish the result.
    ///
    /// A failed read leaves the previous sample in place and bumps the
    /// failure counter.
    pub async fn poll_sensor(&mut self) -> Option<SensorReading> {
        match self.sensor.read().await {
            Ok(reading) => {
                debug!(
                    temperature_c = reading.temperature_c,
                    humidity = reading.humidity,
                    "sensor read"
                );
                self.state.record_sample(SensorSample::captured(
                    reading.temperature_c,
                    reading.humidity,
                    Utc::now(),
                ));
                Some(reading)
            }
            Err(e) => {
                let failures = self.state.record_read_failure();
                if e.is_not_ready() {
                    debug!(failures, error = %e, "sensor not ready");
                } else {
                    warn!(failures, error = %e, "sensor read failed");
                }
                None
            }
        }
    }

    /// Advance the warm-up phase and, once ready, evaluate and commit.
    ///
    /// # Errors
    ///
    /// Returns `Error::ActuatorCommandFailure` if a relay write failed.
    pub async fn tick(&mut self) -> Result<()> {
        self.expire_stale_sample();

        if self.phase.poll().is_some() {
            info!(
                elapsed_secs = self.phase.elapsed().as_secs(),
                "warm-up complete, HVAC ready"
            );
            self.state.mark_ready();
        }

        if !self.phase.is_ready() {
            return Ok(());
        }

        self.evaluate().await
    }

    /// Invalidate the shared sample once it is too old to act on.
    ///
    /// Age is taken from the monotonic clock, and too many consecutive
    /// failed polls count as stale on their own, so a wall-clock step can
    /// never keep a dead reading alive.
    fn expire_stale_sample(&mut self) {
        let (Some(max_age), Some(max_missed)) =
            (self.config.stale_after, self.config.max_missed_polls())
        else {
            return;
        };

        let snapshot = self.state.snapshot();
        if !snapshot.sample.valid {
            return;
        }

        let age = snapshot.sample_age();
        let failures = snapshot.consecutive_read_failures;
        if age.is_some_and(|age| age > max_age) || failures > max_missed {
            self.state.invalidate_sample();
            warn!(
                age_secs = age.map(|age| age.as_secs()),
                max_age_secs = max_age.as_secs(),
                failures,
                "sensor sample is stale, holding actuators off"
            );
            self.degraded = true;
        }
    }

    async fn evaluate(&mut self) -> Result<()> {
        let snapshot = self.state.snapshot();
        let settings = snapshot.settings;
        let mut previous = self.committed;

        if snapshot.mode_changes != self.seen_mode_changes {
            info!(mode = %settings.hvac_mode, "HVAC mode changed, resetting actuators");
            self.commit(ActuatorState::ALL_OFF).await?;
            self.seen_mode_changes = snapshot.mode_changes;
            previous = ActuatorState::ALL_OFF;
        }

        let proposed = match HysteresisEngine::evaluate(&settings, &snapshot.sample, previous) {
            Decision::Actuate(state) => {
                if self.degraded {
                    info!("sensor sample usable again");
                    self.degraded = false;
                }
                state
            }
            Decision::SensorNotReady => {
                if !self.degraded {
                    warn!("sensor not ready, holding actuators off");
                    self.degraded = true;
                }
                ActuatorState::ALL_OFF
            }
        };

        let interlocked = SafetyInterlock::apply(proposed);
        if interlocked.tripped {
            warn!(proposed = %proposed, "interlock tripped, heater forced off");
        }

        self.commit(interlocked.state).await
    }

    /// Write the channels that differ from what was last committed.
    async fn commit(&mut self, desired: ActuatorState) -> Result<()> {
        let changed = desired.changed_channels(&self.committed);
        if changed.is_empty() {
            return Ok(());
        }

        // Switch-offs go first so heater and compressor never overlap on the
        // wire.
        let (offs, ons): (Vec<_>, Vec<_>) =
            changed.into_iter().partition(|&ch| !desired.channel(ch));

        for channel in offs.into_iter().chain(ons) {
            let on = desired.channel(channel);
            self.write(channel, on).await?;
            self.committed = self.committed.with_channel(channel, on);
            self.state.record_actuator_state(self.committed);
        }

        info!(actuators = %self.committed, "actuators committed");
        Ok(())
    }

    /// Command heater, compressor and blower off, in that order.
    ///
    /// Every channel is attempted even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first `Error::ActuatorCommandFailure` encountered.
    pub async fn shutdown_actuators(&mut self) -> Result<()> {
        let mut first_error = None;

        for channel in Channel::ALL {
            match self.write(channel, false).await {
                Ok(()) => self.committed = self.committed.with_channel(channel, false),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        self.state.record_actuator_state(self.committed);

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("all actuators off");
                Ok(())
            }
        }
    }

    async fn write(&mut self, channel: Channel, on: bool) -> Result<()> {
        self.actuator.set_channel(channel, on).await.map_err(|e| {
            error!(%channel, on, error = %e, "actuator command failed");
            Error::actuator(channel, e.to_string())
        })?;
        debug!(%channel, on, "actuator commanded");
        Ok(())
    }
}
