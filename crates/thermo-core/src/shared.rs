//! The single synchronized owner of thermostat state.
//!
//! [`SharedState`] holds the operator settings, the latest sensor sample, and
//! the actuator bookkeeping behind one mutex so that every reader sees the
//! triple as a unit. Handles are cheap to clone; the control loop, the console
//! and every HTTP connection each hold one.
//!
//! # Examples
//!
//! ```
//! use thermo_core::{HvacMode, SharedState, ThermostatSettings};
//!
//! let state = SharedState::new(ThermostatSettings::default());
//! let console = state.clone();
//!
//! console.modify_settings(|s| s.hvac_mode = HvacMode::Heat);
//!
//! let snapshot = state.snapshot();
//! assert_eq!(snapshot.settings.hvac_mode, HvacMode::Heat);
//! assert_eq!(snapshot.settings_revision, 1);
//! ```

use crate::types::{ActuatorState, SensorSample, ThermostatSettings};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Consistent copy of the shared state taken under a single lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub settings: ThermostatSettings,
    pub sample: SensorSample,
    pub actuators: ActuatorState,

    /// Monotonic time the sample was recorded. `captured_at` on the sample
    /// is wall-clock and only for display.
    #[serde(skip)]
    pub sampled_at: Option<Instant>,

    /// Incremented on every settings mutation.
    pub settings_revision: u64,

    /// Incremented on every mutation that changed the HVAC mode.
    pub mode_changes: u64,

    /// Sensor polls that failed since the last successful read.
    pub consecutive_read_failures: u32,

    /// Set once the warm-up period is over.
    pub ready: bool,
}

impl StateSnapshot {
    /// Adjusted temperature for display, `None` while the sensor is not ready.
    pub fn adjusted_temperature(&self) -> Option<f64> {
        self.sample
            .adjusted_temperature(self.settings.calibration_offset)
    }

    /// Time since the sample was recorded, on the monotonic clock.
    pub fn sample_age(&self) -> Option<Duration> {
        self.sampled_at.map(|at| at.elapsed())
    }
}

/// Handle to the process-wide thermostat state.
///
/// All access goes through the atomic operations below; the fields themselves
/// are never exposed by reference. None of the operations perform I/O, and the
/// lock is never held across an `.await`.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<StateSnapshot>,
    settings_changed: Notify,
}

impl SharedState {
    /// Create the state with `settings`, no valid sample, and all actuators off.
    pub fn new(settings: ThermostatSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(StateSnapshot {
                    settings,
                    sample: SensorSample::not_ready(),
                    actuators: ActuatorState::ALL_OFF,
                    sampled_at: None,
                    settings_revision: 0,
                    mode_changes: 0,
                    consecutive_read_failures: 0,
                    ready: false,
                }),
                settings_changed: Notify::new(),
            }),
        }
    }

    // The guarded data is a set of plain values that are always replaced
    // whole, so a writer that panicked cannot leave it half-updated.
    fn lock(&self) -> MutexGuard<'_, StateSnapshot> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a consistent snapshot of everything.
    pub fn snapshot(&self) -> StateSnapshot {
        *self.lock()
    }

    /// Current settings only.
    pub fn settings(&self) -> ThermostatSettings {
        self.lock().settings
    }

    /// Apply `f` to the settings atomically and wake the control loop.
    ///
    /// Concurrent callers serialize; the last writer wins. The closure's
    /// return value is passed through, which lets callers read back the
    /// post-mutation state in the same critical section.
    pub fn modify_settings<R>(&self, f: impl FnOnce(&mut ThermostatSettings) -> R) -> R {
        let result = {
            let mut guard = self.lock();
            let mode_before = guard.settings.hvac_mode;
            let result = f(&mut guard.settings);
            guard.settings_revision = guard.settings_revision.wrapping_add(1);
            if guard.settings.hvac_mode != mode_before {
                guard.mode_changes = guard.mode_changes.wrapping_add(1);
            }
            result
        };
        self.inner.settings_changed.notify_one();
        result
    }

    /// Replace the sensor sample and clear the failure counter.
    pub fn record_sample(&self, sample: SensorSample) {
        let mut guard = self.lock();
        guard.sample = sample;
        guard.sampled_at = Some(Instant::now());
        guard.consecutive_read_failures = 0;
    }

    /// Mark the current sample unusable, keeping its values.
    ///
    /// Every surface then reports the sensor as not ready until the next
    /// successful read. Returns `true` if the sample was valid before.
    pub fn invalidate_sample(&self) -> bool {
        let mut guard = self.lock();
        let was_valid = guard.sample.valid;
        guard.sample = guard.sample.invalidated();
        was_valid
    }

    /// Count a failed poll, leaving the previous sample in place.
    ///
    /// Returns the number of consecutive failures including this one.
    pub fn record_read_failure(&self) -> u32 {
        let mut guard = self.lock();
        guard.consecutive_read_failures = guard.consecutive_read_failures.saturating_add(1);
        guard.consecutive_read_failures
    }

    /// Replace the committed actuator bookkeeping.
    pub fn record_actuator_state(&self, actuators: ActuatorState) {
        self.lock().actuators = actuators;
    }

    /// Publish the end of the warm-up period.
    pub fn mark_ready(&self) {
        self.lock().ready = true;
    }

    /// Returns `true` once the warm-up period is over.
    pub fn is_ready(&self) -> bool {
        self.lock().ready
    }

    /// Wait for the next settings mutation.
    ///
    /// A mutation that happened while nobody was waiting is remembered, so
    /// the next call returns immediately.
    pub async fn changed(&self) {
        self.inner.settings_changed.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FanMode, HvacMode};
    use chrono::Utc;
    use std::time::Duration;

    #[test]
    fn test_new_state_is_safe() {
        let state = SharedState::new(ThermostatSettings::default());
        let snapshot = state.snapshot();

        assert_eq!(snapshot.actuators, ActuatorState::ALL_OFF);
        assert!(!snapshot.sample.valid);
        assert!(!snapshot.ready);
        assert_eq!(snapshot.settings_revision, 0);
        assert_eq!(snapshot.adjusted_temperature(), None);
    }

    #[test]
    fn test_modify_settings_returns_closure_result() {
        let state = SharedState::new(ThermostatSettings::default());

        let after = state.modify_settings(|s| {
            s.fan_mode = FanMode::Auto;
            s.heat_setpoint = 68.5;
            *s
        });

        assert_eq!(after.fan_mode, FanMode::Auto);
        assert_eq!(state.settings(), after);
        assert_eq!(state.snapshot().settings_revision, 1);
    }

    #[test]
    fn test_mode_changes_counted_only_on_real_change() {
        let state = SharedState::new(ThermostatSettings::default());

        state.modify_settings(|s| s.hvac_mode = HvacMode::Ac);
        assert_eq!(state.snapshot().mode_changes, 0);

        state.modify_settings(|s| s.hvac_mode = HvacMode::Heat);
        state.modify_settings(|s| s.hvac_mode = HvacMode::Ac);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.mode_changes, 2);
        assert_eq!(snapshot.settings_revision, 3);
    }

    #[test]
    fn test_clones_share_state() {
        let state = SharedState::new(ThermostatSettings::default());
        let http = state.clone();

        http.modify_settings(|s| s.hvac_mode = HvacMode::Off);

        assert_eq!(state.settings().hvac_mode, HvacMode::Off);
    }

    #[test]
    fn test_read_failures_reset_on_sample() {
        let state = SharedState::new(ThermostatSettings::default());

        assert_eq!(state.record_read_failure(), 1);
        assert_eq!(state.record_read_failure(), 2);

        state.record_sample(SensorSample::captured(22.0, 40.0, Utc::now()));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.consecutive_read_failures, 0);
        assert!(snapshot.sample.valid);
    }

    #[test]
    fn test_read_failure_keeps_previous_sample() {
        let state = SharedState::new(ThermostatSettings::default());
        let sample = SensorSample::captured(22.0, 40.0, Utc::now());
        state.record_sample(sample);

        state.record_read_failure();

        assert_eq!(state.snapshot().sample, sample);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_age_is_monotonic() {
        let state = SharedState::new(ThermostatSettings::default());
        assert_eq!(state.snapshot().sample_age(), None);

        // A wall-clock stamp in the future does not make the sample younger.
        let ahead = Utc::now() + chrono::TimeDelta::hours(1);
        state.record_sample(SensorSample::captured(22.0, 40.0, ahead));
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(state.snapshot().sample_age(), Some(Duration::from_secs(20)));
    }

    #[test]
    fn test_invalidate_sample_hides_temperature() {
        let state = SharedState::new(ThermostatSettings::default());
        state.record_sample(SensorSample::captured(22.0, 40.0, Utc::now()));

        assert!(state.invalidate_sample());
        assert!(!state.invalidate_sample());

        let snapshot = state.snapshot();
        assert!(!snapshot.sample.valid);
        assert_eq!(snapshot.adjusted_temperature(), None);

        state.record_sample(SensorSample::captured(23.0, 40.0, Utc::now()));
        assert!(state.snapshot().sample.valid);
    }

    #[test]
    fn test_mark_ready() {
        let state = SharedState::new(ThermostatSettings::default());
        assert!(!state.is_ready());
        state.mark_ready();
        assert!(state.is_ready());
    }

    #[tokio::test]
    async fn test_changed_wakes_after_mutation() {
        let state = SharedState::new(ThermostatSettings::default());
        let writer = state.clone();

        tokio::spawn(async move {
            writer.modify_settings(|s| s.cool_setpoint = 72.0);
        });

        tokio::time::timeout(Duration::from_secs(1), state.changed())
            .await
            .expect("settings change was not signalled");
        assert_eq!(state.settings().cool_setpoint, 72.0);
    }
}
