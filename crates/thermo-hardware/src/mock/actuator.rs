//! Mock relay board for testing and development.
//!
//! Records every write so tests can check both the resulting levels and that
//! redundant writes were suppressed.

use crate::{HardwareError, Result, traits::Actuator, types::DeviceInfo};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thermo_core::{ActuatorState, Channel};

#[derive(Debug, Default)]
struct MockActuatorState {
    /// Current relay levels.
    levels: ActuatorState,

    /// Every accepted write, in order.
    writes: Vec<(Channel, bool)>,

    /// Writes to this channel are rejected.
    failing: Option<Channel>,
}

fn lock(state: &Mutex<MockActuatorState>) -> MutexGuard<'_, MockActuatorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock relay board.
///
/// # Examples
///
/// ```
/// use thermo_hardware::mock::MockActuator;
/// use thermo_hardware::traits::Actuator;
/// use thermo_core::Channel;
///
/// #[tokio::main]
/// async fn main() -> thermo_hardware::Result<()> {
///     let (mut relays, handle) = MockActuator::new();
///
///     relays.set_channel(Channel::Blower, true).await?;
///
///     assert!(handle.levels().blower_on);
///     assert_eq!(handle.write_count(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockActuator {
    state: Arc<Mutex<MockActuatorState>>,
    name: String,
}

impl MockActuator {
    /// Create a new mock relay board with the default name.
    pub fn new() -> (Self, MockActuatorHandle) {
        Self::with_name("Mock Relays".to_string())
    }

    /// Create a new mock relay board with a custom name.
    pub fn with_name(name: String) -> (Self, MockActuatorHandle) {
        let state = Arc::new(Mutex::new(MockActuatorState::default()));
        let handle = MockActuatorHandle {
            state: Arc::clone(&state),
        };
        (Self { state, name }, handle)
    }
}

impl Default for MockActuator {
    fn default() -> Self {
        Self::new().0
    }
}

impl Actuator for MockActuator {
    async fn set_channel(&mut self, channel: Channel, on: bool) -> Result<()> {
        let mut state = lock(&self.state);

        if state.failing == Some(channel) {
            return Err(HardwareError::communication(format!(
                "simulated write failure on {channel}"
            )));
        }

        state.levels = state.levels.with_channel(channel, on);
        state.writes.push((channel, on));
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Relays v1.0"))
    }
}

/// Handle for observing and controlling a mock relay board.
#[derive(Debug, Clone)]
pub struct MockActuatorHandle {
    state: Arc<Mutex<MockActuatorState>>,
}

impl MockActuatorHandle {
    /// Current relay levels.
    pub fn levels(&self) -> ActuatorState {
        lock(&self.state).levels
    }

    /// Every accepted write, in order.
    pub fn writes(&self) -> Vec<(Channel, bool)> {
        lock(&self.state).writes.clone()
    }

    /// Number of accepted writes.
    pub fn write_count(&self) -> usize {
        lock(&self.state).writes.len()
    }

    /// Forget the write log, keeping the levels.
    pub fn clear_writes(&self) {
        lock(&self.state).writes.clear();
    }

    /// Reject every write to `channel` from now on.
    pub fn fail_on(&self, channel: Channel) {
        lock(&self.state).failing = Some(channel);
    }

    /// Accept writes on every channel again.
    pub fn clear_failure(&self) {
        lock(&self.state).failing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_actuator_levels() {
        let (mut relays, handle) = MockActuator::new();

        relays.set_channel(Channel::Heater, true).await.unwrap();
        relays.set_channel(Channel::Blower, true).await.unwrap();

        let levels = handle.levels();
        assert!(levels.heater_on);
        assert!(!levels.compressor_on);
        assert!(levels.blower_on);
        assert_eq!(
            handle.writes(),
            vec![(Channel::Heater, true), (Channel::Blower, true)]
        );
    }

    #[tokio::test]
    async fn test_mock_actuator_failure() {
        let (mut relays, handle) = MockActuator::new();
        handle.fail_on(Channel::Compressor);

        let result = relays.set_channel(Channel::Compressor, true).await;
        assert!(matches!(
            result,
            Err(HardwareError::CommunicationError { .. })
        ));
        assert!(!handle.levels().compressor_on);

        relays.set_channel(Channel::Heater, false).await.unwrap();
        assert_eq!(handle.write_count(), 1);

        handle.clear_failure();
        relays.set_channel(Channel::Compressor, true).await.unwrap();
        assert!(handle.levels().compressor_on);
    }

    #[tokio::test]
    async fn test_mock_actuator_clear_writes() {
        let (mut relays, handle) = MockActuator::new();
        relays.set_channel(Channel::Blower, true).await.unwrap();

        handle.clear_writes();

        assert_eq!(handle.write_count(), 0);
        assert!(handle.levels().blower_on);
    }

    #[tokio::test]
    async fn test_mock_actuator_get_info() {
        let (relays, _handle) = MockActuator::new();

        let info = relays.get_info().await.unwrap();
        assert_eq!(info.name, "Mock Relays");
    }
}
