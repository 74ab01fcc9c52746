//! Heater/compressor mutual exclusion.
//!
//! Running both at once fights the two coils against each other and can damage
//! the equipment. Every proposed state passes through [`SafetyInterlock::apply`]
//! before it reaches the relays; when both are requested the compressor is
//! kept and the heater dropped. The blower is left as proposed.

use thermo_core::ActuatorState;

/// Result of applying the interlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interlocked {
    /// State safe to commit.
    pub state: ActuatorState,

    /// `true` if the proposed state had to be corrected.
    pub tripped: bool,
}

/// Stateless interlock.
///
/// # Examples
///
/// ```
/// use thermo_control::SafetyInterlock;
/// use thermo_core::ActuatorState;
///
/// let result = SafetyInterlock::apply(ActuatorState {
///     heater_on: true,
///     compressor_on: true,
///     blower_on: true,
/// });
///
/// assert!(result.tripped);
/// assert!(!result.state.heater_on);
/// assert!(result.state.compressor_on);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyInterlock;

impl SafetyInterlock {
    pub fn apply(proposed: ActuatorState) -> Interlocked {
        if proposed.heater_on && proposed.compressor_on {
            return Interlocked {
                state: ActuatorState {
                    heater_on: false,
                    ..proposed
                },
                tripped: true,
            };
        }

        Interlocked {
            state: proposed,
            tripped: false,
        }
    }
}
