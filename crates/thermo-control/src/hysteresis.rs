//! Bang-bang control with a hold band of zero width.
//!
//! A channel switches on when the adjusted temperature is strictly on the
//! demand side of its setpoint, switches off when strictly on the other side,
//! and keeps its previous level when the temperature equals the setpoint.
//!
//! | Mode | Temperature vs setpoint | Heater   | Compressor |
//! |------|-------------------------|----------|------------|
//! | HEAT | below `heat_setpoint`   | on       | off        |
//! | HEAT | above `heat_setpoint`   | off      | off        |
//! | AC   | above `cool_setpoint`   | off      | on         |
//! | AC   | below `cool_setpoint`   | off      | off        |
//! | OFF  | any                     | off      | off        |
//!
//! The blower follows the fan mode: always on for `ON`, on exactly when a
//! conditioning channel is on for `AUTO`.

use std::cmp::Ordering;
use thermo_core::{ActuatorState, FanMode, HvacMode, SensorSample, ThermostatSettings};

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Drive the actuators to this state.
    Actuate(ActuatorState),

    /// No valid sample; nothing may run.
    SensorNotReady,
}

impl Decision {
    /// Actuator state this decision implies.
    pub fn actuators(&self) -> ActuatorState {
        match self {
            Decision::Actuate(state) => *state,
            Decision::SensorNotReady => ActuatorState::ALL_OFF,
        }
    }
}

/// Stateless hysteresis evaluator.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use thermo_control::{Decision, HysteresisEngine};
/// use thermo_core::{ActuatorState, HvacMode, SensorSample, ThermostatSettings};
///
/// let settings = ThermostatSettings {
///     hvac_mode: HvacMode::Heat,
///     ..ThermostatSettings::default()
/// };
/// // 20 °C is 68 °F, below the default heat setpoint.
/// let sample = SensorSample::captured(20.0, 40.0, Utc::now());
///
/// let decision = HysteresisEngine::evaluate(&settings, &sample, ActuatorState::ALL_OFF);
/// assert!(decision.actuators().heater_on);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HysteresisEngine;

impl HysteresisEngine {
    /// Compute the desired actuator state.
    ///
    /// `previous` is the last committed state; it decides the outcome when
    /// the temperature sits exactly on a setpoint. Interlocking is not applied
    /// here.
    pub fn evaluate(
        settings: &ThermostatSettings,
        sample: &SensorSample,
        previous: ActuatorState,
    ) -> Decision {
        let Some(temperature) = sample.adjusted_temperature(settings.calibration_offset) else {
            return Decision::SensorNotReady;
        };

        let (heater_on, compressor_on) = match settings.hvac_mode {
            HvacMode::Heat => {
                let heater_on = match temperature.partial_cmp(&settings.heat_setpoint) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Greater) => false,
                    Some(Ordering::Equal) | None => previous.heater_on,
                };
                (heater_on, false)
            }
            HvacMode::Ac => {
                let compressor_on = match temperature.partial_cmp(&settings.cool_setpoint) {
                    Some(Ordering::Greater) => true,
                    Some(Ordering::Less) => false,
                    Some(Ordering::Equal) | None => previous.compressor_on,
                };
                (false, compressor_on)
            }
            HvacMode::Off => (false, false),
        };

        let blower_on = match settings.fan_mode {
            FanMode::On => true,
            FanMode::Auto => heater_on || compressor_on,
        };

        Decision::Actuate(ActuatorState {
            heater_on,
            compressor_on,
            blower_on,
        })
    }
}
