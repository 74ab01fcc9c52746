//! Start-up phase tracking.
//!
//! The compressor and heater must not be driven until the sensor and the
//! relays have settled, so the controller starts in [`ControlPhase::WarmingUp`]
//! and moves to [`ControlPhase::Ready`] once the warm-up period has elapsed.
//! There is no way back.
//!
//! Time is measured with [`tokio::time::Instant`], so paused-clock tests can
//! fast-forward through the warm-up.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use thermo_control::{ControlPhase, PhaseTracker};
//!
//! let mut phase = PhaseTracker::new(Duration::ZERO);
//! assert_eq!(phase.current(), ControlPhase::WarmingUp);
//!
//! let transition = phase.poll().expect("zero warm-up is over immediately");
//! assert_eq!(transition.to, ControlPhase::Ready);
//! assert!(phase.is_ready());
//! ```

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thermo_core::{Error, Result};
use tokio::time::Instant;

/// Phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlPhase {
    /// Sensor is polled but actuators stay off.
    WarmingUp,

    /// Normal operation.
    Ready,
}

impl fmt::Display for ControlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlPhase::WarmingUp => write!(f, "WarmingUp"),
            ControlPhase::Ready => write!(f, "Ready"),
        }
    }
}

impl ControlPhase {
    /// Check if transition to `target` is valid from this phase.
    ///
    /// ```
    /// use thermo_control::ControlPhase;
    ///
    /// assert!(ControlPhase::WarmingUp.can_transition_to(&ControlPhase::Ready));
    /// assert!(!ControlPhase::Ready.can_transition_to(&ControlPhase::WarmingUp));
    /// ```
    pub fn can_transition_to(&self, target: &ControlPhase) -> bool {
        matches!((self, target), (ControlPhase::WarmingUp, ControlPhase::Ready))
    }
}

/// Record of a phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: ControlPhase,
    pub to: ControlPhase,

    /// When the transition occurred.
    pub at: Instant,
}

/// Tracks the warm-up period and the resulting phase.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    current: ControlPhase,
    started_at: Instant,
    warm_up: Duration,
    transition: Option<PhaseTransition>,
}

impl PhaseTracker {
    /// Start warming up now.
    pub fn new(warm_up: Duration) -> Self {
        Self::starting_at(Instant::now(), warm_up)
    }

    /// Start warming up from `started_at`.
    pub fn starting_at(started_at: Instant, warm_up: Duration) -> Self {
        Self {
            current: ControlPhase::WarmingUp,
            started_at,
            warm_up,
            transition: None,
        }
    }

    pub fn current(&self) -> ControlPhase {
        self.current
    }

    pub fn is_ready(&self) -> bool {
        self.current == ControlPhase::Ready
    }

    /// Configured warm-up period.
    pub fn warm_up(&self) -> Duration {
        self.warm_up
    }

    /// Time since start-up.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Warm-up time left, `None` once ready.
    pub fn remaining(&self) -> Option<Duration> {
        if self.is_ready() {
            return None;
        }
        Some(self.warm_up.saturating_sub(self.elapsed()))
    }

    /// The transition to `Ready`, once it has happened.
    pub fn transition(&self) -> Option<&PhaseTransition> {
        self.transition.as_ref()
    }

    /// Advance the phase once the run time exceeds the warm-up period.
    ///
    /// A zero warm-up is over on the first poll. Returns the transition the
    /// first time it happens, `None` otherwise.
    pub fn poll(&mut self) -> Option<PhaseTransition> {
        let over = self.warm_up.is_zero() || self.elapsed() > self.warm_up;
        if self.current == ControlPhase::WarmingUp && over {
            return self.transition_to(ControlPhase::Ready).ok();
        }
        None
    }

    /// Transition to `target`, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPhaseTransition` if the transition is not allowed from
    /// the current phase.
    pub fn transition_to(&mut self, target: ControlPhase) -> Result<PhaseTransition> {
        if !self.current.can_transition_to(&target) {
            return Err(Error::InvalidPhaseTransition {
                from: self.current.to_string(),
                to: target.to_string(),
            });
        }

        let transition = PhaseTransition {
            from: self.current,
            to: target,
            at: Instant::now(),
        };
        self.current = target;
        self.transition = Some(transition);
        Ok(transition)
    }
}
