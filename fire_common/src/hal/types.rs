//! Motor controller configuration and feedback types.
//!
//! Configuration is applied once at startup (neutral mode, current limits)
//! and again whenever a live-tuned current limit changes.

use serde::{Deserialize, Serialize};

/// Behaviour of a motor when commanded to zero output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NeutralMode {
    /// Windings open, mechanism spins down freely.
    #[default]
    Coast,
    /// Windings shorted, mechanism holds.
    Brake,
}

/// Supply/stator current limits [A]. `None` leaves the limit disabled.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentLimits {
    pub supply_amps: Option<f64>,
    pub stator_amps: Option<f64>,
}

impl CurrentLimits {
    pub const fn supply(amps: f64) -> Self {
        Self {
            supply_amps: Some(amps),
            stator_amps: None,
        }
    }

    pub const fn supply_and_stator(supply: f64, stator: f64) -> Self {
        Self {
            supply_amps: Some(supply),
            stator_amps: Some(stator),
        }
    }
}

/// Static motor configuration applied at startup.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotorConfig {
    pub neutral_mode: NeutralMode,
    pub current_limits: CurrentLimits,
    /// Reverse the positive direction of the output shaft.
    #[serde(default)]
    pub inverted: bool,
}

impl MotorConfig {
    pub const fn new(neutral_mode: NeutralMode, current_limits: CurrentLimits) -> Self {
        Self {
            neutral_mode,
            current_limits,
            inverted: false,
        }
    }
}

/// Closed-loop velocity gains pushed to a smart motor controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

/// Measured quantities reported by a motor controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorFeedback {
    /// Rotor velocity [rev/s].
    pub velocity_rps: f64,
    /// Supply-side current [A].
    pub supply_current: f64,
    /// Stator current [A].
    pub stator_current: f64,
    /// Voltage currently applied to the motor [V].
    pub applied_volts: f64,
}

impl MotorFeedback {
    #[inline]
    pub fn velocity_rpm(&self) -> f64 {
        self.velocity_rps * 60.0
    }
}
