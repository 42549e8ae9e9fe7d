//! Collaborator traits for motor controllers, sensors and field inputs.
//!
//! # Call contract
//!
//! | Operation | When | Failure handling |
//! |-----------|------|------------------|
//! | `configure()` | once at startup | propagated to the caller |
//! | `set_percent()` / `set_velocity_rps()` | every tick | logged, never retried |
//! | `apply_current_limits()` / `apply_gains()` | on tunable change | logged |
//! | `read_angle_deg()` / `feedback()` | every tick | no error channel |
//!
//! Writes are fire-and-forget: the core re-issues its command every tick, so
//! a dropped write is corrected on the next one.

use thiserror::Error;

use super::types::{CurrentLimits, MotorConfig, MotorFeedback, VelocityGains};
use crate::control_unit::zone::ZoneContext;

/// Error types for actuator operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActuatorError {
    /// Bus or device communication failed.
    #[error("device {device}: communication error: {detail}")]
    Communication { device: u8, detail: String },

    /// Configuration was refused by the device.
    #[error("device {device}: configuration rejected: {detail}")]
    Config { device: u8, detail: String },

    /// The command value was refused (e.g. out of range or NaN).
    #[error("device {device}: command {value} rejected")]
    Rejected { device: u8, value: f64 },
}

/// A motor driven by percentage output in `[-1, 1]`.
pub trait MotorController {
    /// Bus address of the device, for diagnostics.
    fn device_id(&self) -> u8;

    /// Apply neutral mode and current limits. Called once before the loop.
    fn configure(&mut self, config: &MotorConfig) -> Result<(), ActuatorError>;

    /// Command a percentage of the nominal supply voltage.
    fn set_percent(&mut self, percent: f64) -> Result<(), ActuatorError>;

    /// Replace the current limits at runtime.
    fn apply_current_limits(&mut self, limits: CurrentLimits) -> Result<(), ActuatorError>;

    /// Latest measured quantities.
    fn feedback(&self) -> MotorFeedback;
}

/// A motor controller that also closes a velocity loop on-device.
pub trait VelocityMotor: MotorController {
    /// Command a rotor velocity [rev/s].
    fn set_velocity_rps(&mut self, rps: f64) -> Result<(), ActuatorError>;

    /// Replace the on-device velocity gains.
    fn apply_gains(&mut self, gains: VelocityGains) -> Result<(), ActuatorError>;

    /// Command a raw voltage, leaving closed-loop control.
    fn set_volts(&mut self, volts: f64) -> Result<(), ActuatorError>;
}

/// Absolute angle sensor.
pub trait AngleSensor {
    /// Absolute angle [deg], nominally in `[0, 360)`.
    fn read_angle_deg(&mut self) -> f64;
}

/// Upstream classifiers that are not part of this core.
pub trait ExternalInputs {
    /// Zone/health snapshot for this tick.
    fn zone_context(&mut self) -> ZoneContext;

    /// Whether the hood currently holds its commanded setpoint.
    fn hood_at_setpoint(&mut self) -> bool;
}
