//! Turret subsystem.
//!
//! [`TurretSafeController`] is the pure per-tick control law with its
//! `Disabled ↔ ClosedLoop` state machine. [`Turret`] binds it to the turret
//! motor, the absolute encoder and the live tunables.

mod controller;
mod mechanism;

pub use controller::{SafeDelta, TurretOutput, TurretSafeController, clamp_to_safe_range, compute_safe_delta};
pub use mechanism::{
    KEY_KP, KEY_MAX_OUTPUT, KEY_TARGET_DEG, KEY_TOLERANCE_DEG, TURRET_MOTOR_CONFIG, Turret, TurretTunables,
};
