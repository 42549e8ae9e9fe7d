//! Proportional controller with position deadband and symmetric output clamp.
//!
//! Zero `deadband` disables the deadband; the clamp always applies.

use fire_common::angle::clamp_symmetric;

/// Gains for the proportional law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionalGains {
    /// Proportional gain [output / error unit].
    pub kp: f64,
    /// Output saturation limit (applied as `±|out_max|`).
    pub out_max: f64,
    /// Errors with magnitude strictly below this produce zero output.
    pub deadband: f64,
}

/// Compute one cycle of the proportional law.
///
/// Returns `0.0` inside the deadband, otherwise `kp * error` clamped to
/// `±out_max`. A NaN error yields a NaN output.
#[inline]
pub fn proportional_compute(gains: &ProportionalGains, error: f64) -> f64 {
    if error.abs() < gains.deadband {
        return 0.0;
    }
    clamp_symmetric(error * gains.kp, gains.out_max)
}

/// Whether `error` lies inside the deadband.
#[inline]
pub fn within_deadband(gains: &ProportionalGains, error: f64) -> bool {
    error.abs() < gains.deadband
}

// ─── Tests ──────────────────────────────────────────────────────────
