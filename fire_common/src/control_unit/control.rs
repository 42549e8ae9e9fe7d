//! Turret control parameters.
//!
//! The forbidden-zone geometry is fixed at compile time; gains, output limit
//! and tolerance are live-tunable and re-read into a fresh
//! [`TurretSafetyConfig`] every tick.

use serde::{Deserialize, Serialize};

use crate::consts::{FORBIDDEN_BUFFER_DEG, FORBIDDEN_LIMIT_DEG};

/// Default proportional gain [percent / deg].
pub const TURRET_KP_DEFAULT: f64 = 0.02;
/// Default output limit [percent].
pub const TURRET_MAX_OUTPUT_DEFAULT: f64 = 0.4;
/// Default position deadband [deg].
pub const TURRET_TOLERANCE_DEG_DEFAULT: f64 = 2.0;

/// Current and commanded turret heading for one tick.
///
/// Both angles are elements of ℝ/360°; any real value is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TurretPose {
    /// Encoder reading [deg].
    pub current_angle_deg: f64,
    /// Operator/autonomous target [deg].
    pub target_angle_deg: f64,
}

impl TurretPose {
    pub const fn new(current_angle_deg: f64, target_angle_deg: f64) -> Self {
        Self {
            current_angle_deg,
            target_angle_deg,
        }
    }
}

/// Per-tick turret safety and control parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurretSafetyConfig {
    /// Wiring limit [deg].
    pub forbidden_limit_deg: f64,
    /// Margin kept clear of the wiring limit [deg].
    pub forbidden_buffer_deg: f64,
    /// Proportional gain [percent / deg].
    pub kp: f64,
    /// Symmetric output limit [percent].
    pub max_output: f64,
    /// Deadband half-width [deg].
    pub tolerance_deg: f64,
}

impl Default for TurretSafetyConfig {
    fn default() -> Self {
        Self::new(
            TURRET_KP_DEFAULT,
            TURRET_MAX_OUTPUT_DEFAULT,
            TURRET_TOLERANCE_DEG_DEFAULT,
        )
    }
}

impl TurretSafetyConfig {
    /// Build from live-tuned values; limit and buffer come from constants.
    pub const fn new(kp: f64, max_output: f64, tolerance_deg: f64) -> Self {
        Self {
            forbidden_limit_deg: FORBIDDEN_LIMIT_DEG,
            forbidden_buffer_deg: FORBIDDEN_BUFFER_DEG,
            kp,
            max_output,
            tolerance_deg,
        }
    }

    /// Largest target magnitude the turret may settle at [deg].
    #[inline]
    pub fn max_allowed_deg(&self) -> f64 {
        self.forbidden_limit_deg - self.forbidden_buffer_deg
    }
}
