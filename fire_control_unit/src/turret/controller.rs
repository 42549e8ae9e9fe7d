//! Turret safe controller: shortest-path proportional tracking with a
//! forbidden-zone clamp near the wiring limit.

use fire_common::angle::{normalize_signed, wrap_delta};
use fire_common::control_unit::control::{TurretPose, TurretSafetyConfig};
use fire_common::control_unit::state::{ClampOrdering, TurretMode};
use tracing::debug;

use crate::control::proportional::{ProportionalGains, proportional_compute, within_deadband};

/// Intermediate values of the forbidden-zone computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeDelta {
    pub current_deg: f64,
    pub target_deg: f64,
    /// Target limited to `±(limit − buffer)`.
    pub safe_target_deg: f64,
    /// Rotation that drives the motor this tick.
    pub delta_deg: f64,
}

/// Limit a normalized target to `±max_allowed_deg`.
#[inline]
pub fn clamp_to_safe_range(target_deg: f64, max_allowed_deg: f64) -> f64 {
    if target_deg.abs() > max_allowed_deg {
        max_allowed_deg.copysign(target_deg)
    } else {
        target_deg
    }
}

/// Normalize both angles, clamp the target, and derive the driving delta.
///
/// With [`ClampOrdering::ClampBeforeDelta`] the delta is taken to the clamped
/// target. With [`ClampOrdering::Legacy`] the clamp is still computed (and
/// reported) but the delta is taken to the raw target, so a target inside the
/// forbidden buffer is tracked anyway.
///
/// The clamp only bounds where the turret settles. Under either ordering the
/// delta is the shortest path, so moving between `170°` and `-170°` rotates
/// through the `±180°` wiring limit rather than the long way around.
pub fn compute_safe_delta(
    pose: &TurretPose,
    config: &TurretSafetyConfig,
    ordering: ClampOrdering,
) -> SafeDelta {
    let current_deg = normalize_signed(pose.current_angle_deg);
    let target_deg = normalize_signed(pose.target_angle_deg);
    let safe_target_deg = clamp_to_safe_range(target_deg, config.max_allowed_deg());

    let delta_deg = match ordering {
        ClampOrdering::ClampBeforeDelta => wrap_delta(safe_target_deg - current_deg),
        ClampOrdering::Legacy => wrap_delta(target_deg - current_deg),
    };

    SafeDelta {
        current_deg,
        target_deg,
        safe_target_deg,
        delta_deg,
    }
}

/// Result of one controller tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurretOutput {
    pub mode: TurretMode,
    pub delta: SafeDelta,
    /// Percent command issued this tick. `None` in `Disabled`: the last
    /// command (zero or manual) stands.
    pub command: Option<f64>,
}

/// `Disabled ↔ ClosedLoop` turret state machine.
#[derive(Debug, Clone)]
pub struct TurretSafeController {
    mode: TurretMode,
    ordering: ClampOrdering,
    last_command: Option<f64>,
    at_setpoint: bool,
}

impl Default for TurretSafeController {
    fn default() -> Self {
        Self::new(ClampOrdering::default())
    }
}

impl TurretSafeController {
    pub const fn new(ordering: ClampOrdering) -> Self {
        Self {
            mode: TurretMode::Disabled,
            ordering,
            last_command: None,
            at_setpoint: false,
        }
    }

    #[inline]
    pub const fn mode(&self) -> TurretMode {
        self.mode
    }

    #[inline]
    pub const fn ordering(&self) -> ClampOrdering {
        self.ordering
    }

    /// Last percent command issued, by a tick or by a mode transition.
    #[inline]
    pub const fn last_command(&self) -> Option<f64> {
        self.last_command
    }

    /// Closed loop and the last delta was inside the tolerance.
    #[inline]
    pub const fn at_setpoint(&self) -> bool {
        self.at_setpoint
    }

    pub fn enable_closed_loop(&mut self) {
        self.transition(TurretMode::ClosedLoop);
    }

    /// Enter `Disabled` and return the zero command to forward immediately.
    pub fn disable(&mut self) -> f64 {
        self.transition(TurretMode::Disabled);
        self.at_setpoint = false;
        self.last_command = Some(0.0);
        0.0
    }

    /// Manual override: enter `Disabled` and return `percent` unchanged.
    pub fn set_manual_percent(&mut self, percent: f64) -> f64 {
        self.transition(TurretMode::Disabled);
        self.at_setpoint = false;
        self.last_command = Some(percent);
        percent
    }

    /// Run one tick of the control law.
    pub fn tick(&mut self, pose: &TurretPose, config: &TurretSafetyConfig) -> TurretOutput {
        let delta = compute_safe_delta(pose, config, self.ordering);

        let command = match self.mode {
            TurretMode::Disabled => None,
            TurretMode::ClosedLoop => {
                let gains = ProportionalGains {
                    kp: config.kp,
                    out_max: config.max_output,
                    deadband: config.tolerance_deg,
                };
                self.at_setpoint = within_deadband(&gains, delta.delta_deg);
                Some(proportional_compute(&gains, delta.delta_deg))
            }
        };
        if command.is_some() {
            self.last_command = command;
        }

        TurretOutput {
            mode: self.mode,
            delta,
            command,
        }
    }

    fn transition(&mut self, to: TurretMode) {
        if self.mode != to {
            debug!(from = ?self.mode, to = ?to, "turret mode transition");
            self.mode = to;
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
