//! Angle arithmetic on the circle group ℝ/360°.
//!
//! All functions are pure and allocation-free. Non-finite inputs are not
//! filtered: a NaN or infinite angle produces a NaN result, which the caller
//! must treat as an invalid reading.

use crate::consts::NOMINAL_BATTERY_VOLTS;

/// Normalize an angle into the signed range `[-180, 180)` degrees.
///
/// Uses the truncated remainder (`x % 360`), then shifts the result into
/// range, so `normalize_signed(normalize_signed(x)) == normalize_signed(x)`.
#[inline]
pub fn normalize_signed(degrees: f64) -> f64 {
    let mut angle = degrees % 360.0;
    if angle >= 180.0 {
        angle -= 360.0;
    }
    if angle < -180.0 {
        angle += 360.0;
    }
    angle
}

/// Signed shortest rotation from `current` to `target`, magnitude ≤ 180°.
///
/// Both angles are normalized first, so any real inputs are accepted.
#[inline]
pub fn shortest_delta(current_deg: f64, target_deg: f64) -> f64 {
    wrap_delta(normalize_signed(target_deg) - normalize_signed(current_deg))
}

/// Fold a difference of two normalized angles back into `[-180, 180]`.
#[inline]
pub fn wrap_delta(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Clamp `value` into `[-|limit|, |limit|]`.
///
/// Unlike `f64::clamp` this never panics on a bad limit and lets NaN pass
/// through unchanged.
#[inline]
pub fn clamp_symmetric(value: f64, limit: f64) -> f64 {
    let abs_limit = limit.abs();
    if value > abs_limit {
        abs_limit
    } else if value < -abs_limit {
        -abs_limit
    } else {
        value
    }
}

/// Convert a percentage output in `[-1, 1]` to a voltage command.
#[inline]
pub fn percent_to_volts(percent: f64) -> f64 {
    percent * NOMINAL_BATTERY_VOLTS
}

// ─── Tests ──────────────────────────────────────────────────────────
