//! System-wide constants for the fire-control workspace.
//!
//! Single source of truth for numeric limits, mechanical safety margins and
//! default device addresses. Imported by all crates; never duplicated.

use static_assertions::const_assert;

/// Default control tick period in microseconds (50 Hz = 20 000 µs).
pub const CYCLE_TIME_US: u64 = 20_000;

/// Fastest accepted control tick period [µs].
pub const CYCLE_TIME_US_MIN: u64 = 1_000;

/// Slowest accepted control tick period [µs].
pub const CYCLE_TIME_US_MAX: u64 = 100_000;

/// Nominal battery voltage used to turn a percentage into a voltage command.
pub const NOMINAL_BATTERY_VOLTS: f64 = 12.0;

/// Turret wiring limit, measured from the turret's zero heading [deg].
pub const FORBIDDEN_LIMIT_DEG: f64 = 180.0;

/// Safety margin kept clear of the wiring limit [deg].
pub const FORBIDDEN_BUFFER_DEG: f64 = 5.0;

/// Minimum change of a live-tuned gain or current limit before it is re-applied
/// to a motor controller.
pub const TUNABLE_CHANGE_EPSILON: f64 = 1e-6;

/// Maximum number of telemetry entries buffered per tick.
pub const TELEMETRY_FRAME_CAPACITY: usize = 64;

/// Maximum number of commander messages drained per tick.
pub const MAX_COMMANDS_PER_TICK: usize = 32;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/fire_control.toml";

const_assert!(FORBIDDEN_BUFFER_DEG > 0.0 && FORBIDDEN_BUFFER_DEG < FORBIDDEN_LIMIT_DEG);
const_assert!(CYCLE_TIME_US_MIN <= CYCLE_TIME_US && CYCLE_TIME_US <= CYCLE_TIME_US_MAX);
const_assert!(TELEMETRY_FRAME_CAPACITY >= 32);
