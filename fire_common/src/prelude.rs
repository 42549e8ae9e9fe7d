//! Prelude module for common re-exports.
//!
//! ```rust
//! use fire_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, Validate};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME_US, FORBIDDEN_BUFFER_DEG, FORBIDDEN_LIMIT_DEG};

// ─── Shared Types ───────────────────────────────────────────────────
pub use crate::control_unit::control::{TurretPose, TurretSafetyConfig};
pub use crate::control_unit::state::{
    ClampOrdering, FeedCommand, FeedState, ShootingMode, ShotType, TurretMode,
};
pub use crate::control_unit::zone::{ReadinessSnapshot, ReadinessVeto, ZoneContext};

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::hal::driver::{
    ActuatorError, AngleSensor, ExternalInputs, MotorController, VelocityMotor,
};
pub use crate::hal::types::{CurrentLimits, MotorConfig, MotorFeedback, NeutralMode};

// ─── Telemetry & Tunables ───────────────────────────────────────────
pub use crate::telemetry::{FrameSink, TelemetryFrame, TelemetrySink, TelemetryValue};
pub use crate::tunables::{Tunable, TunableStore};

/// Default control tick period as Duration.
pub const DEFAULT_CYCLE_TIME: Duration = Duration::from_micros(CYCLE_TIME_US);
