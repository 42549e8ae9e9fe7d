//! State enums for the fire-control core.
//!
//! All enums use `#[repr(u8)]` for a compact layout and provide `from_u8`
//! for decoding dashboard/log values, plus `as_str` for telemetry labels.

use serde::{Deserialize, Serialize};

// ─── Coordinator ────────────────────────────────────────────────────

/// Shot decision derived from zone context, recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ShotType {
    /// No valid shot: insufficient information or no matching zone.
    #[default]
    None = 0,
    /// Full shot at the alliance goal.
    Shoot = 1,
    /// Pass toward the alliance side.
    Pass = 2,
    /// Hard interlock: firing is disallowed.
    Blocked = 3,
}

impl ShotType {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Shoot),
            2 => Some(Self::Pass),
            3 => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Whether this shot type permits feeding.
    #[inline]
    pub const fn permits_feed(self) -> bool {
        matches!(self, Self::Shoot | Self::Pass)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Shoot => "SHOOT",
            Self::Pass => "PASS",
            Self::Blocked => "BLOCKED",
        }
    }
}

/// Aiming mode chosen by the commander. Recorded, not acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ShootingMode {
    #[default]
    Manual = 0,
    AutoAim = 1,
}

impl ShootingMode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Manual),
            1 => Some(Self::AutoAim),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::AutoAim => "AUTO_AIM",
        }
    }
}

// ─── Feed path ──────────────────────────────────────────────────────

/// Feed gate state. Reset to `Stopped` at startup, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum FeedState {
    #[default]
    Stopped = 0,
    Feeding = 1,
}

impl FeedState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Stopped),
            1 => Some(Self::Feeding),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "STOPPED",
            Self::Feeding => "FEEDING",
        }
    }
}

/// Command forwarded to both feed-path actuators every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FeedCommand {
    Stop = 0,
    Feed = 1,
}

impl FeedCommand {
    /// Gate state that results from issuing this command.
    #[inline]
    pub const fn resulting_state(self) -> FeedState {
        match self {
            Self::Stop => FeedState::Stopped,
            Self::Feed => FeedState::Feeding,
        }
    }
}

// ─── Turret ─────────────────────────────────────────────────────────

/// Turret controller mode. Initial state is `Disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum TurretMode {
    /// No position tracking; the last explicit command stands.
    #[default]
    Disabled = 0,
    /// Proportional position tracking toward the target angle.
    ClosedLoop = 1,
}

impl TurretMode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::ClosedLoop),
            _ => None,
        }
    }
}

/// Order in which the forbidden-zone clamp and the shortest-path delta are
/// evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClampOrdering {
    /// Clamp the target to the safe range, then derive the delta from it.
    #[default]
    ClampBeforeDelta,
    /// Derive the delta from the unclamped target. The clamped target is
    /// computed and reported but does not influence the output.
    Legacy,
}
