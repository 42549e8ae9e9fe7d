//! Zone context and readiness snapshots consumed by the coordinator.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Field-zone flags produced every tick by the external classifier.
///
/// Mutual exclusivity of the zone flags is the classifier's responsibility;
/// any combination is accepted here and resolved by the shot priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneContext {
    pub in_trench_zone: bool,
    pub in_alliance_zone: bool,
    pub in_neutral_zone: bool,
    pub in_opponent_zone: bool,
    pub field_ready: bool,
}

bitflags! {
    /// Inputs that vetoed firing on a given tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ReadinessVeto: u8 {
        /// Shooter flywheel not at speed.
        const SHOOTER = 0x01;
        /// Turret not holding its target angle.
        const TURRET  = 0x02;
        /// Hood not at its setpoint.
        const HOOD    = 0x04;
        /// Field context unresolved.
        const FIELD   = 0x08;
    }
}

impl Default for ReadinessVeto {
    fn default() -> Self {
        Self::empty()
    }
}

/// Per-subsystem "at setpoint" predicates plus field readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ReadinessSnapshot {
    pub shooter_ready: bool,
    pub turret_ready: bool,
    pub hood_ready: bool,
    pub field_ready: bool,
}

impl ReadinessSnapshot {
    pub const fn new(shooter_ready: bool, turret_ready: bool, hood_ready: bool, field_ready: bool) -> Self {
        Self {
            shooter_ready,
            turret_ready,
            hood_ready,
            field_ready,
        }
    }

    /// Set of inputs that are currently false.
    pub fn vetoes(&self) -> ReadinessVeto {
        let mut v = ReadinessVeto::empty();
        v.set(ReadinessVeto::SHOOTER, !self.shooter_ready);
        v.set(ReadinessVeto::TURRET, !self.turret_ready);
        v.set(ReadinessVeto::HOOD, !self.hood_ready);
        v.set(ReadinessVeto::FIELD, !self.field_ready);
        v
    }
}
