//! Configuration structures for the fire-control unit.
//!
//! All config types use `serde::Deserialize` for TOML loading. Optional
//! fields use `#[serde(default)]` so older files keep loading.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Validate};
use crate::consts::{CYCLE_TIME_US, CYCLE_TIME_US_MAX, CYCLE_TIME_US_MIN};

use super::state::ClampOrdering;

/// Top-level control-unit section (`[control_unit]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlUnitConfig {
    /// Control tick period in microseconds (default: 20 000 = 50 Hz).
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u64,

    /// Forbidden-zone clamp ordering for the turret controller.
    #[serde(default)]
    pub clamp_ordering: ClampOrdering,

    /// Bus addresses of the controlled devices.
    #[serde(default)]
    pub devices: DeviceIds,
}

fn default_cycle_time_us() -> u64 {
    CYCLE_TIME_US
}

impl Default for ControlUnitConfig {
    fn default() -> Self {
        Self {
            cycle_time_us: CYCLE_TIME_US,
            clamp_ordering: ClampOrdering::default(),
            devices: DeviceIds::default(),
        }
    }
}

impl Validate for ControlUnitConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(CYCLE_TIME_US_MIN..=CYCLE_TIME_US_MAX).contains(&self.cycle_time_us) {
            return Err(ConfigError::ValidationError(format!(
                "cycle_time_us {} out of range [{}, {}]",
                self.cycle_time_us, CYCLE_TIME_US_MIN, CYCLE_TIME_US_MAX
            )));
        }
        self.devices.validate()
    }
}

/// Device bus addresses (`[control_unit.devices]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceIds {
    pub turret_motor: u8,
    pub turret_encoder: u8,
    pub shooter_leader: u8,
    pub shooter_follower: u8,
    pub loader: u8,
    pub spindexer: u8,
    pub intake_arm_leader: u8,
    pub intake_arm_follower: u8,
    pub intake_roller_left: u8,
    pub intake_roller_right: u8,
}

impl Default for DeviceIds {
    fn default() -> Self {
        Self {
            turret_motor: 20,
            turret_encoder: 21,
            shooter_leader: 10,
            shooter_follower: 11,
            loader: 30,
            spindexer: 40,
            intake_arm_leader: 50,
            intake_arm_follower: 51,
            intake_roller_left: 52,
            intake_roller_right: 53,
        }
    }
}

impl DeviceIds {
    fn all(&self) -> [(&'static str, u8); 10] {
        [
            ("turret_motor", self.turret_motor),
            ("turret_encoder", self.turret_encoder),
            ("shooter_leader", self.shooter_leader),
            ("shooter_follower", self.shooter_follower),
            ("loader", self.loader),
            ("spindexer", self.spindexer),
            ("intake_arm_leader", self.intake_arm_leader),
            ("intake_arm_follower", self.intake_arm_follower),
            ("intake_roller_left", self.intake_roller_left),
            ("intake_roller_right", self.intake_roller_right),
        ]
    }
}

impl Validate for DeviceIds {
    /// Every device must have a distinct address.
    fn validate(&self) -> Result<(), ConfigError> {
        let all = self.all();
        for (i, (name_a, id_a)) in all.iter().enumerate() {
            if let Some((name_b, _)) = all[i + 1..].iter().find(|(_, id_b)| id_b == id_a) {
                return Err(ConfigError::ValidationError(format!(
                    "device id {id_a} used by both {name_a} and {name_b}"
                )));
            }
        }
        Ok(())
    }
}
