//! TOML configuration loader with validation.
//!
//! One file carries the shared section, the control-unit section, live
//! tunable overrides and the simulator setup:
//!
//! ```toml
//! [shared]
//! service_name = "fire-control"
//!
//! [control_unit]
//! cycle_time_us = 20000
//! clamp_ordering = "clamp_before_delta"
//!
//! [tunables]
//! "Turret/kP" = 0.025
//!
//! [sim.zone]
//! in_alliance_zone = true
//! field_ready = true
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use fire_common::config::{ConfigError, ConfigLoader, SharedConfig, Validate};
use fire_common::control_unit::config::ControlUnitConfig;
use fire_common::control_unit::zone::ZoneContext;
use serde::{Deserialize, Serialize};

use crate::sim::SIM_FREE_SPEED_RPS;

// ─── Sections ───────────────────────────────────────────────────────

/// Simulated hardware setup (`[sim]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Zone flags reported by the simulated classifier.
    pub zone: ZoneContext,
    /// Whether the simulated hood reports "at setpoint".
    pub hood_ready: bool,
    /// Turret slew rate at 100 % output [deg/s].
    pub turret_slew_deg_per_s: f64,
    /// Turret joint angle at startup [deg].
    pub initial_turret_deg: f64,
    /// Free speed of the simulated roller and flywheel motors [rps].
    pub motor_free_speed_rps: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            zone: ZoneContext::default(),
            hood_ready: true,
            turret_slew_deg_per_s: 360.0,
            initial_turret_deg: 0.0,
            motor_free_speed_rps: SIM_FREE_SPEED_RPS,
        }
    }
}

impl Validate for SimConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.turret_slew_deg_per_s.is_finite() && self.turret_slew_deg_per_s >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "sim.turret_slew_deg_per_s must be finite and non-negative, got {}",
                self.turret_slew_deg_per_s
            )));
        }
        if !self.initial_turret_deg.is_finite() {
            return Err(ConfigError::ValidationError(
                "sim.initial_turret_deg must be finite".to_string(),
            ));
        }
        if !(self.motor_free_speed_rps.is_finite() && self.motor_free_speed_rps > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "sim.motor_free_speed_rps must be positive, got {}",
                self.motor_free_speed_rps
            )));
        }
        Ok(())
    }
}

/// Complete fire-control configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct FireControlConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub control_unit: ControlUnitConfig,
    /// Overrides applied to the tunable store after startup.
    #[serde(default)]
    pub tunables: BTreeMap<String, f64>,
    #[serde(default)]
    pub sim: SimConfig,
}

impl Validate for FireControlConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.control_unit.validate()?;
        if let Some((key, value)) = self.tunables.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "tunable '{key}' has non-finite value {value}"
            )));
        }
        self.sim.validate()
    }
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the configuration file.
pub fn load_config(path: &Path) -> Result<FireControlConfig, ConfigError> {
    FireControlConfig::load_validated(path)
}

/// Parse and validate an in-memory configuration document.
pub fn load_config_from_str(content: &str) -> Result<FireControlConfig, ConfigError> {
    let config = FireControlConfig::from_toml_str(content)?;
    config.validate()?;
    Ok(config)
}

// ─── Tests ──────────────────────────────────────────────────────────
