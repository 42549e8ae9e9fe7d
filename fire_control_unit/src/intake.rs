//! Intake: deploy/retract arm and a pair of rollers, all open-loop.

use fire_common::consts::TUNABLE_CHANGE_EPSILON;
use fire_common::hal::driver::{ActuatorError, MotorController};
use fire_common::hal::types::{CurrentLimits, MotorConfig, NeutralMode};
use fire_common::telemetry::TelemetrySink;
use fire_common::tunables::{ChangeTracker, Tunable, TunableStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Arm drive request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmAction {
    Deploy,
    Retract,
    Stop,
}

/// Roller drive request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollerAction {
    Intake,
    Outtake,
    Hold,
    Stop,
}

pub const KEY_ARM_DEPLOY: &str = "Intake/ArmDeployPercent";
pub const KEY_ARM_RETRACT: &str = "Intake/ArmRetractPercent";
pub const KEY_ARM_SUPPLY_LIMIT: &str = "Intake/ArmSupplyLimit";
pub const KEY_ROLLER_INTAKE: &str = "Intake/RollerIntakePercent";
pub const KEY_ROLLER_OUTTAKE: &str = "Intake/RollerOuttakePercent";
pub const KEY_ROLLER_HOLD: &str = "Intake/RollerHoldPercent";

const ARM_SUPPLY_LIMIT_DEFAULT: f64 = 40.0;

fn arm_config(supply_amps: f64) -> MotorConfig {
    MotorConfig::new(NeutralMode::Brake, CurrentLimits::supply(supply_amps))
}

/// Two motors driven with the same command.
struct MotorPair {
    leader: Box<dyn MotorController>,
    follower: Box<dyn MotorController>,
    percent: f64,
}

impl MotorPair {
    fn configure(&mut self, config: MotorConfig, follower_inverted: bool) -> Result<(), ActuatorError> {
        self.leader.configure(&config)?;
        self.follower.configure(&MotorConfig {
            inverted: follower_inverted,
            ..config
        })
    }

    fn set_percent(&mut self, percent: f64, label: &'static str) {
        self.percent = percent;
        for motor in [&mut self.leader, &mut self.follower] {
            if let Err(e) = motor.set_percent(percent) {
                warn!(label, percent, "intake command failed: {e}");
            }
        }
    }
}

pub struct Intake {
    arm: MotorPair,
    rollers: MotorPair,
    arm_deploy: Tunable,
    arm_retract: Tunable,
    arm_supply_limit: Tunable,
    roller_intake: Tunable,
    roller_outtake: Tunable,
    roller_hold: Tunable,
    arm_limit_tracker: ChangeTracker,
}

impl Intake {
    pub fn new(
        arm_leader: Box<dyn MotorController>,
        arm_follower: Box<dyn MotorController>,
        roller_left: Box<dyn MotorController>,
        roller_right: Box<dyn MotorController>,
        store: &TunableStore,
    ) -> Result<Self, ActuatorError> {
        let arm_supply_limit = store.register(KEY_ARM_SUPPLY_LIMIT, ARM_SUPPLY_LIMIT_DEFAULT);
        let initial_limit = arm_supply_limit.get();

        let mut arm = MotorPair {
            leader: arm_leader,
            follower: arm_follower,
            percent: 0.0,
        };
        arm.configure(arm_config(initial_limit), true)?;
        // Rollers keep their device defaults and start stopped. Both are
        // driven with the same signed percent.
        let mut rollers = MotorPair {
            leader: roller_left,
            follower: roller_right,
            percent: 0.0,
        };
        rollers.set_percent(0.0, "rollers");
        info!(
            arm = arm.leader.device_id(),
            rollers = rollers.leader.device_id(),
            "intake configured"
        );

        Ok(Self {
            arm,
            rollers,
            arm_deploy: store.register(KEY_ARM_DEPLOY, 0.5),
            arm_retract: store.register(KEY_ARM_RETRACT, -0.5),
            arm_supply_limit,
            roller_intake: store.register(KEY_ROLLER_INTAKE, 0.7),
            roller_outtake: store.register(KEY_ROLLER_OUTTAKE, -0.6),
            roller_hold: store.register(KEY_ROLLER_HOLD, 0.1),
            arm_limit_tracker: ChangeTracker::new(initial_limit, TUNABLE_CHANGE_EPSILON),
        })
    }

    #[inline]
    pub const fn arm_percent(&self) -> f64 {
        self.arm.percent
    }

    #[inline]
    pub const fn roller_percent(&self) -> f64 {
        self.rollers.percent
    }

    pub fn deploy(&mut self) {
        self.apply_arm(ArmAction::Deploy);
    }

    pub fn retract(&mut self) {
        self.apply_arm(ArmAction::Retract);
    }

    pub fn stop_arm(&mut self) {
        self.apply_arm(ArmAction::Stop);
    }

    pub fn intake(&mut self) {
        self.apply_rollers(RollerAction::Intake);
    }

    pub fn outtake(&mut self) {
        self.apply_rollers(RollerAction::Outtake);
    }

    pub fn hold(&mut self) {
        self.apply_rollers(RollerAction::Hold);
    }

    pub fn stop_rollers(&mut self) {
        self.apply_rollers(RollerAction::Stop);
    }

    pub fn apply_arm(&mut self, action: ArmAction) {
        let percent = match action {
            ArmAction::Deploy => self.arm_deploy.get(),
            ArmAction::Retract => self.arm_retract.get(),
            ArmAction::Stop => 0.0,
        };
        debug!(?action, percent, "intake arm");
        self.arm.set_percent(percent, "arm");
    }

    pub fn apply_rollers(&mut self, action: RollerAction) {
        let percent = match action {
            RollerAction::Intake => self.roller_intake.get(),
            RollerAction::Outtake => self.roller_outtake.get(),
            RollerAction::Hold => self.roller_hold.get(),
            RollerAction::Stop => 0.0,
        };
        debug!(?action, percent, "intake rollers");
        self.rollers.set_percent(percent, "rollers");
    }

    /// Live-update the arm current limit and record telemetry.
    pub fn periodic(&mut self, telemetry: &mut dyn TelemetrySink) {
        if let Some(amps) = self.arm_limit_tracker.update(self.arm_supply_limit.get()) {
            let limits = CurrentLimits::supply(amps);
            for motor in [&mut self.arm.leader, &mut self.arm.follower] {
                if let Err(e) = motor.apply_current_limits(limits) {
                    warn!(amps, "intake arm limit update failed: {e}");
                }
            }
            debug!(amps, "intake arm supply limit updated");
        }

        telemetry.record_number("Intake/ArmPercent", self.arm.percent);
        telemetry.record_number("Intake/ArmSupplyCurrent", self.arm.leader.feedback().supply_current);
        telemetry.record_number("Intake/RollerPercent", self.rollers.percent);
        telemetry.record_number("Intake/RollerLeftCurrent", self.rollers.leader.feedback().stator_current);
        telemetry.record_number("Intake/RollerRightCurrent", self.rollers.follower.feedback().stator_current);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
