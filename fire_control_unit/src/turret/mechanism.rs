//! Turret mechanism: motor, absolute encoder and live tunables around the
//! safe controller.

use fire_common::control_unit::control::{
    TURRET_KP_DEFAULT, TURRET_MAX_OUTPUT_DEFAULT, TURRET_TOLERANCE_DEG_DEFAULT, TurretPose,
    TurretSafetyConfig,
};
use fire_common::control_unit::state::{ClampOrdering, TurretMode};
use fire_common::hal::driver::{ActuatorError, AngleSensor, MotorController};
use fire_common::hal::types::{CurrentLimits, MotorConfig, NeutralMode};
use fire_common::telemetry::TelemetrySink;
use fire_common::tunables::{Tunable, TunableStore};
use tracing::{debug, info, warn};

use super::controller::{TurretOutput, TurretSafeController};

/// Startup configuration of the turret motor.
pub const TURRET_MOTOR_CONFIG: MotorConfig =
    MotorConfig::new(NeutralMode::Coast, CurrentLimits::supply(25.0));

pub const KEY_TARGET_DEG: &str = "Turret/TargetDeg";
pub const KEY_KP: &str = "Turret/kP";
pub const KEY_MAX_OUTPUT: &str = "Turret/MaxOutput";
pub const KEY_TOLERANCE_DEG: &str = "Turret/ToleranceDeg";

/// Read handles for the turret tunables.
#[derive(Debug, Clone)]
pub struct TurretTunables {
    pub target_deg: Tunable,
    pub kp: Tunable,
    pub max_output: Tunable,
    pub tolerance_deg: Tunable,
}

impl TurretTunables {
    pub fn register(store: &TunableStore) -> Self {
        Self {
            target_deg: store.register(KEY_TARGET_DEG, 0.0),
            kp: store.register(KEY_KP, TURRET_KP_DEFAULT),
            max_output: store.register(KEY_MAX_OUTPUT, TURRET_MAX_OUTPUT_DEFAULT),
            tolerance_deg: store.register(KEY_TOLERANCE_DEG, TURRET_TOLERANCE_DEG_DEFAULT),
        }
    }

    /// Snapshot of the safety parameters for this tick.
    pub fn safety_config(&self) -> TurretSafetyConfig {
        TurretSafetyConfig::new(
            self.kp.get(),
            self.max_output.get(),
            self.tolerance_deg.get(),
        )
    }
}

pub struct Turret {
    motor: Box<dyn MotorController>,
    encoder: Box<dyn AngleSensor>,
    controller: TurretSafeController,
    tunables: TurretTunables,
    encoder_fault: bool,
}

impl Turret {
    /// Configure the motor and register the tunables.
    pub fn new(
        mut motor: Box<dyn MotorController>,
        encoder: Box<dyn AngleSensor>,
        store: &TunableStore,
        ordering: ClampOrdering,
    ) -> Result<Self, ActuatorError> {
        motor.configure(&TURRET_MOTOR_CONFIG)?;
        info!(device = motor.device_id(), ?ordering, "turret configured");
        Ok(Self {
            motor,
            encoder,
            controller: TurretSafeController::new(ordering),
            tunables: TurretTunables::register(store),
            encoder_fault: false,
        })
    }

    #[inline]
    pub const fn mode(&self) -> TurretMode {
        self.controller.mode()
    }

    #[inline]
    pub const fn at_setpoint(&self) -> bool {
        self.controller.at_setpoint()
    }

    #[inline]
    pub const fn last_command(&self) -> Option<f64> {
        self.controller.last_command()
    }

    pub fn enable_closed_loop(&mut self) {
        self.controller.enable_closed_loop();
    }

    pub fn disable(&mut self) {
        let percent = self.controller.disable();
        self.send(percent);
    }

    pub fn set_manual_percent(&mut self, percent: f64) {
        let percent = self.controller.set_manual_percent(percent);
        self.send(percent);
    }

    /// Read the encoder and tunables once, tick the controller and forward
    /// any command.
    pub fn periodic(&mut self, telemetry: &mut dyn TelemetrySink) -> TurretOutput {
        let current = self.encoder.read_angle_deg();
        self.check_encoder(current);

        let pose = TurretPose::new(current, self.tunables.target_deg.get());
        let config = self.tunables.safety_config();
        let output = self.controller.tick(&pose, &config);

        if let Some(percent) = output.command {
            self.send(percent);
            telemetry.record_number("Turret/Output", percent);
        }
        telemetry.record_number("Turret/CurrentDeg", output.delta.current_deg);
        telemetry.record_number("Turret/TargetDeg", pose.target_angle_deg);
        telemetry.record_number("Turret/SafeTargetDeg", output.delta.safe_target_deg);
        telemetry.record_number("Turret/DeltaDeg", output.delta.delta_deg);
        telemetry.record_bool("Turret/ClosedLoop", output.mode == TurretMode::ClosedLoop);
        telemetry.record_bool("Turret/AtSetpoint", self.controller.at_setpoint());
        output
    }

    fn check_encoder(&mut self, reading: f64) {
        let fault = !reading.is_finite();
        if fault && !self.encoder_fault {
            warn!(reading, "turret encoder returned a non-finite angle");
        } else if !fault && self.encoder_fault {
            debug!(reading, "turret encoder reading recovered");
        }
        self.encoder_fault = fault;
    }

    fn send(&mut self, percent: f64) {
        if let Err(e) = self.motor.set_percent(percent) {
            warn!(percent, "turret command failed: {e}");
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
