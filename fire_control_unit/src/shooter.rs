//! Flywheel shooter: leader/follower pair under onboard velocity control.

use fire_common::consts::TUNABLE_CHANGE_EPSILON;
use fire_common::hal::driver::{ActuatorError, VelocityMotor};
use fire_common::hal::types::{CurrentLimits, MotorConfig, MotorFeedback, NeutralMode, VelocityGains};
use fire_common::telemetry::TelemetrySink;
use fire_common::tunables::{ChangeTracker, Tunable, TunableStore};
use tracing::{debug, info, warn};

pub const SHOOTER_MOTOR_CONFIG: MotorConfig =
    MotorConfig::new(NeutralMode::Coast, CurrentLimits::supply_and_stator(45.0, 110.0));

pub const KEY_KP: &str = "Shooter/kP";
pub const KEY_KD: &str = "Shooter/kD";
pub const KEY_TARGET_RPM: &str = "Shooter/TargetRPM";
pub const KEY_TOLERANCE_RPM: &str = "Shooter/ToleranceRPM";

pub struct Shooter {
    leader: Box<dyn VelocityMotor>,
    /// Mirrors every leader command; wired opposed to the leader.
    follower: Box<dyn VelocityMotor>,
    kp: Tunable,
    kd: Tunable,
    target_rpm: Tunable,
    tolerance_rpm: Tunable,
    kp_tracker: ChangeTracker,
    kd_tracker: ChangeTracker,
    closed_loop: bool,
    last_target_rpm: f64,
    last_feedback: MotorFeedback,
}

impl Shooter {
    pub fn new(
        mut leader: Box<dyn VelocityMotor>,
        mut follower: Box<dyn VelocityMotor>,
        store: &TunableStore,
    ) -> Result<Self, ActuatorError> {
        let kp = store.register(KEY_KP, 0.1);
        let kd = store.register(KEY_KD, 0.0);
        let gains = VelocityGains {
            kp: kp.get(),
            ki: 0.0,
            kd: kd.get(),
        };

        leader.configure(&SHOOTER_MOTOR_CONFIG)?;
        follower.configure(&MotorConfig {
            inverted: true,
            ..SHOOTER_MOTOR_CONFIG
        })?;
        leader.apply_gains(gains)?;
        follower.apply_gains(gains)?;
        info!(
            leader = leader.device_id(),
            follower = follower.device_id(),
            "shooter configured"
        );

        Ok(Self {
            leader,
            follower,
            kp_tracker: ChangeTracker::new(gains.kp, TUNABLE_CHANGE_EPSILON),
            kd_tracker: ChangeTracker::new(gains.kd, TUNABLE_CHANGE_EPSILON),
            kp,
            kd,
            target_rpm: store.register(KEY_TARGET_RPM, 2000.0),
            tolerance_rpm: store.register(KEY_TOLERANCE_RPM, 100.0),
            closed_loop: false,
            last_target_rpm: 0.0,
            last_feedback: MotorFeedback::default(),
        })
    }

    #[inline]
    pub const fn is_closed_loop(&self) -> bool {
        self.closed_loop
    }

    pub fn enable_closed_loop(&mut self) {
        if !self.closed_loop {
            debug!("shooter closed loop enabled");
        }
        self.closed_loop = true;
    }

    /// Leave closed loop and command 0 V.
    pub fn disable(&mut self) {
        self.set_open_loop_volts(0.0);
    }

    pub fn set_open_loop_volts(&mut self, volts: f64) {
        if self.closed_loop {
            debug!(volts, "shooter closed loop disabled");
        }
        self.closed_loop = false;
        self.last_target_rpm = 0.0;
        for motor in [&mut self.leader, &mut self.follower] {
            if let Err(e) = motor.set_volts(volts) {
                warn!(volts, "shooter voltage command failed: {e}");
            }
        }
    }

    /// Flywheel at speed: closed loop and within tolerance of the target.
    pub fn at_setpoint(&self) -> bool {
        self.closed_loop
            && (self.last_feedback.velocity_rpm() - self.last_target_rpm).abs() <= self.tolerance_rpm.get()
    }

    /// Re-apply gains if they moved, command the target in closed loop, read
    /// feedback once and record telemetry.
    pub fn periodic(&mut self, telemetry: &mut dyn TelemetrySink) {
        let kp = self.kp_tracker.update(self.kp.get());
        let kd = self.kd_tracker.update(self.kd.get());
        if kp.is_some() || kd.is_some() {
            self.apply_gains();
        }

        if self.closed_loop {
            self.last_target_rpm = self.target_rpm.get();
            let rps = self.last_target_rpm / 60.0;
            for motor in [&mut self.leader, &mut self.follower] {
                if let Err(e) = motor.set_velocity_rps(rps) {
                    warn!(rps, "shooter velocity command failed: {e}");
                }
            }
        }

        self.last_feedback = self.leader.feedback();
        let fb = &self.last_feedback;
        telemetry.record_number("Shooter/VelocityRPM", fb.velocity_rpm());
        telemetry.record_number("Shooter/TargetRPM", self.last_target_rpm);
        telemetry.record_number("Shooter/StatorCurrent", fb.stator_current);
        telemetry.record_number("Shooter/SupplyCurrent", fb.supply_current);
        telemetry.record_number("Shooter/AppliedVolts", fb.applied_volts);
        telemetry.record_bool("Shooter/ClosedLoop", self.closed_loop);
    }

    fn apply_gains(&mut self) {
        let gains = VelocityGains {
            kp: self.kp_tracker.last(),
            ki: 0.0,
            kd: self.kd_tracker.last(),
        };
        for motor in [&mut self.leader, &mut self.follower] {
            if let Err(e) = motor.apply_gains(gains) {
                warn!(kp = gains.kp, kd = gains.kd, "shooter gain update failed: {e}");
            }
        }
        debug!(kp = gains.kp, kd = gains.kd, "shooter gains applied");
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
