use std::cell::RefCell;
use std::rc::Rc;

use fire_common::angle::percent_to_volts;
use fire_common::consts::NOMINAL_BATTERY_VOLTS;
use fire_common::hal::driver::{ActuatorError, MotorController, VelocityMotor};
use fire_common::hal::types::{CurrentLimits, MotorConfig, MotorFeedback, VelocityGains};

/// Default free speed of a simulated motor [rps].
pub const SIM_FREE_SPEED_RPS: f64 = 100.0;
/// Fraction of the remaining velocity error closed per feedback read.
pub const SIM_RESPONSE: f64 = 0.2;

/// Last drive request received by a simulated motor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimDrive {
    Percent(f64),
    Velocity(f64),
    Volts(f64),
}

#[derive(Debug)]
struct SimMotorState {
    device_id: u8,
    config: Option<MotorConfig>,
    limits: CurrentLimits,
    limit_applications: u32,
    gains: Option<VelocityGains>,
    gain_applications: u32,
    drive: SimDrive,
    commands: u64,
    velocity_rps: f64,
    free_speed_rps: f64,
    failing: bool,
}

impl SimMotorState {
    fn target_rps(&self) -> f64 {
        match self.drive {
            SimDrive::Percent(p) => p * self.free_speed_rps,
            SimDrive::Velocity(v) => v,
            SimDrive::Volts(v) => v / NOMINAL_BATTERY_VOLTS * self.free_speed_rps,
        }
    }

    fn applied_volts(&self) -> f64 {
        match self.drive {
            SimDrive::Percent(p) => percent_to_volts(p),
            SimDrive::Velocity(v) => v / self.free_speed_rps * NOMINAL_BATTERY_VOLTS,
            SimDrive::Volts(v) => v,
        }
    }

    fn command(&mut self, drive: SimDrive, value: f64) -> Result<(), ActuatorError> {
        if self.failing {
            return Err(ActuatorError::Communication {
                device: self.device_id,
                detail: "simulated bus fault".to_string(),
            });
        }
        if !value.is_finite() {
            return Err(ActuatorError::Rejected {
                device: self.device_id,
                value,
            });
        }
        self.drive = drive;
        self.commands += 1;
        Ok(())
    }
}

/// First-order simulated motor.
///
/// Velocity moves toward the commanded target by [`SIM_RESPONSE`] of the
/// remaining error on each feedback read (once per tick).
#[derive(Debug, Clone)]
pub struct SimMotor {
    state: Rc<RefCell<SimMotorState>>,
}

impl SimMotor {
    pub fn new(device_id: u8) -> Self {
        Self::with_free_speed(device_id, SIM_FREE_SPEED_RPS)
    }

    pub fn with_free_speed(device_id: u8, free_speed_rps: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimMotorState {
                device_id,
                config: None,
                limits: CurrentLimits::default(),
                limit_applications: 0,
                gains: None,
                gain_applications: 0,
                drive: SimDrive::Percent(0.0),
                commands: 0,
                velocity_rps: 0.0,
                free_speed_rps,
                failing: false,
            })),
        }
    }

    pub fn config(&self) -> Option<MotorConfig> {
        self.state.borrow().config
    }

    pub fn current_limits(&self) -> CurrentLimits {
        self.state.borrow().limits
    }

    /// Number of `apply_current_limits` calls after `configure`.
    pub fn limit_applications(&self) -> u32 {
        self.state.borrow().limit_applications
    }

    pub fn gains(&self) -> Option<VelocityGains> {
        self.state.borrow().gains
    }

    pub fn gain_applications(&self) -> u32 {
        self.state.borrow().gain_applications
    }

    pub fn drive(&self) -> SimDrive {
        self.state.borrow().drive
    }

    /// Last percent command, or `None` if the motor is in another drive mode.
    pub fn last_percent(&self) -> Option<f64> {
        match self.drive() {
            SimDrive::Percent(p) => Some(p),
            _ => None,
        }
    }

    /// Accepted drive commands so far.
    pub fn commands(&self) -> u64 {
        self.state.borrow().commands
    }

    pub fn velocity_rps(&self) -> f64 {
        self.state.borrow().velocity_rps
    }

    /// Make every subsequent command fail with a communication error.
    pub fn set_failing(&self, failing: bool) {
        self.state.borrow_mut().failing = failing;
    }
}

impl MotorController for SimMotor {
    fn device_id(&self) -> u8 {
        self.state.borrow().device_id
    }

    fn configure(&mut self, config: &MotorConfig) -> Result<(), ActuatorError> {
        let mut s = self.state.borrow_mut();
        s.config = Some(*config);
        s.limits = config.current_limits;
        Ok(())
    }

    fn set_percent(&mut self, percent: f64) -> Result<(), ActuatorError> {
        self.state.borrow_mut().command(SimDrive::Percent(percent), percent)
    }

    fn apply_current_limits(&mut self, limits: CurrentLimits) -> Result<(), ActuatorError> {
        let mut s = self.state.borrow_mut();
        s.limits = limits;
        s.limit_applications += 1;
        Ok(())
    }

    fn feedback(&self) -> MotorFeedback {
        let mut s = self.state.borrow_mut();
        let error = s.target_rps() - s.velocity_rps;
        s.velocity_rps += SIM_RESPONSE * error;

        let mut stator = 0.5 * error.abs() + 0.05 * s.velocity_rps.abs();
        if let Some(limit) = s.limits.stator_amps {
            stator = stator.min(limit);
        }
        let duty = (s.applied_volts() / NOMINAL_BATTERY_VOLTS).abs().min(1.0);
        let mut supply = stator * duty;
        if let Some(limit) = s.limits.supply_amps {
            supply = supply.min(limit);
        }

        MotorFeedback {
            velocity_rps: s.velocity_rps,
            supply_current: supply,
            stator_current: stator,
            applied_volts: s.applied_volts(),
        }
    }
}

impl VelocityMotor for SimMotor {
    fn set_velocity_rps(&mut self, rps: f64) -> Result<(), ActuatorError> {
        self.state.borrow_mut().command(SimDrive::Velocity(rps), rps)
    }

    fn apply_gains(&mut self, gains: VelocityGains) -> Result<(), ActuatorError> {
        let mut s = self.state.borrow_mut();
        s.gains = Some(gains);
        s.gain_applications += 1;
        Ok(())
    }

    fn set_volts(&mut self, volts: f64) -> Result<(), ActuatorError> {
        self.state.borrow_mut().command(SimDrive::Volts(volts), volts)
    }
}
