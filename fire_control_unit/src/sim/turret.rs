use std::cell::RefCell;
use std::rc::Rc;

use fire_common::angle::percent_to_volts;
use fire_common::hal::driver::{ActuatorError, AngleSensor, MotorController};
use fire_common::hal::types::{CurrentLimits, MotorConfig, MotorFeedback};

#[derive(Debug)]
struct TurretState {
    device_id: u8,
    config: Option<MotorConfig>,
    limits: CurrentLimits,
    percent: f64,
    angle_deg: f64,
    slew_deg_per_s: f64,
    dt_s: f64,
    reading_override: Option<f64>,
}

/// Turret joint whose angle integrates the percent output at a fixed
/// maximum slew rate. The integration step runs on each encoder read.
#[derive(Debug, Clone)]
pub struct SimTurret {
    state: Rc<RefCell<TurretState>>,
}

impl SimTurret {
    pub fn new(device_id: u8, dt_s: f64, slew_deg_per_s: f64, initial_angle_deg: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(TurretState {
                device_id,
                config: None,
                limits: CurrentLimits::default(),
                percent: 0.0,
                angle_deg: initial_angle_deg,
                slew_deg_per_s,
                dt_s,
                reading_override: None,
            })),
        }
    }

    pub fn motor(&self) -> SimTurretMotor {
        SimTurretMotor {
            state: Rc::clone(&self.state),
        }
    }

    pub fn encoder(&self) -> SimEncoder {
        SimEncoder {
            state: Rc::clone(&self.state),
        }
    }

    /// Unwrapped joint angle [deg].
    pub fn angle_deg(&self) -> f64 {
        self.state.borrow().angle_deg
    }

    pub fn set_angle_deg(&self, angle_deg: f64) {
        self.state.borrow_mut().angle_deg = angle_deg;
    }

    pub fn last_percent(&self) -> f64 {
        self.state.borrow().percent
    }

    pub fn config(&self) -> Option<MotorConfig> {
        self.state.borrow().config
    }

    /// Force the encoder to report `reading` instead of the joint angle.
    pub fn override_reading(&self, reading: Option<f64>) {
        self.state.borrow_mut().reading_override = reading;
    }
}

/// Motor handle of a [`SimTurret`].
#[derive(Debug, Clone)]
pub struct SimTurretMotor {
    state: Rc<RefCell<TurretState>>,
}

impl MotorController for SimTurretMotor {
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
        let mut s = self.state.borrow_mut();
        if !percent.is_finite() {
            return Err(ActuatorError::Rejected {
                device: s.device_id,
                value: percent,
            });
        }
        s.percent = percent;
        Ok(())
    }

    fn apply_current_limits(&mut self, limits: CurrentLimits) -> Result<(), ActuatorError> {
        self.state.borrow_mut().limits = limits;
        Ok(())
    }

    fn feedback(&self) -> MotorFeedback {
        let s = self.state.borrow();
        let current = 10.0 * s.percent.abs();
        MotorFeedback {
            velocity_rps: s.percent * s.slew_deg_per_s / 360.0,
            supply_current: s.limits.supply_amps.map_or(current, |l| current.min(l)),
            stator_current: current,
            applied_volts: percent_to_volts(s.percent),
        }
    }
}

/// Absolute encoder handle of a [`SimTurret`], reporting `[0, 360)`.
#[derive(Debug, Clone)]
pub struct SimEncoder {
    state: Rc<RefCell<TurretState>>,
}

impl AngleSensor for SimEncoder {
    fn read_angle_deg(&mut self) -> f64 {
        let mut s = self.state.borrow_mut();
        s.angle_deg += s.percent * s.slew_deg_per_s * s.dt_s;
        match s.reading_override {
            Some(reading) => reading,
            None => s.angle_deg.rem_euclid(360.0),
        }
    }
}
