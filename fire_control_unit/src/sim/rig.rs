use fire_common::control_unit::config::ControlUnitConfig;
use fire_common::telemetry::FrameSink;
use fire_common::tunables::TunableStore;

use super::{SimField, SimMotor, SimTurret};
use crate::command::queue::CommandSender;
use crate::config::SimConfig;
use crate::cycle::{CycleError, CycleRunner, Hardware};

/// A cycle runner wired to simulated hardware, with probes on every device.
pub struct SimRig {
    pub runner: CycleRunner,
    pub commands: CommandSender,
    pub store: TunableStore,
    pub field: SimField,
    pub turret: SimTurret,
    pub shooter_leader: SimMotor,
    pub shooter_follower: SimMotor,
    pub spindexer: SimMotor,
    pub loader: SimMotor,
    pub intake_arm_leader: SimMotor,
    pub intake_arm_follower: SimMotor,
    pub intake_roller_left: SimMotor,
    pub intake_roller_right: SimMotor,
}

/// Build simulated devices at the configured addresses and a runner on top.
pub fn build_sim_rig(
    config: &ControlUnitConfig,
    sim: &SimConfig,
    sink: Box<dyn FrameSink>,
) -> Result<SimRig, CycleError> {
    let ids = &config.devices;
    let motor = |id| SimMotor::with_free_speed(id, sim.motor_free_speed_rps);
    let dt_s = config.cycle_time_us as f64 * 1e-6;

    let field = SimField::new(sim.zone, sim.hood_ready);
    let turret = SimTurret::new(ids.turret_motor, dt_s, sim.turret_slew_deg_per_s, sim.initial_turret_deg);
    let shooter_leader = motor(ids.shooter_leader);
    let shooter_follower = motor(ids.shooter_follower);
    let spindexer = motor(ids.spindexer);
    let loader = motor(ids.loader);
    let intake_arm_leader = motor(ids.intake_arm_leader);
    let intake_arm_follower = motor(ids.intake_arm_follower);
    let intake_roller_left = motor(ids.intake_roller_left);
    let intake_roller_right = motor(ids.intake_roller_right);

    let hardware = Hardware {
        turret_motor: Box::new(turret.motor()),
        turret_encoder: Box::new(turret.encoder()),
        shooter_leader: Box::new(shooter_leader.clone()),
        shooter_follower: Box::new(shooter_follower.clone()),
        spindexer: Box::new(spindexer.clone()),
        loader: Box::new(loader.clone()),
        intake_arm_leader: Box::new(intake_arm_leader.clone()),
        intake_arm_follower: Box::new(intake_arm_follower.clone()),
        intake_roller_left: Box::new(intake_roller_left.clone()),
        intake_roller_right: Box::new(intake_roller_right.clone()),
        inputs: Box::new(field.clone()),
    };

    let store = TunableStore::new();
    let (runner, commands) = CycleRunner::new(config, hardware, &store, sink)?;

    Ok(SimRig {
        runner,
        commands,
        store,
        field,
        turret,
        shooter_leader,
        shooter_follower,
        spindexer,
        loader,
        intake_arm_leader,
        intake_arm_follower,
        intake_roller_left,
        intake_roller_right,
    })
}
