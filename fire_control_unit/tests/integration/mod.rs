mod config_load;
mod shot_flow;
mod turret_tracking;

use fire_common::control_unit::config::ControlUnitConfig;
use fire_common::control_unit::zone::ZoneContext;
use fire_common::telemetry::MemorySink;
use fire_control_unit::config::SimConfig;
use fire_control_unit::sim::{SimRig, build_sim_rig};

pub const ALLIANCE: ZoneContext = ZoneContext {
    in_trench_zone: false,
    in_alliance_zone: true,
    in_neutral_zone: false,
    in_opponent_zone: false,
    field_ready: true,
};

pub fn rig_in(zone: ZoneContext, config: &ControlUnitConfig) -> SimRig {
    let sim = SimConfig {
        zone,
        ..Default::default()
    };
    build_sim_rig(config, &sim, Box::new(MemorySink::new())).unwrap()
}

pub fn rig() -> SimRig {
    rig_in(ALLIANCE, &ControlUnitConfig::default())
}

pub fn tick_n(rig: &mut SimRig, n: usize) {
    for _ in 0..n {
        rig.runner.tick();
    }
}
