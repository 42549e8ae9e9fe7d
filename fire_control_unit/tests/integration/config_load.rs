//! Integration test: configuration file → simulated rig → tunable overrides.

use std::cell::RefCell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use fire_common::config::ConfigError;
use fire_common::control_unit::state::{ClampOrdering, FeedCommand};
use fire_common::telemetry::{FrameSink, MemorySink, TelemetryFrame};
use fire_control_unit::config::{load_config, load_config_from_str};
use fire_control_unit::sim::build_sim_rig;

const CONFIG_TOML: &str = r#"
[shared]
service_name = "fire-control-it"
log_level = "warn"

[control_unit]
cycle_time_us = 10000
clamp_ordering = "legacy"

[control_unit.devices]
shooter_leader = 1
shooter_follower = 2

[tunables]
"Turret/TargetDeg" = 30.0
"Spindexer/FeedPercent" = 0.8

[sim]
hood_ready = true

[sim.zone]
in_alliance_zone = true
field_ready = true
"#;

#[test]
fn config_file_builds_a_running_rig() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG_TOML.as_bytes()).unwrap();
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.control_unit.clamp_ordering, ClampOrdering::Legacy);

    let mut rig = build_sim_rig(&config.control_unit, &config.sim, Box::new(MemorySink::new())).unwrap();
    rig.store.apply_overrides(&config.tunables).unwrap();
    assert_eq!(rig.store.get("Turret/TargetDeg"), Some(30.0));
    assert_eq!(rig.shooter_leader.config().map(|c| c.inverted), Some(false));

    rig.commands.enable_shooter().unwrap();
    rig.commands.enable_turret_closed_loop().unwrap();
    rig.commands.set_request_shot(true).unwrap();
    let mut fed = false;
    for _ in 0..300 {
        fed |= rig.runner.tick().coordinator.command == FeedCommand::Feed;
    }
    assert!(fed);
    assert_eq!(rig.spindexer.last_percent(), Some(0.8));
}

#[test]
fn unknown_override_key_is_rejected_at_startup() {
    let config = load_config_from_str(
        r#"
[shared]
service_name = "x"
[tunables]
"Turret/NotAKey" = 1.0
"#,
    )
    .unwrap();
    let rig = build_sim_rig(&config.control_unit, &config.sim, Box::new(MemorySink::new())).unwrap();
    assert!(rig.store.apply_overrides(&config.tunables).is_err());
}

#[test]
fn duplicate_device_ids_are_rejected() {
    let err = load_config_from_str(
        r#"
[shared]
service_name = "x"
[control_unit.devices]
loader = 40
spindexer = 40
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

/// Records the tick and turret delta of every flushed frame.
#[derive(Clone, Default)]
struct FrameLog(Rc<RefCell<Vec<(u64, Option<f64>)>>>);

impl FrameSink for FrameLog {
    fn flush_frame(&mut self, frame: &TelemetryFrame) {
        let delta = frame.get("Turret/DeltaDeg").and_then(|v| v.as_number());
        self.0.borrow_mut().push((frame.tick(), delta));
    }
}

#[test]
fn shipped_config_publishes_every_tick() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/fire_control.toml");
    let config = load_config(&path).unwrap();
    let log = FrameLog::default();
    let mut rig = build_sim_rig(&config.control_unit, &config.sim, Box::new(log.clone())).unwrap();
    rig.store.apply_overrides(&config.tunables).unwrap();

    for _ in 0..10 {
        rig.runner.tick();
    }

    let frames = log.0.borrow();
    assert_eq!(frames.len(), 10);
    for (i, (tick, delta)) in frames.iter().enumerate() {
        assert_eq!(*tick, i as u64 + 1);
        assert!(delta.is_some(), "tick {tick} lost Turret/DeltaDeg");
    }
}
