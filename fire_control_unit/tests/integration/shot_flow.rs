//! Integration test: shot request through readiness to the feed path.

use fire_common::control_unit::state::{FeedCommand, FeedState, ShootingMode, ShotType};
use fire_common::control_unit::zone::{ReadinessVeto, ZoneContext};
use fire_common::telemetry::TelemetryValue;

use super::{ALLIANCE, rig, tick_n};

fn arm(rig: &mut fire_control_unit::sim::SimRig) {
    rig.commands.enable_shooter().unwrap();
    rig.commands.enable_turret_closed_loop().unwrap();
    rig.commands.set_request_shot(true).unwrap();
}

#[test]
fn feeds_once_every_subsystem_is_ready() {
    let mut rig = rig();
    arm(&mut rig);

    let first = rig.runner.tick();
    assert_eq!(first.coordinator.shot_type, ShotType::Shoot);
    assert!(first.coordinator.vetoes.contains(ReadinessVeto::SHOOTER));
    assert_eq!(first.coordinator.command, FeedCommand::Stop);
    assert_eq!(rig.spindexer.last_percent(), Some(0.0));

    tick_n(&mut rig, 60);
    let report = rig.runner.tick();
    assert!(report.shooter_ready);
    assert!(report.turret_ready);
    assert!(report.coordinator.ready_to_fire);
    assert_eq!(report.coordinator.command, FeedCommand::Feed);
    assert_eq!(rig.runner.coordinator().feed_state(), FeedState::Feeding);
    assert_eq!(rig.spindexer.last_percent(), Some(0.5));
    assert_eq!(rig.loader.last_percent(), Some(0.5));
}

#[test]
fn feed_is_reissued_every_tick() {
    let mut rig = rig();
    arm(&mut rig);
    tick_n(&mut rig, 60);

    let before = rig.spindexer.commands();
    tick_n(&mut rig, 10);
    assert_eq!(rig.spindexer.commands(), before + 10);
    assert_eq!(rig.spindexer.last_percent(), Some(0.5));
}

#[test]
fn trench_blocks_even_when_ready() {
    let mut rig = rig();
    arm(&mut rig);
    tick_n(&mut rig, 60);
    assert_eq!(rig.runner.coordinator().feed_state(), FeedState::Feeding);

    rig.field.set_zone(ZoneContext {
        in_trench_zone: true,
        ..ALLIANCE
    });
    let report = rig.runner.tick();
    assert_eq!(report.coordinator.shot_type, ShotType::Blocked);
    assert!(report.coordinator.ready_to_fire);
    assert_eq!(report.coordinator.command, FeedCommand::Stop);
    assert_eq!(rig.loader.last_percent(), Some(0.0));
}

#[test]
fn neutral_zone_passes() {
    let mut rig = rig();
    rig.field.set_zone(ZoneContext {
        in_alliance_zone: false,
        in_neutral_zone: true,
        ..ALLIANCE
    });
    arm(&mut rig);
    tick_n(&mut rig, 60);
    let report = rig.runner.tick();
    assert_eq!(report.coordinator.shot_type, ShotType::Pass);
    assert_eq!(report.coordinator.command, FeedCommand::Feed);
}

#[test]
fn releasing_request_stops_feed() {
    let mut rig = rig();
    arm(&mut rig);
    tick_n(&mut rig, 60);

    rig.commands.set_request_shot(false).unwrap();
    let report = rig.runner.tick();
    assert_eq!(report.coordinator.command, FeedCommand::Stop);
    assert_eq!(rig.spindexer.last_percent(), Some(0.0));
}

#[test]
fn hood_and_field_vetoes() {
    let mut rig = rig();
    arm(&mut rig);
    tick_n(&mut rig, 60);

    rig.field.set_hood_ready(false);
    let report = rig.runner.tick();
    assert_eq!(report.coordinator.vetoes, ReadinessVeto::HOOD);
    assert_eq!(report.coordinator.command, FeedCommand::Stop);

    rig.field.set_hood_ready(true);
    rig.field.set_zone(ZoneContext {
        field_ready: false,
        ..ALLIANCE
    });
    let report = rig.runner.tick();
    assert_eq!(report.coordinator.shot_type, ShotType::None);
    assert_eq!(report.coordinator.vetoes, ReadinessVeto::FIELD);
}

#[test]
fn actuator_failure_does_not_stop_the_loop() {
    let mut rig = rig();
    arm(&mut rig);
    tick_n(&mut rig, 60);

    rig.spindexer.set_failing(true);
    let before = rig.loader.commands();
    let report = rig.runner.tick();
    assert_eq!(report.coordinator.command, FeedCommand::Feed);
    assert_eq!(rig.loader.commands(), before + 1);

    rig.spindexer.set_failing(false);
    rig.runner.tick();
    assert_eq!(rig.spindexer.last_percent(), Some(0.5));
}

#[test]
fn mode_is_recorded_only() {
    let mut rig = rig();
    rig.commands.set_mode(ShootingMode::AutoAim).unwrap();
    let report = rig.runner.tick();
    assert_eq!(rig.runner.coordinator().mode(), ShootingMode::AutoAim);
    assert_eq!(report.coordinator.command, FeedCommand::Stop);
    assert_eq!(
        rig.runner.frame().get("Coordinator/Mode"),
        Some(TelemetryValue::Text(ShootingMode::AutoAim.as_str()))
    );
}
