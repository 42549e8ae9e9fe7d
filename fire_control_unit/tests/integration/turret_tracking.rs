//! Integration test: turret tracking through the runner, including the
//! forbidden-zone clamp under both orderings.

use fire_common::control_unit::config::ControlUnitConfig;
use fire_common::control_unit::state::{ClampOrdering, TurretMode};
use fire_common::tunables::TunableError;
use fire_control_unit::sim::SimRig;
use fire_control_unit::turret::{KEY_KP, KEY_TARGET_DEG};

use super::{ALLIANCE, rig, rig_in, tick_n};

fn track(rig: &mut SimRig, target_deg: f64, ticks: usize) {
    rig.store.set(KEY_TARGET_DEG, target_deg).unwrap();
    rig.commands.enable_turret_closed_loop().unwrap();
    tick_n(rig, ticks);
}

#[test]
fn converges_on_target() {
    let mut rig = rig();
    track(&mut rig, 45.0, 200);

    let angle = rig.turret.angle_deg();
    assert!((angle - 45.0).abs() < 2.0, "angle {angle}");
    assert!(rig.runner.turret().at_setpoint());

    let report = rig.runner.tick();
    assert!(report.turret_ready);
    assert_eq!(report.turret.command, Some(0.0));
}

#[test]
fn output_never_exceeds_max() {
    let mut rig = rig();
    rig.store.set(KEY_TARGET_DEG, 120.0).unwrap();
    rig.commands.enable_turret_closed_loop().unwrap();
    for _ in 0..100 {
        let report = rig.runner.tick();
        let command = report.turret.command.unwrap();
        assert!(command.abs() <= 0.4, "command {command}");
    }
}

#[test]
fn takes_shortest_path_across_the_seam() {
    let config = ControlUnitConfig::default();
    let mut rig = rig_in(ALLIANCE, &config);
    rig.turret.set_angle_deg(-100.0);
    rig.store.set(KEY_TARGET_DEG, 100.0).unwrap();
    rig.commands.enable_turret_closed_loop().unwrap();

    // -100 → 100 is 200° forward or 160° back.
    let report = rig.runner.tick();
    assert!((report.turret.delta.delta_deg + 160.0).abs() < 1e-9);
    assert!(report.turret.command.unwrap() < 0.0);
}

#[test]
fn clamp_before_delta_stops_short_of_forbidden_zone() {
    let mut rig = rig();
    track(&mut rig, 178.0, 400);

    let angle = rig.turret.angle_deg();
    assert!(angle <= 175.0, "entered forbidden buffer at {angle}");
    assert!(angle > 172.0, "angle {angle}");
    assert!(rig.runner.turret().at_setpoint());
}

#[test]
fn legacy_ordering_enters_forbidden_buffer() {
    let config = ControlUnitConfig {
        clamp_ordering: ClampOrdering::Legacy,
        ..Default::default()
    };
    let mut rig = rig_in(ALLIANCE, &config);
    track(&mut rig, 178.0, 400);

    let angle = rig.turret.angle_deg();
    assert!(angle > 175.0, "angle {angle}");

    // The clamp is still computed and reported.
    let report = rig.runner.tick();
    assert_eq!(report.turret.delta.safe_target_deg, 175.0);
}

#[test]
fn disable_commands_zero_then_stays_silent() {
    let mut rig = rig();
    track(&mut rig, 90.0, 5);
    assert!(rig.turret.last_percent() > 0.0);

    rig.commands.disable_turret().unwrap();
    let report = rig.runner.tick();
    assert_eq!(report.turret.mode, TurretMode::Disabled);
    assert_eq!(report.turret.command, None);
    assert_eq!(rig.turret.last_percent(), 0.0);
    assert!(rig.runner.frame().get("Turret/Output").is_none());
    assert!(!report.turret_ready);
}

#[test]
fn manual_percent_persists_across_ticks() {
    let mut rig = rig();
    track(&mut rig, 90.0, 5);

    rig.commands.set_turret_manual_percent(-0.25).unwrap();
    tick_n(&mut rig, 10);
    assert_eq!(rig.turret.last_percent(), -0.25);
    assert_eq!(rig.runner.turret().mode(), TurretMode::Disabled);
}

#[test]
fn gains_are_read_live() {
    let mut rig = rig();
    track(&mut rig, 90.0, 1);
    let slow = rig.turret.last_percent();

    rig.store.set(KEY_KP, 0.001).unwrap();
    rig.runner.tick();
    assert!(rig.turret.last_percent() < slow);
}

#[test]
fn non_finite_encoder_propagates_and_recovers() {
    let mut rig = rig();
    track(&mut rig, 30.0, 5);
    let before = rig.turret.last_percent();

    rig.turret.override_reading(Some(f64::NAN));
    let report = rig.runner.tick();
    assert!(report.turret.command.unwrap().is_nan());
    assert!(!report.turret_ready);
    // The simulated motor refuses the NaN and keeps its last output.
    assert_eq!(rig.turret.last_percent(), before);

    rig.turret.override_reading(None);
    let report = rig.runner.tick();
    assert!(report.turret.command.unwrap().is_finite());
}

#[test]
fn overrides_reject_unknown_and_non_finite() {
    let rig = rig();
    assert!(matches!(
        rig.store.set("Turret/Nope", 1.0),
        Err(TunableError::UnknownKey(_))
    ));
    assert!(matches!(
        rig.store.set(KEY_TARGET_DEG, f64::INFINITY),
        Err(TunableError::NonFinite { .. })
    ));
}
