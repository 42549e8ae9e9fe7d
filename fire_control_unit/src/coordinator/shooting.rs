use fire_common::control_unit::state::{FeedCommand, FeedState, ShootingMode, ShotType};
use fire_common::control_unit::zone::{ReadinessSnapshot, ReadinessVeto, ZoneContext};
use fire_common::telemetry::TelemetrySink;
use tracing::{debug, info};

use super::classifier::classify;
use super::feed_gate::FeedGate;
use super::readiness::aggregate;

/// Everything the coordinator decided on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOutput {
    pub shot_type: ShotType,
    pub ready_to_fire: bool,
    pub vetoes: ReadinessVeto,
    pub command: FeedCommand,
}

/// Shot coordinator: classifier, readiness aggregator and feed gate.
///
/// Commander inputs (`set_mode`, `set_request_shot`) are latched here and
/// observed by the next [`tick`](Self::tick).
#[derive(Debug, Clone, Default)]
pub struct ShootingCoordinator {
    mode: ShootingMode,
    request_shot: bool,
    gate: FeedGate,
    last_shot: ShotType,
}

impl ShootingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub const fn mode(&self) -> ShootingMode {
        self.mode
    }

    #[inline]
    pub const fn request_shot(&self) -> bool {
        self.request_shot
    }

    #[inline]
    pub const fn feed_state(&self) -> FeedState {
        self.gate.state()
    }

    #[inline]
    pub const fn last_shot(&self) -> ShotType {
        self.last_shot
    }

    pub fn set_mode(&mut self, mode: ShootingMode) {
        if self.mode != mode {
            info!(from = self.mode.as_str(), to = mode.as_str(), "shooting mode changed");
        }
        self.mode = mode;
    }

    pub fn set_request_shot(&mut self, request: bool) {
        if self.request_shot != request {
            debug!(request, "shot request changed");
        }
        self.request_shot = request;
    }

    /// Run one coordination tick and record its telemetry.
    pub fn tick(
        &mut self,
        zone: &ZoneContext,
        shooter_ready: bool,
        turret_ready: bool,
        hood_ready: bool,
        telemetry: &mut dyn TelemetrySink,
    ) -> CoordinatorOutput {
        let shot_type = classify(zone);
        if shot_type != self.last_shot {
            debug!(from = self.last_shot.as_str(), to = shot_type.as_str(), "shot type changed");
        }
        self.last_shot = shot_type;

        let snapshot = ReadinessSnapshot::new(shooter_ready, turret_ready, hood_ready, zone.field_ready);
        let (ready_to_fire, vetoes) = aggregate(&snapshot);
        let command = self.gate.tick(self.request_shot, ready_to_fire, shot_type);

        telemetry.record_text("Coordinator/Mode", self.mode.as_str());
        telemetry.record_text("Coordinator/ShotType", shot_type.as_str());
        telemetry.record_bool("Coordinator/RequestShot", self.request_shot);
        telemetry.record_bool("Coordinator/ReadyToFire", ready_to_fire);
        telemetry.record_bool("Coordinator/Feeding", command == FeedCommand::Feed);
        telemetry.record_number("Coordinator/Vetoes", f64::from(vetoes.bits()));

        CoordinatorOutput {
            shot_type,
            ready_to_fire,
            vetoes,
            command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fire_common::telemetry::MemorySink;

    fn alliance_zone() -> ZoneContext {
        ZoneContext {
            in_trench_zone: false,
            in_alliance_zone: true,
            in_neutral_zone: false,
            in_opponent_zone: false,
            field_ready: true,
        }
    }

    #[test]
    fn end_to_end_shoot() {
        let mut c = ShootingCoordinator::new();
        c.set_request_shot(true);
        let mut sink = MemorySink::new();
        let out = c.tick(&alliance_zone(), true, true, true, &mut sink);
        assert_eq!(out.shot_type, ShotType::Shoot);
        assert!(out.ready_to_fire);
        assert!(out.vetoes.is_empty());
        assert_eq!(out.command, FeedCommand::Feed);
        assert_eq!(c.feed_state(), FeedState::Feeding);

        assert_eq!(sink.text("Coordinator/ShotType"), Some("SHOOT"));
        assert_eq!(sink.boolean("Coordinator/ReadyToFire"), Some(true));
        assert_eq!(sink.boolean("Coordinator/Feeding"), Some(true));
        assert_eq!(sink.number("Coordinator/Vetoes"), Some(0.0));
    }

    #[test]
    fn no_request_no_feed() {
        let mut c = ShootingCoordinator::new();
        let out = c.tick(&alliance_zone(), true, true, true, &mut MemorySink::new());
        assert!(out.ready_to_fire);
        assert_eq!(out.command, FeedCommand::Stop);
    }

    #[test]
    fn field_not_ready_vetoes_and_classifies_none() {
        let mut c = ShootingCoordinator::new();
        c.set_request_shot(true);
        let zone = ZoneContext {
            field_ready: false,
            ..alliance_zone()
        };
        let out = c.tick(&zone, true, true, true, &mut MemorySink::new());
        assert_eq!(out.shot_type, ShotType::None);
        assert_eq!(out.vetoes, ReadinessVeto::FIELD);
        assert_eq!(out.command, FeedCommand::Stop);
    }

    #[test]
    fn turret_veto_stops_feed() {
        let mut c = ShootingCoordinator::new();
        c.set_request_shot(true);
        let mut sink = MemorySink::new();
        c.tick(&alliance_zone(), true, true, true, &mut sink);
        let out = c.tick(&alliance_zone(), true, false, true, &mut sink);
        assert_eq!(out.command, FeedCommand::Stop);
        assert_eq!(out.vetoes, ReadinessVeto::TURRET);
        assert_eq!(sink.number("Coordinator/Vetoes"), Some(f64::from(ReadinessVeto::TURRET.bits())));
    }

    #[test]
    fn mode_is_recorded_only() {
        let mut c = ShootingCoordinator::new();
        c.set_mode(ShootingMode::AutoAim);
        c.set_request_shot(true);
        let mut sink = MemorySink::new();
        let out = c.tick(&alliance_zone(), true, true, true, &mut sink);
        assert_eq!(out.command, FeedCommand::Feed);
        assert_eq!(sink.text("Coordinator/Mode"), Some("AUTO_AIM"));
        assert_eq!(c.mode(), ShootingMode::AutoAim);
    }

    #[test]
    fn trench_blocks_even_when_ready() {
        let mut c = ShootingCoordinator::new();
        c.set_request_shot(true);
        let zone = ZoneContext {
            in_trench_zone: true,
            ..alliance_zone()
        };
        let out = c.tick(&zone, true, true, true, &mut MemorySink::new());
        assert_eq!(out.shot_type, ShotType::Blocked);
        assert!(out.ready_to_fire);
        assert_eq!(out.command, FeedCommand::Stop);
        assert_eq!(c.last_shot(), ShotType::Blocked);
    }
}
