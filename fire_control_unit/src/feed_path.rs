//! Feed-path mechanisms: spindexer and loader.
//!
//! Both stages are the same open-loop roller driven by percent presets. They
//! differ only in their preset values, current limits and telemetry names,
//! captured by a static [`FeedMotorSpec`].

use fire_common::consts::TUNABLE_CHANGE_EPSILON;
use fire_common::control_unit::state::FeedCommand;
use fire_common::hal::driver::{ActuatorError, MotorController};
use fire_common::hal::types::{CurrentLimits, MotorConfig, NeutralMode};
use fire_common::telemetry::TelemetrySink;
use fire_common::tunables::{ChangeTracker, Tunable, TunableStore};
use tracing::{debug, info, warn};

/// Tunable and telemetry key set for one feed stage.
#[derive(Debug)]
pub struct FeedMotorKeys {
    pub feed_percent: &'static str,
    pub reverse_percent: &'static str,
    pub hold_percent: Option<&'static str>,
    pub supply_limit: &'static str,
    pub velocity_rps: &'static str,
    pub velocity_rpm: &'static str,
    pub supply_current: &'static str,
    pub stator_current: &'static str,
    pub commanded_percent: &'static str,
    pub running: &'static str,
}

/// Static description of a feed stage.
#[derive(Debug)]
pub struct FeedMotorSpec {
    pub name: &'static str,
    pub neutral_mode: NeutralMode,
    /// Fixed stator limit, kept when the supply limit is re-applied.
    pub stator_limit_amps: Option<f64>,
    pub feed_default: f64,
    pub reverse_default: f64,
    pub hold_default: f64,
    pub supply_limit_default: f64,
    pub keys: FeedMotorKeys,
}

impl FeedMotorSpec {
    fn limits(&self, supply_amps: f64) -> CurrentLimits {
        CurrentLimits {
            supply_amps: Some(supply_amps),
            stator_amps: self.stator_limit_amps,
        }
    }
}

pub static SPINDEXER: FeedMotorSpec = FeedMotorSpec {
    name: "Spindexer",
    neutral_mode: NeutralMode::Brake,
    stator_limit_amps: None,
    feed_default: 0.5,
    reverse_default: -0.4,
    hold_default: 0.1,
    supply_limit_default: 35.0,
    keys: FeedMotorKeys {
        feed_percent: "Spindexer/FeedPercent",
        reverse_percent: "Spindexer/ReversePercent",
        hold_percent: Some("Spindexer/HoldPercent"),
        supply_limit: "Spindexer/SupplyCurrentLimit",
        velocity_rps: "Spindexer/VelocityRPS",
        velocity_rpm: "Spindexer/VelocityRPM",
        supply_current: "Spindexer/SupplyCurrent",
        stator_current: "Spindexer/StatorCurrent",
        commanded_percent: "Spindexer/CommandedPercent",
        running: "Spindexer/Running",
    },
};

pub static LOADER: FeedMotorSpec = FeedMotorSpec {
    name: "Loader",
    neutral_mode: NeutralMode::Brake,
    stator_limit_amps: Some(100.0),
    feed_default: 0.5,
    reverse_default: -0.3,
    hold_default: 0.0,
    supply_limit_default: 40.0,
    keys: FeedMotorKeys {
        feed_percent: "Loader/FeedPercent",
        reverse_percent: "Loader/ReversePercent",
        hold_percent: None,
        supply_limit: "Loader/SupplyCurrentLimit",
        velocity_rps: "Loader/VelocityRPS",
        velocity_rpm: "Loader/VelocityRPM",
        supply_current: "Loader/SupplyCurrent",
        stator_current: "Loader/StatorCurrent",
        commanded_percent: "Loader/CommandedPercent",
        running: "Loader/Running",
    },
};

// ─── FeedMotor ──────────────────────────────────────────────────────

/// One open-loop feed stage.
pub struct FeedMotor {
    spec: &'static FeedMotorSpec,
    motor: Box<dyn MotorController>,
    feed: Tunable,
    reverse: Tunable,
    hold: Option<Tunable>,
    supply_limit: Tunable,
    limit_tracker: ChangeTracker,
    commanded_percent: f64,
    /// Set by any drive request, cleared only by `stop`.
    running: bool,
}

impl FeedMotor {
    pub fn new(
        spec: &'static FeedMotorSpec,
        mut motor: Box<dyn MotorController>,
        store: &TunableStore,
    ) -> Result<Self, ActuatorError> {
        let supply_limit = store.register(spec.keys.supply_limit, spec.supply_limit_default);
        let initial_limit = supply_limit.get();
        motor.configure(&MotorConfig::new(spec.neutral_mode, spec.limits(initial_limit)))?;
        info!(stage = spec.name, device = motor.device_id(), "feed stage configured");

        Ok(Self {
            spec,
            motor,
            feed: store.register(spec.keys.feed_percent, spec.feed_default),
            reverse: store.register(spec.keys.reverse_percent, spec.reverse_default),
            hold: spec.keys.hold_percent.map(|key| store.register(key, spec.hold_default)),
            supply_limit,
            limit_tracker: ChangeTracker::new(initial_limit, TUNABLE_CHANGE_EPSILON),
            commanded_percent: 0.0,
            running: false,
        })
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.spec.name
    }

    #[inline]
    pub const fn commanded_percent(&self) -> f64 {
        self.commanded_percent
    }

    #[inline]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub fn feed(&mut self) {
        self.set_manual_percent(self.feed.get());
    }

    pub fn reverse(&mut self) {
        self.set_manual_percent(self.reverse.get());
    }

    /// Apply the hold preset. Returns `false` for stages without one.
    pub fn hold(&mut self) -> bool {
        match self.hold.as_ref().map(Tunable::get) {
            Some(percent) => {
                self.set_manual_percent(percent);
                true
            }
            None => {
                debug!(stage = self.spec.name, "stage has no hold preset");
                false
            }
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.send(0.0);
    }

    pub fn set_manual_percent(&mut self, percent: f64) {
        self.running = true;
        self.send(percent);
    }

    fn send(&mut self, percent: f64) {
        self.commanded_percent = percent;
        if let Err(e) = self.motor.set_percent(percent) {
            warn!(stage = self.spec.name, percent, "feed command failed: {e}");
        }
    }

    pub fn apply(&mut self, command: FeedCommand) {
        match command {
            FeedCommand::Feed => self.feed(),
            FeedCommand::Stop => self.stop(),
        }
    }

    /// Re-apply the supply limit if its tunable moved, then record telemetry.
    pub fn periodic(&mut self, telemetry: &mut dyn TelemetrySink) {
        if let Some(amps) = self.limit_tracker.update(self.supply_limit.get()) {
            match self.motor.apply_current_limits(self.spec.limits(amps)) {
                Ok(()) => debug!(stage = self.spec.name, amps, "supply current limit updated"),
                Err(e) => warn!(stage = self.spec.name, amps, "current limit update failed: {e}"),
            }
        }

        let fb = self.motor.feedback();
        let keys = &self.spec.keys;
        telemetry.record_number(keys.velocity_rps, fb.velocity_rps);
        telemetry.record_number(keys.velocity_rpm, fb.velocity_rpm());
        telemetry.record_number(keys.supply_current, fb.supply_current);
        telemetry.record_number(keys.stator_current, fb.stator_current);
        telemetry.record_number(keys.commanded_percent, self.commanded_percent);
        telemetry.record_bool(keys.running, self.is_running());
    }
}

// ─── FeedPath ───────────────────────────────────────────────────────

/// Spindexer and loader driven together by the feed gate.
pub struct FeedPath {
    pub spindexer: FeedMotor,
    pub loader: FeedMotor,
}

impl FeedPath {
    pub fn new(
        spindexer: Box<dyn MotorController>,
        loader: Box<dyn MotorController>,
        store: &TunableStore,
    ) -> Result<Self, ActuatorError> {
        Ok(Self {
            spindexer: FeedMotor::new(&SPINDEXER, spindexer, store)?,
            loader: FeedMotor::new(&LOADER, loader, store)?,
        })
    }

    /// Forward `command` to both stages.
    pub fn apply(&mut self, command: FeedCommand) {
        self.spindexer.apply(command);
        self.loader.apply(command);
    }

    pub fn periodic(&mut self, telemetry: &mut dyn TelemetrySink) {
        self.spindexer.periodic(telemetry);
        self.loader.periodic(telemetry);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimMotor;
    use fire_common::telemetry::MemorySink;

    fn path(store: &TunableStore) -> (FeedPath, SimMotor, SimMotor) {
        let spindexer = SimMotor::new(40);
        let loader = SimMotor::new(30);
        let path = FeedPath::new(Box::new(spindexer.clone()), Box::new(loader.clone()), store).unwrap();
        (path, spindexer, loader)
    }

    #[test]
    fn startup_configuration() {
        let (_, spindexer, loader) = path(&TunableStore::new());
        let s = spindexer.config().unwrap();
        assert_eq!(s.neutral_mode, NeutralMode::Brake);
        assert_eq!(s.current_limits, CurrentLimits::supply(35.0));
        let l = loader.config().unwrap();
        assert_eq!(l.current_limits, CurrentLimits::supply_and_stator(40.0, 100.0));
    }

    #[test]
    fn feed_command_reaches_both_stages() {
        let (mut path, spindexer, loader) = path(&TunableStore::new());
        path.apply(FeedCommand::Feed);
        assert_eq!(spindexer.last_percent(), Some(0.5));
        assert_eq!(loader.last_percent(), Some(0.5));
        assert!(path.spindexer.is_running());

        path.apply(FeedCommand::Stop);
        assert_eq!(spindexer.last_percent(), Some(0.0));
        assert_eq!(loader.last_percent(), Some(0.0));
        assert!(!path.loader.is_running());
    }

    #[test]
    fn running_tracks_requests_not_values() {
        let store = TunableStore::new();
        let (mut path, spindexer, _) = path(&store);
        assert!(!path.spindexer.is_running());

        path.spindexer.set_manual_percent(0.0);
        assert!(path.spindexer.is_running());
        assert_eq!(spindexer.last_percent(), Some(0.0));

        store.set("Spindexer/HoldPercent", 0.0).unwrap();
        path.spindexer.stop();
        assert!(!path.spindexer.is_running());
        assert!(path.spindexer.hold());
        assert!(path.spindexer.is_running());

        path.apply(FeedCommand::Stop);
        assert!(!path.spindexer.is_running());
        let mut sink = MemorySink::new();
        path.periodic(&mut sink);
        assert_eq!(sink.boolean("Spindexer/Running"), Some(false));
    }

    #[test]
    fn unchanged_command_is_reissued() {
        let (mut path, spindexer, loader) = path(&TunableStore::new());
        for _ in 0..5 {
            path.apply(FeedCommand::Stop);
        }
        assert_eq!(spindexer.commands(), 5);
        assert_eq!(loader.commands(), 5);
    }

    #[test]
    fn presets_follow_tunables() {
        let store = TunableStore::new();
        let (mut path, spindexer, loader) = path(&store);
        path.spindexer.reverse();
        path.loader.reverse();
        assert_eq!(spindexer.last_percent(), Some(-0.4));
        assert_eq!(loader.last_percent(), Some(-0.3));

        store.set("Loader/FeedPercent", 0.8).unwrap();
        path.apply(FeedCommand::Feed);
        assert_eq!(loader.last_percent(), Some(0.8));
    }

    #[test]
    fn hold_only_on_spindexer() {
        let (mut path, spindexer, loader) = path(&TunableStore::new());
        assert!(path.spindexer.hold());
        assert_eq!(spindexer.last_percent(), Some(0.1));
        assert!(!path.loader.hold());
        assert_eq!(loader.commands(), 0);
    }

    #[test]
    fn supply_limit_reapplied_only_on_change() {
        let store = TunableStore::new();
        let (mut path, spindexer, loader) = path(&store);
        let mut sink = MemorySink::new();
        path.periodic(&mut sink);
        assert_eq!(spindexer.limit_applications(), 0);

        store.set("Spindexer/SupplyCurrentLimit", 30.0).unwrap();
        store.set("Loader/SupplyCurrentLimit", 45.0).unwrap();
        path.periodic(&mut sink);
        path.periodic(&mut sink);
        assert_eq!(spindexer.limit_applications(), 1);
        assert_eq!(spindexer.current_limits(), CurrentLimits::supply(30.0));
        assert_eq!(loader.current_limits(), CurrentLimits::supply_and_stator(45.0, 100.0));
    }

    #[test]
    fn actuator_failure_is_not_fatal() {
        let (mut path, spindexer, _) = path(&TunableStore::new());
        spindexer.set_failing(true);
        path.apply(FeedCommand::Feed);
        assert_eq!(spindexer.commands(), 0);
        assert_eq!(path.spindexer.commanded_percent(), 0.5);

        spindexer.set_failing(false);
        path.apply(FeedCommand::Feed);
        assert_eq!(spindexer.last_percent(), Some(0.5));
    }

    #[test]
    fn telemetry_keys_per_stage() {
        let (mut path, _, _) = path(&TunableStore::new());
        path.apply(FeedCommand::Feed);
        let mut sink = MemorySink::new();
        path.periodic(&mut sink);
        assert_eq!(sink.number("Spindexer/CommandedPercent"), Some(0.5));
        assert_eq!(sink.boolean("Loader/Running"), Some(true));
        assert!(sink.number("Loader/VelocityRPM").is_some());
        assert!(sink.number("Spindexer/StatorCurrent").is_some());
    }
}
