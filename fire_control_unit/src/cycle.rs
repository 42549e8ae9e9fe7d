//! Fixed-rate control tick: commands → mechanisms → coordinator → feed path.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` to lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity` to pin to an isolated CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`.
//!
//! All four are no-ops without the `rt` feature.
//!
//! ## Tick Body
//! Leaves first, single-threaded, no suspension mid-tick:
//! 1. Drain commander queue (arrival order).
//! 2. Shooter, turret and intake `periodic`.
//! 3. Read zone context and hood readiness.
//! 4. Coordinator: classifier, readiness aggregator, feed gate.
//! 5. Forward the feed command to both feed stages (every tick).
//! 6. Flush the telemetry frame to the sink (every tick).

use std::sync::atomic::{AtomicBool, Ordering};

use fire_common::config::ConfigError;
use fire_common::control_unit::config::{ControlUnitConfig, DeviceIds};
use fire_common::hal::driver::{
    ActuatorError, AngleSensor, ExternalInputs, MotorController, VelocityMotor,
};
use fire_common::telemetry::{FrameSink, TelemetryFrame};
use fire_common::tunables::{TunableError, TunableStore};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::command::queue::{CommandQueue, CommandSender, FireCommand};
use crate::coordinator::{CoordinatorOutput, ShootingCoordinator};
use crate::feed_path::FeedPath;
use crate::intake::Intake;
use crate::shooter::Shooter;
use crate::turret::{Turret, TurretOutput};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-tick timing statistics, no allocation.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total ticks executed.
    pub cycle_count: u64,
    /// Last tick duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum tick duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum tick duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for the average.
    pub sum_cycle_ns: i64,
    /// Ticks that exceeded the cycle budget.
    pub overruns: u64,
    /// Maximum wake-up latency [ns].
    pub max_latency_ns: i64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a tick duration.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average tick time [ns] (0 if no ticks).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors during startup or RT setup. A running tick never fails.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("RT setup error: {0}")]
    RtSetup(String),

    #[error("actuator setup failed: {0}")]
    Actuator(#[from] ActuatorError),

    #[error("tunable override rejected: {0}")]
    Tunable(#[from] TunableError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the tick never page-faults on it.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let buf = [0xFFu8; 256 * 1024];
    core::hint::black_box(&buf);
}

#[cfg(not(feature = "rt"))]
fn prefault_stack() {}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param for the duration of the call.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Full RT setup sequence. Call once before [`CycleRunner::run`].
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    debug!(cpu_core, rt_priority, rt = cfg!(feature = "rt"), "rt setup complete");
    Ok(())
}

// ─── Hardware Bundle ────────────────────────────────────────────────

/// Every collaborator the runner drives.
pub struct Hardware {
    pub turret_motor: Box<dyn MotorController>,
    pub turret_encoder: Box<dyn AngleSensor>,
    pub shooter_leader: Box<dyn VelocityMotor>,
    pub shooter_follower: Box<dyn VelocityMotor>,
    pub spindexer: Box<dyn MotorController>,
    pub loader: Box<dyn MotorController>,
    pub intake_arm_leader: Box<dyn MotorController>,
    pub intake_arm_follower: Box<dyn MotorController>,
    pub intake_roller_left: Box<dyn MotorController>,
    pub intake_roller_right: Box<dyn MotorController>,
    pub inputs: Box<dyn ExternalInputs>,
}

impl Hardware {
    /// Warn about motors whose id differs from the configured one.
    fn check_device_ids(&self, ids: &DeviceIds) {
        let pairs = [
            ("turret_motor", self.turret_motor.device_id(), ids.turret_motor),
            ("shooter_leader", self.shooter_leader.device_id(), ids.shooter_leader),
            ("shooter_follower", self.shooter_follower.device_id(), ids.shooter_follower),
            ("spindexer", self.spindexer.device_id(), ids.spindexer),
            ("loader", self.loader.device_id(), ids.loader),
            ("intake_arm_leader", self.intake_arm_leader.device_id(), ids.intake_arm_leader),
            ("intake_arm_follower", self.intake_arm_follower.device_id(), ids.intake_arm_follower),
            ("intake_roller_left", self.intake_roller_left.device_id(), ids.intake_roller_left),
            ("intake_roller_right", self.intake_roller_right.device_id(), ids.intake_roller_right),
        ];
        for (role, actual, expected) in pairs {
            if actual != expected {
                warn!(role, actual, expected, "device id differs from configuration");
            }
        }
    }
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Outcome of one tick, for callers that drive ticks directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub shooter_ready: bool,
    pub turret_ready: bool,
    pub hood_ready: bool,
    pub turret: TurretOutput,
    pub coordinator: CoordinatorOutput,
}

pub struct CycleRunner {
    shooter: Shooter,
    turret: Turret,
    intake: Intake,
    feed_path: FeedPath,
    coordinator: ShootingCoordinator,
    inputs: Box<dyn ExternalInputs>,
    commands: CommandQueue,
    frame: TelemetryFrame,
    sink: Box<dyn FrameSink>,
    stats: CycleStats,
    cycle_time_ns: i64,
    tick_count: u64,
}

impl CycleRunner {
    /// Configure every mechanism and return the runner with the commander
    /// handle for its queue.
    pub fn new(
        config: &ControlUnitConfig,
        hardware: Hardware,
        store: &TunableStore,
        sink: Box<dyn FrameSink>,
    ) -> Result<(Self, CommandSender), CycleError> {
        hardware.check_device_ids(&config.devices);
        let Hardware {
            turret_motor,
            turret_encoder,
            shooter_leader,
            shooter_follower,
            spindexer,
            loader,
            intake_arm_leader,
            intake_arm_follower,
            intake_roller_left,
            intake_roller_right,
            inputs,
        } = hardware;

        let shooter = Shooter::new(shooter_leader, shooter_follower, store)?;
        let turret = Turret::new(turret_motor, turret_encoder, store, config.clamp_ordering)?;
        let intake = Intake::new(
            intake_arm_leader,
            intake_arm_follower,
            intake_roller_left,
            intake_roller_right,
            store,
        )?;
        let feed_path = FeedPath::new(spindexer, loader, store)?;
        let (sender, commands) = CommandQueue::new();

        info!(cycle_time_us = config.cycle_time_us, "cycle runner ready");

        Ok((
            Self {
                shooter,
                turret,
                intake,
                feed_path,
                coordinator: ShootingCoordinator::new(),
                inputs,
                commands,
                frame: TelemetryFrame::new(),
                sink,
                stats: CycleStats::new(),
                cycle_time_ns: config.cycle_time_us as i64 * 1000,
                tick_count: 0,
            },
            sender,
        ))
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Telemetry recorded during the last tick.
    #[inline]
    pub fn frame(&self) -> &TelemetryFrame {
        &self.frame
    }

    #[inline]
    pub fn coordinator(&self) -> &ShootingCoordinator {
        &self.coordinator
    }

    #[inline]
    pub fn turret(&self) -> &Turret {
        &self.turret
    }

    #[inline]
    pub fn shooter(&self) -> &Shooter {
        &self.shooter
    }

    #[inline]
    pub fn feed_path(&self) -> &FeedPath {
        &self.feed_path
    }

    #[inline]
    pub fn intake(&self) -> &Intake {
        &self.intake
    }

    /// Execute one control tick.
    pub fn tick(&mut self) -> TickReport {
        self.tick_count += 1;
        self.frame.begin(self.tick_count);

        for command in self.commands.drain() {
            self.dispatch(command);
        }

        self.shooter.periodic(&mut self.frame);
        let turret = self.turret.periodic(&mut self.frame);
        self.intake.periodic(&mut self.frame);

        let zone = self.inputs.zone_context();
        let hood_ready = self.inputs.hood_at_setpoint();
        let shooter_ready = self.shooter.at_setpoint();
        let turret_ready = self.turret.at_setpoint();
        let coordinator =
            self.coordinator
                .tick(&zone, shooter_ready, turret_ready, hood_ready, &mut self.frame);

        self.feed_path.apply(coordinator.command);
        self.feed_path.periodic(&mut self.frame);

        self.sink.flush_frame(&self.frame);

        TickReport {
            tick: self.tick_count,
            shooter_ready,
            turret_ready,
            hood_ready,
            turret,
            coordinator,
        }
    }

    fn dispatch(&mut self, command: FireCommand) {
        debug!(?command, "command");
        match command {
            FireCommand::SetMode(mode) => self.coordinator.set_mode(mode),
            FireCommand::SetRequestShot(request) => self.coordinator.set_request_shot(request),
            FireCommand::EnableTurretClosedLoop => self.turret.enable_closed_loop(),
            FireCommand::DisableTurret => self.turret.disable(),
            FireCommand::SetTurretManualPercent(p) => self.turret.set_manual_percent(p),
            FireCommand::EnableShooter => self.shooter.enable_closed_loop(),
            FireCommand::DisableShooter => self.shooter.disable(),
            FireCommand::SetShooterVolts(v) => self.shooter.set_open_loop_volts(v),
            FireCommand::Intake(action) => self.intake.apply_arm(action),
            FireCommand::IntakeRollers(action) => self.intake.apply_rollers(action),
        }
    }

    /// Run paced ticks until `running` is cleared.
    pub fn run(&mut self, running: &AtomicBool) -> Result<(), CycleError> {
        self.run_loop(None, running)
    }

    /// Run at most `ticks` paced ticks, stopping early if `running` is cleared.
    pub fn run_for(&mut self, ticks: u64, running: &AtomicBool) -> Result<(), CycleError> {
        self.run_loop(Some(ticks), running)
    }

    fn run_loop(&mut self, limit: Option<u64>, running: &AtomicBool) -> Result<(), CycleError> {
        info!(limit = ?limit, rt = cfg!(feature = "rt"), "control loop started");

        #[cfg(feature = "rt")]
        self.run_rt_loop(limit, running)?;

        #[cfg(not(feature = "rt"))]
        self.run_sim_loop(limit, running);

        info!(
            ticks = self.stats.cycle_count,
            avg_ns = self.stats.avg_cycle_ns(),
            max_ns = self.stats.max_cycle_ns,
            overruns = self.stats.overruns,
            "control loop stopped"
        );
        Ok(())
    }

    fn keep_running(&self, start_count: u64, limit: Option<u64>, running: &AtomicBool) -> bool {
        running.load(Ordering::Relaxed)
            && limit.is_none_or(|n| self.tick_count - start_count < n)
    }

    fn note_duration(&mut self, duration_ns: i64, latency_ns: i64) {
        self.stats.record(duration_ns, latency_ns);
        if duration_ns > self.cycle_time_ns {
            self.stats.overruns += 1;
            // First overrun, then powers of two.
            if self.stats.overruns.is_power_of_two() {
                warn!(
                    actual_ns = duration_ns,
                    budget_ns = self.cycle_time_ns,
                    overruns = self.stats.overruns,
                    "tick overrun"
                );
            }
        }
    }

    /// Paced loop using `clock_nanosleep(TIMER_ABSTIME)`.
    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, limit: Option<u64>, running: &AtomicBool) -> Result<(), CycleError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let start_count = self.tick_count;
        let mut next_wake =
            clock_gettime(clock).map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;

        while self.keep_running(start_count, limit, running) {
            next_wake = timespec_add_ns(next_wake, self.cycle_time_ns);

            let cycle_start = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
            self.tick();
            let cycle_end = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;

            let duration_ns = timespec_diff_ns(&cycle_end, &cycle_start);
            self.note_duration(duration_ns, 0);

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
            if let Ok(woke) = clock_gettime(clock) {
                self.stats.max_latency_ns = self
                    .stats
                    .max_latency_ns
                    .max(timespec_diff_ns(&woke, &next_wake).abs());
            }
        }
        Ok(())
    }

    /// Simulation loop using `std::thread::sleep`.
    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, limit: Option<u64>, running: &AtomicBool) {
        use std::time::{Duration, Instant};

        let cycle_duration = Duration::from_nanos(self.cycle_time_ns as u64);
        let start_count = self.tick_count;

        while self.keep_running(start_count, limit, running) {
            let cycle_start = Instant::now();
            self.tick();
            let elapsed = cycle_start.elapsed();
            self.note_duration(elapsed.as_nanos() as i64, 0);

            if let Some(remaining) = cycle_duration.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    while nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// `a − b` in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::{SimRig, build_sim_rig};
    use fire_common::control_unit::state::{FeedCommand, ShotType, TurretMode};
    use fire_common::control_unit::zone::ZoneContext;
    use fire_common::telemetry::MemorySink;

    fn rig_with(config: &ControlUnitConfig) -> SimRig {
        let sim = SimConfig {
            zone: ZoneContext {
                in_alliance_zone: true,
                field_ready: true,
                ..Default::default()
            },
            ..Default::default()
        };
        build_sim_rig(config, &sim, Box::new(MemorySink::new())).unwrap()
    }

    fn rig() -> SimRig {
        rig_with(&ControlUnitConfig::default())
    }

    #[test]
    fn cycle_stats_basic() {
        let mut s = CycleStats::new();
        assert_eq!(s.avg_cycle_ns(), 0);
        s.record(100, 5);
        s.record(300, 2);
        assert_eq!(s.cycle_count, 2);
        assert_eq!(s.min_cycle_ns, 100);
        assert_eq!(s.max_cycle_ns, 300);
        assert_eq!(s.avg_cycle_ns(), 200);
        assert_eq!(s.max_latency_ns, 5);
    }

    #[test]
    fn rt_setup_without_feature_is_noop() {
        #[cfg(not(feature = "rt"))]
        assert!(rt_setup(0, 80).is_ok());
    }

    #[test]
    fn cycle_error_display() {
        let err = CycleError::RtSetup("mlockall failed".to_string());
        assert_eq!(err.to_string(), "RT setup error: mlockall failed");
        let err: CycleError = TunableError::UnknownKey("Turret/kI".to_string()).into();
        assert!(err.to_string().contains("Turret/kI"));
    }

    #[test]
    fn commands_observed_on_next_tick() {
        let mut rig = rig();
        rig.commands.enable_turret_closed_loop().unwrap();
        assert_eq!(rig.runner.turret().mode(), TurretMode::Disabled);
        rig.runner.tick();
        assert_eq!(rig.runner.turret().mode(), TurretMode::ClosedLoop);
    }

    #[test]
    fn feed_stopped_without_request() {
        let mut rig = rig();
        let report = rig.runner.tick();
        assert_eq!(report.coordinator.shot_type, ShotType::Shoot);
        assert_eq!(report.coordinator.command, FeedCommand::Stop);
        assert_eq!(rig.spindexer.commands(), 1);
        assert_eq!(rig.loader.commands(), 1);
    }

    #[test]
    fn frame_holds_every_subsystem() {
        let mut rig = rig();
        rig.runner.tick();
        let frame = rig.runner.frame();
        assert_eq!(frame.dropped(), 0);
        for key in [
            "Turret/DeltaDeg",
            "Shooter/VelocityRPM",
            "Intake/ArmPercent",
            "Coordinator/ShotType",
            "Spindexer/Running",
            "Loader/CommandedPercent",
        ] {
            assert!(frame.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn run_for_stops_after_limit() {
        let mut config = ControlUnitConfig::default();
        config.cycle_time_us = 1_000;
        let mut rig = rig_with(&config);
        let running = AtomicBool::new(true);
        rig.runner.run_for(5, &running).unwrap();
        assert_eq!(rig.runner.tick_count(), 5);
        assert_eq!(rig.runner.stats().cycle_count, 5);
    }

    #[test]
    fn run_returns_when_flag_cleared() {
        let mut rig = rig();
        let running = AtomicBool::new(false);
        rig.runner.run(&running).unwrap();
        assert_eq!(rig.runner.tick_count(), 0);
    }
}
