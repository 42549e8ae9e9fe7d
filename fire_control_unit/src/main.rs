//! # Fire Control Unit
//!
//! Runs the fire-control tick loop against simulated hardware.
//!
//! Loads one TOML file (`config/fire_control.toml` by default), applies the
//! tunable overrides it carries, performs RT setup when built with the `rt`
//! feature, and ticks until Ctrl-C or until `--ticks` have elapsed.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use fire_common::config::LogLevel;
use fire_common::consts::DEFAULT_CONFIG_PATH;
use fire_common::telemetry::{FrameSink, JsonLinesSink, TracingSink};
use fire_control_unit::config::load_config;
use fire_control_unit::cycle::{CycleError, rt_setup};
use fire_control_unit::sim::build_sim_rig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fire-control tick loop: shot classification, feed gating, turret safety.
#[derive(Parser, Debug)]
#[command(name = "fire_control_unit")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Fixed-rate fire-control loop for a turret shooter")]
struct Args {
    /// Path to the configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Stop after this many ticks (default: run until Ctrl-C).
    #[arg(long)]
    ticks: Option<u64>,

    /// Write telemetry frames as JSON lines to this file instead of the log.
    #[arg(long, value_name = "FILE")]
    telemetry_out: Option<PathBuf>,

    /// Spin up the shooter, track the turret and request a shot at startup.
    #[arg(long)]
    fire: bool,

    /// CPU core to pin the RT thread to (default: 1).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (default: 80).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // The log level comes from the config file, so peek at it before the
    // subscriber exists. Load errors are reported again by `run`.
    let level = load_config(&args.config)
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    info!("Fire Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Fire Control Unit shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.config).map_err(CycleError::from)?;
    info!(
        service = %config.shared.service_name,
        cycle_time_us = config.control_unit.cycle_time_us,
        clamp_ordering = ?config.control_unit.clamp_ordering,
        "config OK"
    );

    let sink: Box<dyn FrameSink> = match &args.telemetry_out {
        Some(path) => {
            info!(path = %path.display(), "telemetry to JSON lines");
            Box::new(JsonLinesSink::new(BufWriter::new(File::create(path)?)))
        }
        None => Box::new(TracingSink),
    };

    let mut rig = build_sim_rig(&config.control_unit, &config.sim, sink)?;
    rig.store
        .apply_overrides(&config.tunables)
        .map_err(CycleError::from)?;
    if !config.tunables.is_empty() {
        info!(count = config.tunables.len(), "tunable overrides applied");
    }

    if args.fire {
        rig.commands.enable_shooter()?;
        rig.commands.enable_turret_closed_loop()?;
        rig.commands.set_request_shot(true)?;
        info!("fire sequence queued");
    }

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    match args.ticks {
        Some(n) => rig.runner.run_for(n, &running)?,
        None => rig.runner.run(&running)?,
    }
    Ok(())
}

fn setup_tracing(args: &Args, level: LogLevel) {
    let default = if args.verbose {
        "debug"
    } else {
        level.as_directive()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if args.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    }
}
