//! # Fire Control Unit Library
//!
//! Tick-driven fire-control core. Once per fixed-rate tick it classifies the
//! field zone into a shot decision, aggregates subsystem readiness, gates the
//! feed path, and drives the turret toward its target while keeping the
//! command out of the forbidden region near the wiring limit.
//!
//! ## Tick Order (leaves first)
//!
//! 1. **Commander queue**: mode, shot request and mechanism commands
//! 2. **Mechanisms**: shooter, turret, intake
//! 3. **Coordinator**: classifier → readiness → feed gate
//! 4. **Feed path**: spindexer and loader receive the gate's command
//! 5. **Telemetry**: one fixed-capacity frame flushed per interval
//!
//! ## Zero-Allocation Tick
//!
//! Telemetry frames and command batches are fixed-capacity (`heapless`).
//! Mechanisms and their collaborators are built once at startup.

pub mod command;
pub mod config;
pub mod control;
pub mod coordinator;
pub mod cycle;
pub mod feed_path;
pub mod intake;
pub mod shooter;
pub mod sim;
pub mod turret;
