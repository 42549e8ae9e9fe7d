//! Fire-control shared types.
//!
//! All types shared between the control unit, its simulator and external
//! tooling live here. Organized by domain: state enums, zone/readiness
//! snapshots, turret control parameters, and configuration structures.

pub mod config;
pub mod control;
pub mod state;
pub mod zone;
