//! Fire-Control Common Library
//!
//! Shared constants, configuration loading, live tunables, telemetry and
//! hardware collaborator contracts for all fire-control workspace crates.
//!
//! # Module Structure
//!
//! - [`angle`] - Angle normalization and shortest-path arithmetic
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide constants
//! - [`control_unit`] - Shared state enums, snapshots and control parameters
//! - [`hal`] - Motor, sensor and field-input collaborator traits
//! - [`telemetry`] - Telemetry sink contract and sinks
//! - [`tunables`] - Live-tunable parameter store
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use fire_common::prelude::*;
//!
//! let store = TunableStore::new();
//! let kp = store.register("Turret/kP", 0.02);
//! assert_eq!(kp.get(), 0.02);
//! ```

pub mod angle;
pub mod config;
pub mod consts;
pub mod control_unit;
pub mod hal;
pub mod prelude;
pub mod telemetry;
pub mod tunables;
