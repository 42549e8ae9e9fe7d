//! Shot coordination root.
//!
//! Per tick: zone context → [`classifier`] → shot type; subsystem predicates
//! → [`readiness`] → ready flag; (request, ready, shot type) → [`feed_gate`]
//! → feed/stop command for the feed path.

pub mod classifier;
pub mod feed_gate;
pub mod readiness;
mod shooting;

pub use shooting::{CoordinatorOutput, ShootingCoordinator};
