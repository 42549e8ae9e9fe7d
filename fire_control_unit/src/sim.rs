//! Simulated hardware for the binary and the tests.
//!
//! Handles are cheap clones sharing one state cell, so a test can keep a
//! probe on a motor after boxing another handle into a mechanism. Nothing
//! here is `Send`: the simulator lives on the control thread.

mod field;
mod motor;
mod rig;
mod turret;

pub use field::SimField;
pub use motor::{SIM_FREE_SPEED_RPS, SIM_RESPONSE, SimDrive, SimMotor};
pub use rig::{SimRig, build_sim_rig};
pub use turret::{SimEncoder, SimTurret, SimTurretMotor};
