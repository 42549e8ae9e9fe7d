//! Control engine root.
//!
//! Proportional position law with deadband and output clamp. Setting the
//! deadband to zero disables it.

pub mod proportional;
