//! Commander input root.
//!
//! Operator and autonomous commands arrive asynchronously and are queued
//! until the start of the next control tick.

pub mod queue;
