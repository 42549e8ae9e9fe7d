//! Hardware collaborator contracts.
//!
//! The fire-control core never talks to a motor controller, encoder or field
//! classifier directly. It drives them through the traits in [`driver`] and
//! describes their startup configuration with the types in [`types`].

pub mod driver;
pub mod types;
