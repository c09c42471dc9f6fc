//! Shared types and utilities for Ampere
//!
//! This crate contains the data model used across the attribution engine,
//! result sinks and the command-line front end: activity counter snapshots,
//! power profile constants, power models and attribution results.

pub mod types;
pub mod utils;

#[cfg(feature = "wire-protocol")]
pub mod protocol;

// Re-export commonly used types
pub use types::{attribution::*, profile::*, snapshot::*};
