//! Wire encoding for attribution results
//!
//! The engine itself defines no persistence format. Sinks that forward
//! results to another process use the envelope in [`wire`].

pub mod wire;
