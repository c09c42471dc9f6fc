//! Data model for power attribution

pub mod attribution;
pub mod profile;
pub mod snapshot;
