//! Power attribution engine
//!
//! Given activity counter snapshots for a shared radio controller, computes
//! each consumer's share of the controller's power, the component-wide
//! aggregate, and the residual attributable to no tracked consumer.
//!
//! The computation is synchronous and holds no state between calls; the
//! same profile can back any number of concurrent computations.

pub mod aggregate;
pub mod calculator;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod input;
pub mod legacy;
pub mod metrics;
pub mod model;

pub use aggregate::{aggregate, attribute_components};
pub use calculator::{calculator_for, ControllerPowerCalculator, PowerCalculator};
pub use config::EngineConfig;
pub use error::LoadError;
