//! Engine configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `AMPERE_*` environment variables (nested keys separated by
//! `__`, e.g. `AMPERE_OPTIONS__FORCE_PROFILE_MODEL=true`).

use ampere_shared::types::attribution::AttributionOptions;
use ampere_shared::types::profile::PowerProfile;
use ampere_shared::types::snapshot::ConsumerId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "AMPERE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default flags for attribution requests
    pub options: AttributionOptions,

    /// Calibration constants per component
    pub profile: PowerProfile,

    /// Consumers folded into the legacy system usage entry
    pub system_consumers: Vec<ConsumerId>,
}

impl EngineConfig {
    /// Load configuration from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Loading engine configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file only, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: EngineConfig = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate profile constants
    pub fn validate(&self) -> Result<()> {
        self.profile.validate()?;
        Ok(())
    }
}
