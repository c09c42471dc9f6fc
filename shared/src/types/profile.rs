//! Power profile constants
//!
//! Average current draw per controller state, supplied by device calibration
//! data. Read-only input to the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::utils::ma_ms_to_mah;

/// Hardware component whose usage is being attributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Bluetooth,
    Wifi,
    Modem,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::Bluetooth,
        ComponentKind::Wifi,
        ComponentKind::Modem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Bluetooth => "bluetooth",
            ComponentKind::Wifi => "wifi",
            ComponentKind::Modem => "modem",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComponentKind {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bluetooth" | "bt" => Ok(ComponentKind::Bluetooth),
            "wifi" => Ok(ComponentKind::Wifi),
            "modem" | "cellular" => Ok(ComponentKind::Modem),
            _ => Err(ProfileError::UnknownComponent(s.to_string())),
        }
    }
}

/// Errors raised while validating profile constants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    #[error("invalid {field} constant for {component}: {value}")]
    InvalidConstant {
        component: ComponentKind,
        field: &'static str,
        value: f64,
    },
}

/// Average current (mA) drawn by a controller in each of its states
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerConstants {
    #[serde(default)]
    pub idle_ma: f64,

    #[serde(default)]
    pub rx_ma: f64,

    #[serde(default)]
    pub tx_ma: f64,
}

impl ControllerConstants {
    pub fn new(idle_ma: f64, rx_ma: f64, tx_ma: f64) -> Self {
        Self { idle_ma, rx_ma, tx_ma }
    }

    /// Constants can drive the estimate only when all three are non-zero.
    pub fn is_usable(&self) -> bool {
        [self.idle_ma, self.rx_ma, self.tx_ma]
            .iter()
            .all(|ma| *ma != 0.0 && ma.is_finite())
    }

    /// Estimated charge in mAh for the given state durations
    pub fn estimate_mah(&self, idle_ms: u64, rx_ms: u64, tx_ms: u64) -> f64 {
        ma_ms_to_mah(
            idle_ms as f64 * self.idle_ma + rx_ms as f64 * self.rx_ma + tx_ms as f64 * self.tx_ma,
        )
    }

    /// Reject negative or non-finite constants. Zero is allowed and simply
    /// makes the set unusable.
    pub fn validate(&self, component: ComponentKind) -> Result<(), ProfileError> {
        for (field, value) in [("idle", self.idle_ma), ("rx", self.rx_ma), ("tx", self.tx_ma)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProfileError::InvalidConstant {
                    component,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Calibration constants for every modeled component.
///
/// Components missing from the source get all-zero constants, which are
/// unusable for estimation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerProfile {
    pub bluetooth: ControllerConstants,
    pub wifi: ControllerConstants,
    pub modem: ControllerConstants,
}

impl PowerProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, kind: ComponentKind, constants: ControllerConstants) -> Self {
        *self.constants_mut(kind) = constants;
        self
    }

    /// Constants for one component
    pub fn constants(&self, kind: ComponentKind) -> ControllerConstants {
        match kind {
            ComponentKind::Bluetooth => self.bluetooth,
            ComponentKind::Wifi => self.wifi,
            ComponentKind::Modem => self.modem,
        }
    }

    fn constants_mut(&mut self, kind: ComponentKind) -> &mut ControllerConstants {
        match kind {
            ComponentKind::Bluetooth => &mut self.bluetooth,
            ComponentKind::Wifi => &mut self.wifi,
            ComponentKind::Modem => &mut self.modem,
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        ComponentKind::ALL
            .iter()
            .try_for_each(|&kind| self.constants(kind).validate(kind))
    }
}
