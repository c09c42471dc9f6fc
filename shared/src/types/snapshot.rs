//! Activity counter snapshots
//!
//! These types carry the accumulated idle/receive/transmit time of a shared
//! radio controller, either for one consumer or for the whole device, as
//! handed to the attribution engine by whoever samples the hardware.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel used by upstream counters for "no measured energy".
pub const ENERGY_UNAVAILABLE: i64 = -1;

/// Identifier of a consumer (application or subsystem)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumerId(pub u32);

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ConsumerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Coarse lifecycle bucket used to split a consumer's usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// State-independent total for a consumer
    Unspecified,
    Foreground,
    Background,
    ForegroundService,
    Cached,
}

impl ExecutionState {
    /// Every execution state, in key order
    pub const ALL: [ExecutionState; 5] = [
        ExecutionState::Unspecified,
        ExecutionState::Foreground,
        ExecutionState::Background,
        ExecutionState::ForegroundService,
        ExecutionState::Cached,
    ];

    /// Whether this is the state-independent total
    pub fn is_unspecified(self) -> bool {
        self == ExecutionState::Unspecified
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionState::Unspecified => "unspecified",
            ExecutionState::Foreground => "foreground",
            ExecutionState::Background => "background",
            ExecutionState::ForegroundService => "foreground_service",
            ExecutionState::Cached => "cached",
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (consumer, execution state) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttributionKey {
    pub consumer: ConsumerId,
    pub state: ExecutionState,
}

impl AttributionKey {
    pub fn new(consumer: ConsumerId, state: ExecutionState) -> Self {
        Self { consumer, state }
    }
}

/// Durations (and optionally measured energy) accrued in one execution state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSlice {
    #[serde(default)]
    pub idle_ms: u64,

    #[serde(default)]
    pub rx_ms: u64,

    #[serde(default)]
    pub tx_ms: u64,

    /// Measured energy for this state in micro-joules (negative = unavailable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_energy_uj: Option<i64>,
}

impl StateSlice {
    pub fn new(idle_ms: u64, rx_ms: u64, tx_ms: u64) -> Self {
        Self {
            idle_ms,
            rx_ms,
            tx_ms,
            measured_energy_uj: None,
        }
    }

    pub fn with_measured_energy(mut self, energy_uj: i64) -> Self {
        self.measured_energy_uj = Some(energy_uj);
        self
    }

    /// Measured energy if present and not the "unavailable" sentinel
    pub fn measured_energy(&self) -> Option<i64> {
        self.measured_energy_uj.filter(|&uj| uj >= 0)
    }
}

/// Accumulated controller activity for one consumer or the whole device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityCounterSnapshot {
    /// Time the controller spent idle on behalf of this consumer
    #[serde(default)]
    pub idle_ms: u64,

    /// Time spent receiving
    #[serde(default)]
    pub rx_ms: u64,

    /// Time spent transmitting
    #[serde(default)]
    pub tx_ms: u64,

    /// Directly measured energy in micro-joules (absent or negative = unavailable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_energy_uj: Option<i64>,

    /// Power reported by the controller itself, in mAh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_power_mah: Option<f64>,

    /// Per execution state split, present only when requested upstream
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub per_state: BTreeMap<ExecutionState, StateSlice>,

    /// Bytes received over the radio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx_bytes: Option<u64>,

    /// Bytes transmitted over the radio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_bytes: Option<u64>,
}

impl ActivityCounterSnapshot {
    /// Create a snapshot from the three activity durations
    pub fn new(idle_ms: u64, rx_ms: u64, tx_ms: u64) -> Self {
        Self {
            idle_ms,
            rx_ms,
            tx_ms,
            ..Default::default()
        }
    }

    pub fn with_measured_energy(mut self, energy_uj: i64) -> Self {
        self.measured_energy_uj = Some(energy_uj);
        self
    }

    pub fn with_reported_power(mut self, power_mah: f64) -> Self {
        self.reported_power_mah = Some(power_mah);
        self
    }

    pub fn with_state(mut self, state: ExecutionState, slice: StateSlice) -> Self {
        self.per_state.insert(state, slice);
        self
    }

    /// Total usage duration; defined as the sum of the three counters.
    pub fn duration_ms(&self) -> u64 {
        self.idle_ms
            .saturating_add(self.rx_ms)
            .saturating_add(self.tx_ms)
    }

    /// Measured energy if present and not the "unavailable" sentinel
    pub fn measured_energy(&self) -> Option<i64> {
        self.measured_energy_uj.filter(|&uj| uj >= 0)
    }

    /// Reported power, treating zero and non-finite values as absent
    pub fn reported_power(&self) -> Option<f64> {
        self.reported_power_mah
            .filter(|&mah| mah != 0.0 && mah.is_finite())
    }

    /// Slice for one execution state; missing states contribute nothing.
    pub fn state_slice(&self, state: ExecutionState) -> StateSlice {
        self.per_state.get(&state).copied().unwrap_or_default()
    }
}

/// Everything the engine needs for one hardware component in one computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentActivity {
    /// Whether the hardware reports controller activity at all
    #[serde(default = "default_true")]
    pub reporting_supported: bool,

    /// Snapshot per tracked consumer
    #[serde(default)]
    pub consumers: BTreeMap<ConsumerId, ActivityCounterSnapshot>,

    /// Device-wide snapshot for the whole component
    #[serde(default)]
    pub device: ActivityCounterSnapshot,
}

fn default_true() -> bool {
    true
}

impl ComponentActivity {
    pub fn new(device: ActivityCounterSnapshot) -> Self {
        Self {
            reporting_supported: true,
            consumers: BTreeMap::new(),
            device,
        }
    }

    /// Activity for hardware without controller activity reporting
    pub fn unsupported() -> Self {
        Self {
            reporting_supported: false,
            ..Default::default()
        }
    }

    pub fn with_consumer(mut self, id: impl Into<ConsumerId>, snapshot: ActivityCounterSnapshot) -> Self {
        self.consumers.insert(id.into(), snapshot);
        self
    }
}
