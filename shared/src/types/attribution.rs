//! Attribution results
//!
//! These types represent the output of one attribution computation: a
//! record per consumer plus the component-wide aggregate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::profile::ComponentKind;
use super::snapshot::{AttributionKey, ConsumerId, ExecutionState};

/// Source of a power figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerModel {
    /// Directly measured energy
    MeasuredEnergy,
    /// Power reported by the controller itself
    ReportedPower,
    /// Estimated from activity durations and profile constants
    ProfileEstimate,
    /// No usable data; duration and power are zero
    Unavailable,
}

impl PowerModel {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerModel::MeasuredEnergy => "measured_energy",
            PowerModel::ReportedPower => "reported_power",
            PowerModel::ProfileEstimate => "profile_estimate",
            PowerModel::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for PowerModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied flags for one computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionOptions {
    /// Populate per execution state power for every consumer
    pub per_state_breakdown: bool,

    /// Ignore controller-reported power and estimate from the profile instead
    pub force_profile_model: bool,
}

/// Result for one consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub duration_ms: u64,
    pub power_mah: f64,

    /// Power per (consumer, state) key; never contains the unspecified state
    pub per_key_power_mah: Option<BTreeMap<AttributionKey, f64>>,

    pub model: PowerModel,

    pub rx_bytes: Option<u64>,
    pub tx_bytes: Option<u64>,
}

impl AttributionResult {
    /// Power for one execution state, if the breakdown was computed
    pub fn state_power_mah(&self, consumer: ConsumerId, state: ExecutionState) -> Option<f64> {
        self.per_key_power_mah
            .as_ref()
            .and_then(|keys| keys.get(&AttributionKey::new(consumer, state)).copied())
    }
}

/// Duration and power for one aggregate scope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScopeUsage {
    pub duration_ms: u64,
    pub power_mah: f64,
    pub model: PowerModel,
}

/// Component-wide totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateAttribution {
    /// Whole device. Power is never below the sum of consumer power.
    pub device: ScopeUsage,

    /// Sum over all tracked consumers
    pub all_consumers: ScopeUsage,

    /// Device usage not matched to any tracked consumer, clamped at zero
    pub system_only_duration_ms: u64,
    pub system_only_power_mah: f64,
}

/// Output of one attribution computation for one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionReport {
    pub component: ComponentKind,
    pub aggregate: AggregateAttribution,
    pub consumers: BTreeMap<ConsumerId, AttributionResult>,
}

/// Outcome of an attribution request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribution {
    /// Hardware does not report activity; callers keep their prior values.
    Unsupported(ComponentKind),
    Report(AttributionReport),
}

impl Attribution {
    pub fn report(&self) -> Option<&AttributionReport> {
        match self {
            Attribution::Report(report) => Some(report),
            Attribution::Unsupported(_) => None,
        }
    }

    pub fn into_report(self) -> Option<AttributionReport> {
        match self {
            Attribution::Report(report) => Some(report),
            Attribution::Unsupported(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Attribution::Report(_))
    }
}

/// JSON-safe per-key power entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPowerJson {
    pub consumer: ConsumerId,
    pub state: ExecutionState,
    pub power_mah: f64,
}

/// JSON-safe representation of one consumer's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerResultJson {
    pub consumer: ConsumerId,
    pub duration_ms: u64,
    pub power_mah: f64,
    pub model: PowerModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_key: Option<Vec<KeyPowerJson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_bytes: Option<u64>,
}

/// JSON-safe report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionReportJson {
    pub component: ComponentKind,
    pub aggregate: AggregateAttribution,
    pub consumers: Vec<ConsumerResultJson>,
}

impl AttributionReport {
    /// Sum of consumer power
    pub fn consumer_power_mah(&self) -> f64 {
        self.consumers.values().map(|r| r.power_mah).sum()
    }

    /// Convert to a JSON-serializable representation.
    /// Struct-keyed per-key maps are flattened to arrays, consumers are
    /// sorted by power descending.
    pub fn to_json(&self) -> AttributionReportJson {
        let mut consumers: Vec<ConsumerResultJson> = self
            .consumers
            .iter()
            .map(|(&consumer, result)| ConsumerResultJson {
                consumer,
                duration_ms: result.duration_ms,
                power_mah: result.power_mah,
                model: result.model,
                per_key: result.per_key_power_mah.as_ref().map(|keys| {
                    keys.iter()
                        .map(|(key, &power_mah)| KeyPowerJson {
                            consumer: key.consumer,
                            state: key.state,
                            power_mah,
                        })
                        .collect()
                }),
                rx_bytes: result.rx_bytes,
                tx_bytes: result.tx_bytes,
            })
            .collect();
        consumers.sort_by(|a, b| b.power_mah.total_cmp(&a.power_mah));

        AttributionReportJson {
            component: self.component,
            aggregate: self.aggregate,
            consumers,
        }
    }
}
