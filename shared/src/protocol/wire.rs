//! Binary envelope for attribution results.
//!
//! Uses bincode with an explicit config so producer and consumer always use the
//! same encoding (fixint for lengths and enums), avoiding version/skew mismatches.

use crate::types::attribution::Attribution;
use anyhow::Result;
use bincode::Options;

/// Protocol version
pub const PROTOCOL_VERSION: u32 = 1;

/// Single bincode config for wire format: fixint encoding so map lengths and enum tags
/// have a fixed size and cannot be misinterpreted across builds or bincode versions.
fn wire_bincode() -> impl bincode::config::Options {
    bincode::config::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
}

/// Wire envelope around one attribution outcome
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReportEnvelope {
    pub version: u32,
    pub sequence: u64,
    pub attribution: Attribution,
}

impl ReportEnvelope {
    /// Create a new envelope
    pub fn new(sequence: u64, attribution: Attribution) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            sequence,
            attribution,
        }
    }

    /// Serialize envelope to bytes (bincode, fixint encoding).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        wire_bincode().serialize(self).map_err(Into::into)
    }

    /// Deserialize envelope from bytes, validating the protocol version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let envelope: Self = wire_bincode().deserialize(bytes)?;
        if envelope.version != PROTOCOL_VERSION {
            anyhow::bail!(
                "unsupported protocol version {} (expected {})",
                envelope.version,
                PROTOCOL_VERSION
            );
        }
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attribution::{
        AggregateAttribution, AttributionReport, AttributionResult, PowerModel, ScopeUsage,
    };
    use crate::types::profile::ComponentKind;
    use crate::types::snapshot::{AttributionKey, ConsumerId, ExecutionState};
    use std::collections::BTreeMap;

    fn sample_report() -> AttributionReport {
        let mut keys = BTreeMap::new();
        keys.insert(AttributionKey::new(ConsumerId(10), ExecutionState::Foreground), 0.002);

        let mut consumers = BTreeMap::new();
        consumers.insert(
            ConsumerId(10),
            AttributionResult {
                duration_ms: 800,
                power_mah: 0.004,
                per_key_power_mah: Some(keys),
                model: PowerModel::ProfileEstimate,
                rx_bytes: Some(1024),
                tx_bytes: None,
            },
        );

        AttributionReport {
            component: ComponentKind::Bluetooth,
            aggregate: AggregateAttribution {
                device: ScopeUsage {
                    duration_ms: 1000,
                    power_mah: 0.005,
                    model: PowerModel::ProfileEstimate,
                },
                all_consumers: ScopeUsage {
                    duration_ms: 800,
                    power_mah: 0.004,
                    model: PowerModel::ProfileEstimate,
                },
                system_only_duration_ms: 200,
                system_only_power_mah: 0.001,
            },
            consumers,
        }
    }

    #[test]
    fn test_roundtrip_report() {
        let envelope = ReportEnvelope::new(3, Attribution::Report(sample_report()));
        let bytes = envelope.to_bytes().unwrap();
        let decoded = ReportEnvelope::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_roundtrip_unsupported() {
        let envelope = ReportEnvelope::new(1, Attribution::Unsupported(ComponentKind::Wifi));
        let decoded = ReportEnvelope::from_bytes(&envelope.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.attribution, Attribution::Unsupported(ComponentKind::Wifi));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut envelope = ReportEnvelope::new(1, Attribution::Unsupported(ComponentKind::Modem));
        envelope.version = PROTOCOL_VERSION + 1;
        let bytes = envelope.to_bytes().unwrap();
        assert!(ReportEnvelope::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_garbage_bytes_fail() {
        let bytes = vec![0xFF; 20];
        assert!(ReportEnvelope::from_bytes(&bytes).is_err());
    }
}
