//! Diagnostics for accounting anomalies.
//!
//! Events are emitted via `tracing` with a dedicated target so they can be
//! filtered separately, and counted in Prometheus so a miscalibrated profile
//! shows up as a rising counter rather than a silently clamped residual.

use ampere_shared::types::attribution::PowerModel;
use ampere_shared::types::profile::ComponentKind;
use tracing::debug;

use crate::metrics::{ATTRIBUTIONS_TOTAL, RESIDUAL_CLAMPED_TOTAL, UNSUPPORTED_TOTAL};

pub const DIAGNOSTICS_TARGET: &str = "ampere::diagnostics";

/// Residual field that was clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidualField {
    Duration,
    Power,
}

impl ResidualField {
    pub fn as_str(self) -> &'static str {
        match self {
            ResidualField::Duration => "duration",
            ResidualField::Power => "power",
        }
    }
}

/// Record that consumer totals exceeded the device-wide figure.
pub fn residual_clamped(component: ComponentKind, field: ResidualField, deficit: f64) {
    debug!(
        target: DIAGNOSTICS_TARGET,
        event = "residual_clamped",
        component = %component,
        field = field.as_str(),
        deficit = deficit,
    );
    RESIDUAL_CLAMPED_TOTAL
        .with_label_values(&[component.as_str(), field.as_str()])
        .inc();
}

/// Record a skipped computation on hardware without activity reporting.
pub fn unsupported(component: ComponentKind) {
    debug!(
        target: DIAGNOSTICS_TARGET,
        event = "activity_reporting_unsupported",
        component = %component,
    );
    UNSUPPORTED_TOTAL
        .with_label_values(&[component.as_str()])
        .inc();
}

/// Count a completed attribution by its device-level model.
pub fn attribution_computed(component: ComponentKind, model: PowerModel) {
    ATTRIBUTIONS_TOTAL
        .with_label_values(&[component.as_str(), model.as_str()])
        .inc();
}
