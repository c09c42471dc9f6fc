//! Per-consumer power computation and per-component calculators

use ampere_shared::types::attribution::{
    Attribution, AttributionOptions, AttributionResult, PowerModel,
};
use ampere_shared::types::profile::{ComponentKind, ControllerConstants, PowerProfile};
use ampere_shared::types::snapshot::{
    ActivityCounterSnapshot, AttributionKey, ComponentActivity, ConsumerId, ExecutionState,
    StateSlice,
};
use ampere_shared::utils::energy_uj_to_mah;
use std::collections::BTreeMap;

use crate::aggregate;
use crate::diagnostics;

/// Duration and power computed for one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct PowerAndDuration {
    pub duration_ms: u64,
    pub power_mah: f64,

    /// Power per execution state; `None` unless a breakdown was requested
    pub per_state_mah: Option<BTreeMap<ExecutionState, f64>>,
}

impl PowerAndDuration {
    fn zero(per_state: bool) -> Self {
        Self {
            duration_ms: 0,
            power_mah: 0.0,
            per_state_mah: fan_out(per_state, |_| 0.0),
        }
    }

    /// Attach the consumer identity and produce its result record.
    pub fn into_result(
        self,
        consumer: ConsumerId,
        model: PowerModel,
        snapshot: &ActivityCounterSnapshot,
    ) -> AttributionResult {
        AttributionResult {
            duration_ms: self.duration_ms,
            power_mah: self.power_mah,
            per_key_power_mah: self.per_state_mah.map(|states| {
                states
                    .into_iter()
                    .map(|(state, mah)| (AttributionKey::new(consumer, state), mah))
                    .collect()
            }),
            model,
            rx_bytes: snapshot.rx_bytes,
            tx_bytes: snapshot.tx_bytes,
        }
    }
}

/// Build the per-state map, skipping the unspecified state: it already
/// equals the whole-consumer total.
fn fan_out(requested: bool, power_of: impl Fn(ExecutionState) -> f64) -> Option<BTreeMap<ExecutionState, f64>> {
    requested.then(|| {
        ExecutionState::ALL
            .iter()
            .copied()
            .filter(|state| !state.is_unspecified())
            .map(|state| (state, power_of(state)))
            .collect()
    })
}

fn slice_energy_mah(slice: &StateSlice) -> f64 {
    slice.measured_energy().map_or(0.0, energy_uj_to_mah)
}

/// Compute duration and power for one snapshot under the given model.
///
/// Duration is always the counter sum; only power depends on the model.
/// Under [`PowerModel::Unavailable`] everything is zero.
pub fn compute_for_consumer(
    snapshot: &ActivityCounterSnapshot,
    constants: &ControllerConstants,
    model: PowerModel,
    per_state: bool,
) -> PowerAndDuration {
    let duration_ms = snapshot.duration_ms();

    match model {
        PowerModel::MeasuredEnergy => PowerAndDuration {
            duration_ms,
            power_mah: snapshot.measured_energy().map_or(0.0, energy_uj_to_mah),
            per_state_mah: fan_out(per_state, |state| {
                slice_energy_mah(&snapshot.state_slice(state))
            }),
        },
        // No per-state split exists upstream for reported power
        PowerModel::ReportedPower => PowerAndDuration {
            duration_ms,
            power_mah: snapshot.reported_power().unwrap_or(0.0),
            per_state_mah: fan_out(per_state, |_| 0.0),
        },
        PowerModel::ProfileEstimate => PowerAndDuration {
            duration_ms,
            power_mah: constants.estimate_mah(snapshot.idle_ms, snapshot.rx_ms, snapshot.tx_ms),
            per_state_mah: fan_out(per_state, |state| {
                let slice = snapshot.state_slice(state);
                constants.estimate_mah(slice.idle_ms, slice.rx_ms, slice.tx_ms)
            }),
        },
        PowerModel::Unavailable => PowerAndDuration::zero(per_state),
    }
}

/// Common contract for component power calculators
pub trait PowerCalculator: Send + Sync {
    /// Component this calculator models
    fn component(&self) -> ComponentKind;

    fn is_supported(&self, kind: ComponentKind) -> bool {
        kind == self.component()
    }

    /// Attribute the component's usage across its consumers
    fn compute_attribution(
        &self,
        activity: &ComponentActivity,
        options: &AttributionOptions,
    ) -> Attribution;
}

/// Calculator for radio controllers reporting idle/rx/tx activity
#[derive(Debug, Clone)]
pub struct ControllerPowerCalculator {
    component: ComponentKind,
    constants: ControllerConstants,
}

impl ControllerPowerCalculator {
    pub fn new(component: ComponentKind, profile: &PowerProfile) -> Self {
        Self::from_constants(component, profile.constants(component))
    }

    pub fn from_constants(component: ComponentKind, constants: ControllerConstants) -> Self {
        Self {
            component,
            constants,
        }
    }

    pub fn constants(&self) -> &ControllerConstants {
        &self.constants
    }

    /// Whether the profile carries usable constants for this controller
    pub fn has_power_controller(&self) -> bool {
        self.constants.is_usable()
    }

    /// Estimated power for the given activity durations
    pub fn estimate_power_mah(&self, idle_ms: u64, rx_ms: u64, tx_ms: u64) -> f64 {
        self.constants.estimate_mah(idle_ms, rx_ms, tx_ms)
    }
}

impl PowerCalculator for ControllerPowerCalculator {
    fn component(&self) -> ComponentKind {
        self.component
    }

    fn compute_attribution(
        &self,
        activity: &ComponentActivity,
        options: &AttributionOptions,
    ) -> Attribution {
        if !activity.reporting_supported {
            diagnostics::unsupported(self.component);
            return Attribution::Unsupported(self.component);
        }

        Attribution::Report(aggregate::aggregate(
            self.component,
            activity,
            &self.constants,
            options,
        ))
    }
}

/// Calculator for a component kind, configured from the profile.
pub fn calculator_for(kind: ComponentKind, profile: &PowerProfile) -> Box<dyn PowerCalculator> {
    match kind {
        // All modeled components are controllers with idle/rx/tx counters
        ComponentKind::Bluetooth | ComponentKind::Wifi | ComponentKind::Modem => {
            Box::new(ControllerPowerCalculator::new(kind, profile))
        }
    }
}
