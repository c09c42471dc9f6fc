//! Attribution aggregation
//!
//! Walks every tracked consumer of a component, computes its duration and
//! power, accumulates totals, and derives the system-only residual from the
//! device-wide snapshot.

use ampere_shared::types::attribution::{
    AggregateAttribution, Attribution, AttributionOptions, AttributionReport, ScopeUsage,
};
use ampere_shared::types::profile::{ComponentKind, ControllerConstants, PowerProfile};
use ampere_shared::types::snapshot::{ComponentActivity, ConsumerId};
use ampere_shared::utils::format_charge;
use std::collections::BTreeMap;
use tracing::debug;

use crate::calculator::{calculator_for, compute_for_consumer};
use crate::diagnostics::{self, ResidualField};
use crate::model;

/// Running totals across consumers
#[derive(Debug, Default, Clone, Copy)]
struct ConsumerTotals {
    duration_ms: u64,
    power_mah: f64,
}

/// Subtract consumer totals from the device total, clamping at zero.
pub fn residual_duration_ms(component: ComponentKind, device_ms: u64, consumers_ms: u64) -> u64 {
    match device_ms.checked_sub(consumers_ms) {
        Some(residual) => residual,
        None => {
            diagnostics::residual_clamped(
                component,
                ResidualField::Duration,
                (consumers_ms - device_ms) as f64,
            );
            0
        }
    }
}

/// Subtract consumer power from the device power, clamping at zero.
pub fn residual_power_mah(component: ComponentKind, device_mah: f64, consumers_mah: f64) -> f64 {
    let residual = device_mah - consumers_mah;
    if residual < 0.0 {
        diagnostics::residual_clamped(component, ResidualField::Power, -residual);
        0.0
    } else {
        residual
    }
}

/// Attribute one component's usage across its consumers.
///
/// Consumers are processed independently, so the result does not depend on
/// iteration order. The engine holds no state between calls.
pub fn aggregate(
    component: ComponentKind,
    activity: &ComponentActivity,
    constants: &ControllerConstants,
    options: &AttributionOptions,
) -> AttributionReport {
    let mut consumers = BTreeMap::new();
    let mut totals = ConsumerTotals::default();

    for (&id, snapshot) in &activity.consumers {
        let model = model::select_for(snapshot, constants, options);
        let usage = compute_for_consumer(snapshot, constants, model, options.per_state_breakdown);
        debug!(
            "{} consumer {}: model={} time={}ms power={}",
            component,
            id,
            model,
            usage.duration_ms,
            format_charge(usage.power_mah)
        );

        totals.duration_ms = totals.duration_ms.saturating_add(usage.duration_ms);
        totals.power_mah += usage.power_mah;
        consumers.insert(id, usage.into_result(id, model, snapshot));
    }

    // The whole component is one more virtual consumer, without a breakdown
    let device_model = model::select_for(&activity.device, constants, options);
    let device = compute_for_consumer(&activity.device, constants, device_model, false);

    let system_only_duration_ms =
        residual_duration_ms(component, device.duration_ms, totals.duration_ms);
    let system_only_power_mah = residual_power_mah(component, device.power_mah, totals.power_mah);
    debug!(
        "{} active: time={}ms power={}",
        component,
        system_only_duration_ms,
        format_charge(system_only_power_mah)
    );

    diagnostics::attribution_computed(component, device_model);

    AttributionReport {
        component,
        aggregate: AggregateAttribution {
            device: ScopeUsage {
                duration_ms: device.duration_ms,
                power_mah: device.power_mah.max(totals.power_mah),
                model: device_model,
            },
            all_consumers: ScopeUsage {
                duration_ms: totals.duration_ms,
                power_mah: totals.power_mah,
                model: device_model,
            },
            system_only_duration_ms,
            system_only_power_mah,
        },
        consumers,
    }
}

/// Attribute every component in `activities` with calculators built from the profile.
pub fn attribute_components(
    profile: &PowerProfile,
    activities: &BTreeMap<ComponentKind, ComponentActivity>,
    options: &AttributionOptions,
) -> BTreeMap<ComponentKind, Attribution> {
    activities
        .iter()
        .map(|(&kind, activity)| {
            let calculator = calculator_for(kind, profile);
            (kind, calculator.compute_attribution(activity, options))
        })
        .collect()
}

/// Consumers ranked by power, highest first.
pub fn top_consumers(report: &AttributionReport, limit: usize) -> Vec<(ConsumerId, f64)> {
    let mut ranked: Vec<(ConsumerId, f64)> = report
        .consumers
        .iter()
        .map(|(&id, result)| (id, result.power_mah))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampere_shared::types::attribution::PowerModel;
    use ampere_shared::types::snapshot::{ActivityCounterSnapshot, ExecutionState, StateSlice};

    fn constants() -> ControllerConstants {
        ControllerConstants::new(1.0, 50.0, 100.0)
    }

    #[test]
    fn test_aggregate_residual() {
        let activity = ComponentActivity::new(ActivityCounterSnapshot::new(1000, 600, 400))
            .with_consumer(1, ActivityCounterSnapshot::new(500, 200, 100))
            .with_consumer(2, ActivityCounterSnapshot::new(100, 100, 100));

        let report = aggregate(
            ComponentKind::Bluetooth,
            &activity,
            &constants(),
            &AttributionOptions::default(),
        );

        assert_eq!(report.consumers.len(), 2);
        assert_eq!(report.aggregate.all_consumers.duration_ms, 1100);
        assert_eq!(report.aggregate.device.duration_ms, 2000);
        assert_eq!(report.aggregate.system_only_duration_ms, 900);

        let consumer_sum = report.consumer_power_mah();
        let expected = report.aggregate.device.power_mah - consumer_sum;
        assert!((report.aggregate.system_only_power_mah - expected).abs() < 1e-12);
    }

    #[test]
    fn test_residual_clamps_when_consumers_exceed_device() {
        let activity = ComponentActivity::new(ActivityCounterSnapshot::new(500, 0, 0))
            .with_consumer(1, ActivityCounterSnapshot::new(700, 0, 0));

        let report = aggregate(
            ComponentKind::Bluetooth,
            &activity,
            &constants(),
            &AttributionOptions::default(),
        );

        assert_eq!(report.aggregate.system_only_duration_ms, 0);
        assert_eq!(report.aggregate.system_only_power_mah, 0.0);
        // Aggregate is floored at the consumer sum
        assert_eq!(
            report.aggregate.device.power_mah,
            report.aggregate.all_consumers.power_mah
        );
    }

    #[test]
    fn test_device_model_independent_of_consumers() {
        let activity =
            ComponentActivity::new(ActivityCounterSnapshot::new(0, 0, 0).with_measured_energy(3_600_000))
                .with_consumer(1, ActivityCounterSnapshot::new(100, 0, 0));

        let report = aggregate(
            ComponentKind::Wifi,
            &activity,
            &constants(),
            &AttributionOptions::default(),
        );

        assert_eq!(report.aggregate.device.model, PowerModel::MeasuredEnergy);
        assert_eq!(report.consumers[&ConsumerId(1)].model, PowerModel::ProfileEstimate);
        assert_eq!(report.aggregate.device.power_mah, 1.0);
    }

    #[test]
    fn test_per_state_breakdown_only_when_requested() {
        let snapshot = ActivityCounterSnapshot::new(100, 0, 0)
            .with_state(ExecutionState::Foreground, StateSlice::new(100, 0, 0));
        let activity = ComponentActivity::new(ActivityCounterSnapshot::new(100, 0, 0))
            .with_consumer(9, snapshot);

        let without = aggregate(
            ComponentKind::Bluetooth,
            &activity,
            &constants(),
            &AttributionOptions::default(),
        );
        assert!(without.consumers[&ConsumerId(9)].per_key_power_mah.is_none());

        let options = AttributionOptions {
            per_state_breakdown: true,
            force_profile_model: false,
        };
        let with = aggregate(ComponentKind::Bluetooth, &activity, &constants(), &options);
        let result = &with.consumers[&ConsumerId(9)];
        assert!(result.per_key_power_mah.is_some());
        assert!(result
            .state_power_mah(ConsumerId(9), ExecutionState::Foreground)
            .is_some_and(|mah| mah > 0.0));
    }

    #[test]
    fn test_empty_consumers() {
        let activity = ComponentActivity::new(ActivityCounterSnapshot::new(360, 0, 0));
        let report = aggregate(
            ComponentKind::Modem,
            &activity,
            &constants(),
            &AttributionOptions::default(),
        );
        assert!(report.consumers.is_empty());
        assert_eq!(report.aggregate.all_consumers.duration_ms, 0);
        assert_eq!(report.aggregate.system_only_duration_ms, 360);
        assert_eq!(
            report.aggregate.system_only_power_mah,
            report.aggregate.device.power_mah
        );
    }

    #[test]
    fn test_attribute_components_mixed_support() {
        let profile = PowerProfile::new()
            .with_component(ComponentKind::Bluetooth, constants())
            .with_component(ComponentKind::Wifi, constants());

        let mut activities = BTreeMap::new();
        activities.insert(
            ComponentKind::Bluetooth,
            ComponentActivity::new(ActivityCounterSnapshot::new(10, 10, 10)),
        );
        activities.insert(ComponentKind::Wifi, ComponentActivity::unsupported());

        let results = attribute_components(&profile, &activities, &AttributionOptions::default());
        assert!(results[&ComponentKind::Bluetooth].is_supported());
        assert_eq!(
            results[&ComponentKind::Wifi],
            Attribution::Unsupported(ComponentKind::Wifi)
        );
    }

    #[test]
    fn test_top_consumers() {
        let activity = ComponentActivity::new(ActivityCounterSnapshot::new(0, 0, 0))
            .with_consumer(1, ActivityCounterSnapshot::new(0, 10, 0))
            .with_consumer(2, ActivityCounterSnapshot::new(0, 0, 10))
            .with_consumer(3, ActivityCounterSnapshot::new(10, 0, 0));
        let report = aggregate(
            ComponentKind::Bluetooth,
            &activity,
            &constants(),
            &AttributionOptions::default(),
        );
        let top = top_consumers(&report, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, ConsumerId(2));
        assert_eq!(top[1].0, ConsumerId(1));
    }
}
