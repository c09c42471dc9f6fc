//! Legacy usage report
//!
//! Older consumers of the engine expect a flat list of entries plus one
//! synthetic "system usage" entry per component instead of the two aggregate
//! scopes. This path never forces the profile model and never splits by
//! execution state.

use ampere_shared::types::attribution::{AttributionOptions, AttributionResult};
use ampere_shared::types::profile::ComponentKind;
use ampere_shared::types::snapshot::{ComponentActivity, ConsumerId};
use ampere_shared::utils::format_charge;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::aggregate;
use crate::calculator::{ControllerPowerCalculator, PowerCalculator};

/// One consumer entry in the legacy report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyConsumer {
    pub result: AttributionResult,

    /// Folded into the system usage entry
    pub aggregated: bool,
}

/// Usage of the component not attributable to ordinary consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemUsageEntry {
    pub component: ComponentKind,
    pub duration_ms: u64,
    pub power_mah: f64,

    /// System consumers whose usage was added to this entry
    pub absorbed: Vec<ConsumerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyReport {
    pub component: ComponentKind,
    pub consumers: BTreeMap<ConsumerId, LegacyConsumer>,

    /// Present only when its total power is positive
    pub system_entry: Option<SystemUsageEntry>,
}

/// Build the legacy report for one component.
///
/// Returns `None` when the profile has no usable constants for the
/// controller or the hardware does not report activity.
pub fn legacy_report(
    calculator: &ControllerPowerCalculator,
    activity: &ComponentActivity,
    system_consumers: &[ConsumerId],
) -> Option<LegacyReport> {
    if !calculator.has_power_controller() || !activity.reporting_supported {
        return None;
    }

    let component = calculator.component();
    let report = aggregate::aggregate(
        component,
        activity,
        calculator.constants(),
        &AttributionOptions::default(),
    );

    let mut entry = SystemUsageEntry {
        component,
        duration_ms: report.aggregate.system_only_duration_ms,
        power_mah: report.aggregate.system_only_power_mah,
        absorbed: Vec::new(),
    };
    if entry.power_mah != 0.0 {
        debug!(
            "{} active: time={}ms power={}",
            component,
            entry.duration_ms,
            format_charge(entry.power_mah)
        );
    }

    let consumers = report
        .consumers
        .into_iter()
        .map(|(id, result)| {
            let aggregated = system_consumers.contains(&id);
            if aggregated {
                debug!("{} adding system consumer {}", component, id);
                entry.duration_ms = entry.duration_ms.saturating_add(result.duration_ms);
                entry.power_mah += result.power_mah;
                entry.absorbed.push(id);
            }
            (id, LegacyConsumer { result, aggregated })
        })
        .collect();

    Some(LegacyReport {
        component,
        consumers,
        system_entry: (entry.power_mah > 0.0).then_some(entry),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampere_shared::types::profile::ControllerConstants;
    use ampere_shared::types::snapshot::ActivityCounterSnapshot;

    const BLUETOOTH_SERVICE: ConsumerId = ConsumerId(1002);

    fn calculator(constants: ControllerConstants) -> ControllerPowerCalculator {
        ControllerPowerCalculator::from_constants(ComponentKind::Bluetooth, constants)
    }

    fn usable() -> ControllerConstants {
        ControllerConstants::new(1.0, 50.0, 100.0)
    }

    #[test]
    fn test_requires_power_controller() {
        let activity = ComponentActivity::new(ActivityCounterSnapshot::new(100, 100, 100));
        let malformed = ControllerConstants::new(1.0, 50.0, 0.0);
        assert!(legacy_report(&calculator(malformed), &activity, &[]).is_none());
    }

    #[test]
    fn test_requires_activity_reporting() {
        assert!(legacy_report(&calculator(usable()), &ComponentActivity::unsupported(), &[]).is_none());
    }

    #[test]
    fn test_system_consumer_absorbed() {
        let activity = ComponentActivity::new(ActivityCounterSnapshot::new(2000, 1000, 1000))
            .with_consumer(10050, ActivityCounterSnapshot::new(500, 100, 100))
            .with_consumer(BLUETOOTH_SERVICE.0, ActivityCounterSnapshot::new(200, 200, 200));

        let report = legacy_report(&calculator(usable()), &activity, &[BLUETOOTH_SERVICE]).unwrap();

        let service = &report.consumers[&BLUETOOTH_SERVICE];
        assert!(service.aggregated);
        assert!(!report.consumers[&ConsumerId(10050)].aggregated);

        let entry = report.system_entry.unwrap();
        assert_eq!(entry.absorbed, vec![BLUETOOTH_SERVICE]);
        // residual (4000 - 1300) plus the absorbed service's 600
        assert_eq!(entry.duration_ms, 2700 + 600);
    }

    #[test]
    fn test_entry_omitted_without_power() {
        let activity = ComponentActivity::new(ActivityCounterSnapshot::new(100, 0, 0))
            .with_consumer(10050, ActivityCounterSnapshot::new(100, 0, 0));

        let report = legacy_report(&calculator(usable()), &activity, &[]).unwrap();
        assert!(report.system_entry.is_none());
        assert_eq!(report.consumers.len(), 1);
    }

    #[test]
    fn test_legacy_ignores_per_state_and_uses_reported_power() {
        let activity = ComponentActivity::new(ActivityCounterSnapshot::new(100, 0, 0))
            .with_consumer(
                10050,
                ActivityCounterSnapshot::new(100, 0, 0).with_reported_power(0.4),
            );

        let report = legacy_report(&calculator(usable()), &activity, &[]).unwrap();
        let consumer = &report.consumers[&ConsumerId(10050)].result;
        assert_eq!(consumer.power_mah, 0.4);
        assert!(consumer.per_key_power_mah.is_none());
    }
}
