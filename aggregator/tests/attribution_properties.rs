//! Property-based tests for the attribution engine
//!
//! Invariants that must hold for arbitrary counter snapshots: exact duration
//! sums, total model selection, monotone estimates, non-negative residuals and
//! an aggregate never below the sum of its parts.

use ampere_aggregator::aggregate::aggregate;
use ampere_aggregator::calculator::compute_for_consumer;
use ampere_aggregator::model::select;
use ampere_shared::types::attribution::{AttributionOptions, PowerModel};
use ampere_shared::types::profile::{ComponentKind, ControllerConstants};
use ampere_shared::types::snapshot::{
    ActivityCounterSnapshot, ComponentActivity, ExecutionState, StateSlice,
};
use proptest::prelude::*;

const MAX_MS: u64 = 1 << 40;

fn constants() -> ControllerConstants {
    ControllerConstants::new(1.0, 50.0, 100.0)
}

fn snapshot_strategy() -> impl Strategy<Value = ActivityCounterSnapshot> {
    (
        0..MAX_MS,
        0..MAX_MS,
        0..MAX_MS,
        prop::option::of(-1i64..10_000_000_000),
        prop::option::of(0.0f64..100.0),
    )
        .prop_map(|(idle, rx, tx, energy, reported)| {
            let mut snapshot = ActivityCounterSnapshot::new(idle, rx, tx);
            snapshot.measured_energy_uj = energy;
            snapshot.reported_power_mah = reported;
            snapshot
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_duration_is_exact_sum(idle in 0..MAX_MS, rx in 0..MAX_MS, tx in 0..MAX_MS) {
        let snapshot = ActivityCounterSnapshot::new(idle, rx, tx);
        prop_assert_eq!(snapshot.duration_ms(), idle + rx + tx);

        let usage = compute_for_consumer(&snapshot, &constants(), PowerModel::ProfileEstimate, false);
        prop_assert_eq!(usage.duration_ms, idle + rx + tx);
    }

    #[test]
    fn prop_model_selection_is_total(
        energy in prop::option::of(-5i64..5),
        reported in prop::option::of(prop_oneof![Just(0.0f64), 0.001f64..10.0]),
        usable in any::<bool>(),
        force in any::<bool>(),
    ) {
        let model = select(energy, reported, usable, force);
        let measured = energy.is_some_and(|uj| uj >= 0);
        let has_reported = reported.is_some_and(|mah| mah != 0.0);

        let expected = if measured {
            PowerModel::MeasuredEnergy
        } else if !force && has_reported && usable {
            PowerModel::ReportedPower
        } else if usable {
            PowerModel::ProfileEstimate
        } else {
            PowerModel::Unavailable
        };
        prop_assert_eq!(model, expected);
        prop_assert_eq!(select(energy, reported, usable, force), model);
    }

    #[test]
    fn prop_estimate_is_monotone(
        idle in 0..MAX_MS,
        rx in 0..MAX_MS,
        tx in 0..MAX_MS,
        bump in 1u64..1_000_000,
        which in 0usize..3,
    ) {
        let c = constants();
        let base = c.estimate_mah(idle, rx, tx);
        let bumped = match which {
            0 => c.estimate_mah(idle + bump, rx, tx),
            1 => c.estimate_mah(idle, rx + bump, tx),
            _ => c.estimate_mah(idle, rx, tx + bump),
        };
        prop_assert!(bumped >= base);
    }

    #[test]
    fn prop_residual_non_negative_and_aggregate_floor(
        device in snapshot_strategy(),
        consumers in prop::collection::vec(snapshot_strategy(), 0..8),
        force in any::<bool>(),
    ) {
        let mut activity = ComponentActivity::new(device);
        for (i, snapshot) in consumers.into_iter().enumerate() {
            activity = activity.with_consumer(10_000 + i as u32, snapshot);
        }
        let options = AttributionOptions { per_state_breakdown: false, force_profile_model: force };

        let report = aggregate(ComponentKind::Bluetooth, &activity, &constants(), &options);
        let consumer_sum: f64 = report.consumers.values().map(|r| r.power_mah).sum();

        prop_assert!(report.aggregate.system_only_power_mah >= 0.0);
        prop_assert!(report.aggregate.device.power_mah >= report.aggregate.all_consumers.power_mah);
        prop_assert!((report.aggregate.all_consumers.power_mah - consumer_sum).abs() <= 1e-9 * consumer_sum.max(1.0));
        prop_assert!(
            report.aggregate.system_only_duration_ms
                <= report.aggregate.device.duration_ms
        );
    }

    #[test]
    fn prop_unspecified_state_never_reported(
        slice in (0..MAX_MS, 0..MAX_MS, 0..MAX_MS),
        energy in prop::option::of(0i64..1_000_000),
    ) {
        let state_slice = StateSlice::new(slice.0, slice.1, slice.2);
        let mut snapshot = ActivityCounterSnapshot::new(slice.0, slice.1, slice.2)
            .with_state(ExecutionState::Unspecified, state_slice)
            .with_state(ExecutionState::Foreground, state_slice);
        snapshot.measured_energy_uj = energy;

        let activity = ComponentActivity::new(ActivityCounterSnapshot::default())
            .with_consumer(1, snapshot);
        let options = AttributionOptions { per_state_breakdown: true, force_profile_model: false };
        let report = aggregate(ComponentKind::Bluetooth, &activity, &constants(), &options);

        for result in report.consumers.values() {
            let keys = result.per_key_power_mah.as_ref().unwrap();
            prop_assert!(keys.keys().all(|key| key.state != ExecutionState::Unspecified));
        }
    }
}
