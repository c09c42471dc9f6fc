//! Power model selection
//!
//! Picks the best available source for a power figure. Pure and total:
//! every combination of inputs maps to exactly one model.

use ampere_shared::types::attribution::{AttributionOptions, PowerModel};
use ampere_shared::types::profile::ControllerConstants;
use ampere_shared::types::snapshot::ActivityCounterSnapshot;

/// Select a power model from the available data.
///
/// Priority: measured energy, then controller-reported power (unless the
/// caller forces the profile model), then the profile estimate. Without
/// any of those the model is [`PowerModel::Unavailable`].
pub fn select(
    measured_energy_uj: Option<i64>,
    reported_power_mah: Option<f64>,
    have_profile_constants: bool,
    force_profile_model: bool,
) -> PowerModel {
    if measured_energy_uj.is_some_and(|uj| uj >= 0) {
        return PowerModel::MeasuredEnergy;
    }

    let has_reported_power =
        reported_power_mah.is_some_and(|mah| mah != 0.0 && mah.is_finite());
    if !force_profile_model && has_reported_power && have_profile_constants {
        return PowerModel::ReportedPower;
    }

    if have_profile_constants {
        PowerModel::ProfileEstimate
    } else {
        PowerModel::Unavailable
    }
}

/// Select the model for one snapshot.
pub fn select_for(
    snapshot: &ActivityCounterSnapshot,
    constants: &ControllerConstants,
    options: &AttributionOptions,
) -> PowerModel {
    select(
        snapshot.measured_energy(),
        snapshot.reported_power(),
        constants.is_usable(),
        options.force_profile_model,
    )
}
