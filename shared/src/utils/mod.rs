//! Unit conversions and formatting helpers

/// Milliseconds in one hour
pub const MS_PER_HOUR: f64 = 1000.0 * 60.0 * 60.0;

/// Convert measured energy in micro-joules to mAh.
///
/// The nominal voltage is already folded into the upstream measurement, so
/// this is a plain rescale.
pub fn energy_uj_to_mah(energy_uj: i64) -> f64 {
    energy_uj as f64 / (3600.0 * 1000.0 * 1000.0) * 1000.0
}

/// Convert a milliamp-millisecond product to mAh
pub fn ma_ms_to_mah(ma_ms: f64) -> f64 {
    ma_ms / MS_PER_HOUR
}

/// Format a charge value with precision scaled to its magnitude
pub fn format_charge(mah: f64) -> String {
    if mah == 0.0 {
        return "0".to_string();
    }
    let abs = mah.abs();
    let precision = if abs < 0.00001 {
        8
    } else if abs < 0.0001 {
        7
    } else if abs < 0.001 {
        6
    } else if abs < 0.01 {
        5
    } else if abs < 0.1 {
        4
    } else if abs < 1.0 {
        3
    } else if abs < 10.0 {
        2
    } else if abs < 100.0 {
        1
    } else {
        0
    };
    format!("{:.*}", precision, mah)
}
