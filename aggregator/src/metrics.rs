//! Prometheus metrics for the attribution engine

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, CounterVec, Encoder, TextEncoder};

// ── Computation metrics ──────────────────────────────────────────────────────

pub static ATTRIBUTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ampere_attributions_total",
        "Component attributions computed, by device-level power model",
        &["component", "model"]
    )
    .unwrap()
});

pub static UNSUPPORTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ampere_unsupported_total",
        "Attributions skipped because the hardware reports no activity",
        &["component"]
    )
    .unwrap()
});

// ── Residual metrics ─────────────────────────────────────────────────────────

pub static RESIDUAL_CLAMPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ampere_residual_clamped_total",
        "System-only residuals that went negative and were clamped to zero",
        &["component", "field"]
    )
    .unwrap()
});

/// Render all registered metrics to Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
