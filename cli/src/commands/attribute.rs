//! Attribute command implementation

use ampere_aggregator::aggregate::{attribute_components, top_consumers};
use ampere_aggregator::calculator::ControllerPowerCalculator;
use ampere_aggregator::export::{write_json_report, JsonSink, ResultSink, WireSink};
use ampere_aggregator::legacy::{legacy_report, LegacyReport};
use ampere_aggregator::metrics::encode_metrics;
use ampere_aggregator::{input, EngineConfig};
use ampere_shared::types::attribution::{Attribution, AttributionReport};
use ampere_shared::types::profile::ComponentKind;
use ampere_shared::types::snapshot::ComponentActivity;
use ampere_shared::utils::format_charge;
use anyhow::{Context, Result};
use clap::Args;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::output;

#[derive(Args, Debug)]
pub struct AttributeArgs {
    /// Snapshot file (JSON)
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Engine configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Component the snapshot belongs to. Without it the snapshot must map
    /// component names to activity.
    #[arg(long)]
    pub component: Option<ComponentKind>,

    /// Split each consumer's power by execution state
    #[arg(long)]
    pub per_state: bool,

    /// Ignore reported power and estimate from the profile
    #[arg(long)]
    pub force_profile: bool,

    /// Write the reports as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write the reports as length-prefixed bincode envelopes
    #[arg(long)]
    pub wire: Option<PathBuf>,

    /// Also print the legacy system usage entry
    #[arg(long)]
    pub legacy: bool,

    /// Print diagnostics counters in Prometheus text format
    #[arg(long)]
    pub metrics: bool,

    /// Number of consumers to show per component
    #[arg(short = 'n', long, default_value = "10")]
    pub top: usize,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: AttributeArgs) -> Result<()> {
    let config =
        EngineConfig::load(args.config.as_deref()).context("Failed to load engine configuration")?;

    let mut options = config.options;
    options.per_state_breakdown |= args.per_state;
    options.force_profile_model |= args.force_profile;

    let activities = load_snapshot(&args.snapshot, args.component)?;
    if activities.is_empty() {
        output::info("Snapshot contains no components.");
        return Ok(());
    }

    let results = attribute_components(&config.profile, &activities, &options);

    for (kind, attribution) in &results {
        match attribution {
            Attribution::Report(report) => print_report(report, args.top),
            Attribution::Unsupported(_) => {
                output::warning(&format!("{}: activity reporting not supported, skipped", kind))
            }
        }
    }

    if let Some(path) = &args.json {
        write_json(&results, path)?;
        output::success(&format!("Reports written to {}", path.display()));
    }

    if let Some(path) = &args.wire {
        write_wire(&results, path)?;
        output::success(&format!("Envelopes written to {}", path.display()));
    }

    if args.legacy {
        for (&kind, activity) in &activities {
            let calculator = ControllerPowerCalculator::new(kind, &config.profile);
            match legacy_report(&calculator, activity, &config.system_consumers) {
                Some(report) => print_legacy(&report),
                None => output::info(&format!("{}: no legacy report (unusable profile)", kind)),
            }
        }
    }

    if args.metrics {
        output::header("Diagnostics");
        print!("{}", encode_metrics());
    }

    Ok(())
}

fn load_snapshot(
    path: &Path,
    component: Option<ComponentKind>,
) -> Result<BTreeMap<ComponentKind, ComponentActivity>> {
    let activities = match component {
        Some(kind) => {
            let activity = input::load_activity(path)
                .with_context(|| format!("Failed to load {} snapshot", kind))?;
            BTreeMap::from([(kind, activity)])
        }
        None => input::load_activities(path).context("Failed to load snapshot")?,
    };
    Ok(activities)
}

/// A single report goes to a pretty-printed file, several to JSON lines.
fn write_json(results: &BTreeMap<ComponentKind, Attribution>, path: &Path) -> Result<()> {
    let reports: Vec<&AttributionReport> = results.values().filter_map(|a| a.report()).collect();
    if let [report] = reports.as_slice() {
        return write_json_report(report, path);
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut sink = JsonSink::new(BufWriter::new(file));
    for attribution in results.values() {
        sink.accept(attribution)?;
    }
    sink.into_inner().flush()?;
    Ok(())
}

fn write_wire(results: &BTreeMap<ComponentKind, Attribution>, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut sink = WireSink::new(BufWriter::new(file));
    for attribution in results.values() {
        sink.accept(attribution)?;
    }
    sink.into_inner().flush()?;
    Ok(())
}

fn print_report(report: &AttributionReport, top: usize) {
    let aggregate = &report.aggregate;

    output::header(report.component.as_str());
    println!(
        "  Device:        {:>10}ms {:>14}  ({})",
        aggregate.device.duration_ms,
        format_charge(aggregate.device.power_mah),
        output::model(aggregate.device.model)
    );
    println!(
        "  All consumers: {:>10}ms {:>14}",
        aggregate.all_consumers.duration_ms,
        format_charge(aggregate.all_consumers.power_mah)
    );
    println!(
        "  System only:   {:>10}ms {:>14}",
        aggregate.system_only_duration_ms,
        format_charge(aggregate.system_only_power_mah)
    );

    if report.consumers.is_empty() {
        return;
    }

    println!(
        "\n  {:>10} {:>12} {:>14} {:>12} {:>12}  MODEL",
        "CONSUMER", "TIME(ms)", "POWER", "RX", "TX"
    );
    for (id, _) in top_consumers(report, top) {
        let result = &report.consumers[&id];
        println!(
            "  {:>10} {:>12} {:>14} {:>12} {:>12}  {}",
            id,
            result.duration_ms,
            format_charge(result.power_mah),
            bytes(result.rx_bytes),
            bytes(result.tx_bytes),
            output::model(result.model)
        );

        if let Some(per_key) = &result.per_key_power_mah {
            for (key, mah) in per_key.iter().filter(|(_, mah)| **mah > 0.0) {
                println!("  {:>10} {:>27}", key.state.as_str(), format_charge(*mah));
            }
        }
    }

    if report.consumers.len() > top {
        println!("  ... {} more", report.consumers.len() - top);
    }
}

fn bytes(count: Option<u64>) -> String {
    count.map_or_else(|| "-".to_string(), |n| n.to_string())
}

fn print_legacy(report: &LegacyReport) {
    output::header(&format!("{} (legacy)", report.component));
    match &report.system_entry {
        Some(entry) => {
            println!(
                "  System usage: {}ms {}",
                entry.duration_ms,
                format_charge(entry.power_mah)
            );
            for id in &entry.absorbed {
                println!("    includes consumer {}", id);
            }
        }
        None => println!("  No system usage"),
    }
    let aggregated = report.consumers.values().filter(|c| c.aggregated).count();
    println!(
        "  {} consumers, {} folded into system usage",
        report.consumers.len(),
        aggregated
    );
}
