//! Profile command implementation

use ampere_aggregator::EngineConfig;
use ampere_shared::types::profile::ComponentKind;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::output;

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Engine configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the effective profile as TOML
    #[arg(long)]
    pub toml: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: ProfileArgs) -> Result<()> {
    let config =
        EngineConfig::load(args.config.as_deref()).context("Failed to load engine configuration")?;

    if args.toml {
        let rendered =
            toml::to_string_pretty(&config.profile).context("Failed to render profile as TOML")?;
        print!("{}", rendered);
        return Ok(());
    }

    output::header("Power profile");
    println!(
        "  {:>10} {:>10} {:>10} {:>10}  STATUS",
        "COMPONENT", "IDLE(mA)", "RX(mA)", "TX(mA)"
    );
    for kind in ComponentKind::ALL {
        let constants = config.profile.constants(kind);
        let status = if constants.is_usable() {
            "usable".green()
        } else {
            "unusable".red()
        };
        println!(
            "  {:>10} {:>10.3} {:>10.3} {:>10.3}  {}",
            kind.as_str(),
            constants.idle_ma,
            constants.rx_ma,
            constants.tx_ma,
            status
        );
    }

    if !config.system_consumers.is_empty() {
        let ids: Vec<String> = config.system_consumers.iter().map(|id| id.to_string()).collect();
        output::info(&format!("System consumers: {}", ids.join(", ")));
    }

    Ok(())
}
