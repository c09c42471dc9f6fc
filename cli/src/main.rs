//! CLI for Ampere
//!
//! Runs the attribution engine over recorded counter snapshots:
//! - attribute: Attribute component usage to consumers
//! - profile: Show the loaded power profile

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "ampere")]
#[command(about = "Ampere - component power attribution", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attribute component usage to its consumers
    Attribute(commands::attribute::AttributeArgs),

    /// Show power profile constants
    Profile(commands::profile::ProfileArgs),
}

fn main() {
    let cli = Cli::parse();

    let result: Result<()> = match cli.command {
        Commands::Attribute(args) => {
            init_tracing(args.verbose);
            commands::attribute::run(args)
        }
        Commands::Profile(args) => {
            init_tracing(args.verbose);
            commands::profile::run(args)
        }
    };

    if let Err(e) = result {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
