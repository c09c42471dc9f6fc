//! Output formatting utilities for CLI commands

use ampere_shared::types::attribution::PowerModel;
use colored::Colorize;

/// Print success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print warning message
pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Section header
pub fn header(title: &str) {
    println!("\n{}", format!("=== {} ===", title).bold());
}

/// Model name colored by how much it can be trusted
pub fn model(model: PowerModel) -> String {
    match model {
        PowerModel::MeasuredEnergy => model.as_str().green().to_string(),
        PowerModel::ReportedPower => model.as_str().cyan().to_string(),
        PowerModel::ProfileEstimate => model.as_str().yellow().to_string(),
        PowerModel::Unavailable => model.as_str().red().to_string(),
    }
}
