mod progress;
mod sections;
mod styling;
mod summary;
mod tables;

use anyhow::{Context, Result};

use crate::config::OutputFormat;
use crate::report::AnalysisReport;

pub use progress::PhaseProgress;
pub use styling::{dim, magenta_bold};
pub use summary::print_report;

/// Prints the `RepoLens` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🔍 RepoLens"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitHub Repository Analyzer")
    );
}

/// Renders `report` in the requested format.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub fn render_report(report: &AnalysisReport, format: OutputFormat, pretty: bool) -> Result<String> {
    match format {
        OutputFormat::Summary => Ok(summary::render_summary(report)),
        OutputFormat::Json if pretty => {
            serde_json::to_string_pretty(report).context("Failed to serialize report as JSON")
        }
        OutputFormat::Json => {
            serde_json::to_string(report).context("Failed to serialize report as JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).context("Failed to serialize report as YAML")
        }
    }
}
