#![warn(missing_docs)]
//! Casebench Report - Report Assembly and Output
//!
//! Per-testcase entries in declaration order, rendered as:
//! - JSON (the machine-readable report graders consume)
//! - Human (terminal table, rendered by the CLI)

mod json;
mod report;

pub use json::generate_json_report;
pub use report::{PLACEHOLDER_STDERR, Realtime, Report, ReportEntry, ReportSummary, Usage};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON document
    #[default]
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
