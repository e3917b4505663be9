//! Output formatters for analysis results.

pub mod json;
pub mod table;

use crate::analyzer::cost::CostEstimate;
use crate::analyzer::security::SecurityReport;
use crate::analyzer::types::Finding;
use crate::pipeline::PipelineReport;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored when writing to a terminal.
    #[default]
    Table,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parse from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" | "plain" | "text" => Some(Self::Table),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn format_findings(findings: &[Finding], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => table::format_findings(findings),
        OutputFormat::Json => json::format_findings(findings),
    }
}

pub fn format_security(report: &SecurityReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => table::format_security(report),
        OutputFormat::Json => json::format_security(report),
    }
}

pub fn format_cost(estimate: &CostEstimate, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => table::format_cost(estimate),
        OutputFormat::Json => json::format_cost(estimate),
    }
}

/// Format a full generation report.
pub fn format_report(report: &PipelineReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => table::format_report(report),
        OutputFormat::Json => json::format_report(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("text"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::parse("sarif"), None);
    }
}
