//! JSON formatter.

use crate::analyzer::cost::CostEstimate;
use crate::analyzer::security::{ComplianceStatus, Grade, SecurityReport};
use crate::analyzer::types::{Finding, Severity, severity_counts};
use crate::generator::types::RenderedDocument;
use crate::pipeline::PipelineReport;
use serde::Serialize;
use std::collections::BTreeMap;

fn to_json<T: Serialize>(value: &T) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    out.push('\n');
    out
}

#[derive(Serialize)]
struct FindingsOutput<'a> {
    findings: &'a [Finding],
    summary: FindingsSummary,
}

#[derive(Serialize)]
struct FindingsSummary {
    total: usize,
    by_severity: BTreeMap<&'static str, usize>,
    passed: bool,
}

impl FindingsSummary {
    fn of(findings: &[Finding]) -> Self {
        Self {
            total: findings.len(),
            by_severity: severity_counts(findings)
                .into_iter()
                .map(|(severity, count)| (severity.as_str(), count))
                .collect(),
            passed: !findings
                .iter()
                .any(|f| matches!(f.severity, Severity::Critical | Severity::High)),
        }
    }
}

#[derive(Serialize)]
struct SecurityOutput<'a> {
    score: u32,
    grade: Grade,
    compliance: ComplianceStatus,
    findings: &'a [Finding],
}

impl<'a> From<&'a SecurityReport> for SecurityOutput<'a> {
    fn from(report: &'a SecurityReport) -> Self {
        Self {
            score: report.score,
            grade: report.grade,
            compliance: report.compliance,
            findings: &report.findings,
        }
    }
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    documents: Vec<&'a RenderedDocument>,
    findings: FindingsOutput<'a>,
    security: SecurityOutput<'a>,
    cost: CostEstimate,
}

/// Format findings as JSON with a severity summary.
pub fn format_findings(findings: &[Finding]) -> String {
    to_json(&FindingsOutput {
        findings,
        summary: FindingsSummary::of(findings),
    })
}

pub fn format_security(report: &SecurityReport) -> String {
    to_json(&SecurityOutput::from(report))
}

/// Amounts are rounded to minor units.
pub fn format_cost(estimate: &CostEstimate) -> String {
    to_json(&estimate.rounded())
}

pub fn format_report(report: &PipelineReport) -> String {
    to_json(&ReportOutput {
        documents: report.documents.iter().collect(),
        findings: FindingsOutput {
            findings: &report.findings,
            summary: FindingsSummary::of(&report.findings),
        },
        security: SecurityOutput::from(&report.security),
        cost: report.cost.rounded(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::types::RuleCode;

    #[test]
    fn test_findings_json_summary() {
        let findings = vec![Finding {
            rule_id: RuleCode::new("no-hardcoded-secrets"),
            severity: Severity::Critical,
            message: "Key 'password' holds a literal secret".to_string(),
            document: "creds.yaml".to_string(),
            remediation: None,
        }];
        let value: serde_json::Value = serde_json::from_str(&format_findings(&findings)).unwrap();
        assert_eq!(value["findings"][0]["rule_id"], "no-hardcoded-secrets");
        assert_eq!(value["findings"][0]["severity"], "critical");
        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["summary"]["by_severity"]["critical"], 1);
        assert_eq!(value["summary"]["passed"], false);
    }

    #[test]
    fn test_empty_findings_pass() {
        let value: serde_json::Value = serde_json::from_str(&format_findings(&[])).unwrap();
        assert_eq!(value["summary"]["passed"], true);
    }
}
