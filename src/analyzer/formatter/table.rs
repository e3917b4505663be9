//! Human-readable formatter.

use crate::analyzer::cost::CostEstimate;
use crate::analyzer::security::{ComplianceStatus, Grade, SecurityReport};
use crate::analyzer::types::{Finding, Severity, severity_counts};
use crate::pipeline::PipelineReport;
use colored::Colorize;
use rust_decimal::Decimal;
use std::fmt::Write;

fn severity_label(severity: Severity) -> String {
    let label = format!("{:<8}", severity.as_str().to_uppercase());
    match severity {
        Severity::Critical => label.red().bold().to_string(),
        Severity::High => label.red().to_string(),
        Severity::Warning => label.yellow().to_string(),
        Severity::Info => label.blue().to_string(),
    }
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn flag(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

fn grade_label(grade: Grade) -> String {
    let label = grade.to_string();
    match grade {
        Grade::A | Grade::B => label.green().bold().to_string(),
        Grade::C => label.yellow().bold().to_string(),
        Grade::D | Grade::F => label.red().bold().to_string(),
    }
}

/// Findings one per line, followed by a count.
pub fn format_findings(findings: &[Finding]) -> String {
    let mut output = String::new();

    for finding in findings {
        let _ = writeln!(
            output,
            "{} {}: [{}] {}",
            severity_label(finding.severity),
            finding.document,
            finding.rule_id,
            finding.message
        );
        if let Some(ref remediation) = finding.remediation {
            let _ = writeln!(output, "         Remediation: {}", remediation);
        }
    }

    if findings.is_empty() {
        output.push_str("No issues found.\n");
    } else {
        let counts = severity_counts(findings)
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(severity, count)| format!("{} {}", count, severity))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(output, "\nFound {} issue(s) ({}).", findings.len(), counts);
    }

    output
}

fn format_compliance(output: &mut String, compliance: &ComplianceStatus) {
    let _ = writeln!(output, "  Pod Security baseline:   {}", flag(compliance.pod_security_baseline));
    let _ = writeln!(output, "  Pod Security restricted: {}", flag(compliance.pod_security_restricted));
    let _ = writeln!(output, "  Zero-trust ready:        {}", flag(compliance.zero_trust_ready));
}

fn security_summary(report: &SecurityReport) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Security score: {}/100 (grade {})",
        report.score,
        grade_label(report.grade)
    );
    format_compliance(&mut output, &report.compliance);
    output
}

pub fn format_security(report: &SecurityReport) -> String {
    let mut output = security_summary(report);
    output.push('\n');
    output.push_str(&format_findings(&report.findings));
    output
}

pub fn format_cost(estimate: &CostEstimate) -> String {
    let estimate = estimate.rounded();
    let mut output = String::new();
    let width = estimate.per_document.keys().map(String::len).max().unwrap_or(0);

    let _ = writeln!(
        output,
        "Estimated monthly cost: {} {}",
        money(estimate.total_monthly).bold(),
        estimate.currency
    );
    for (document, amount) in &estimate.per_document {
        let _ = writeln!(output, "  {:<width$}  {:>12}", document, money(*amount), width = width);
    }

    if estimate.optimizations.is_empty() {
        output.push_str("No optimizations suggested.\n");
        return output;
    }

    output.push_str("\nOptimizations:\n");
    for optimization in &estimate.optimizations {
        let _ = writeln!(
            output,
            "  {:<20} {:<width$}  {:>12} {}",
            optimization.action.to_string().cyan(),
            optimization.target_document,
            money(optimization.delta_monthly),
            estimate.currency,
            width = width
        );
    }
    let _ = writeln!(
        output,
        "Potential savings: {} {}",
        money(-estimate.potential_savings()).green(),
        estimate.currency
    );
    output
}

/// Documents, merged findings, security summary and cost.
pub fn format_report(report: &PipelineReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{}", format!("Rendered {} document(s)", report.documents.len()).bold());
    for document in &report.documents {
        let _ = writeln!(output, "  {:<48} {}", document.filename, document.kind);
    }

    let _ = writeln!(output, "\n{}", "Findings".bold());
    output.push_str(&format_findings(&report.findings));

    let _ = writeln!(output, "\n{}", "Security".bold());
    output.push_str(&security_summary(&report.security));

    let _ = writeln!(output, "\n{}", "Cost".bold());
    output.push_str(&format_cost(&report.cost));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::cost::{Optimization, OptimizationAction};
    use crate::analyzer::types::RuleCode;
    use std::collections::BTreeMap;

    fn finding(code: &str, severity: Severity) -> Finding {
        Finding {
            rule_id: RuleCode::new(code),
            severity,
            message: "message".to_string(),
            document: "app.yaml".to_string(),
            remediation: Some("fix it".to_string()),
        }
    }

    #[test]
    fn test_findings_count_line() {
        colored::control::set_override(false);
        let output = format_findings(&[
            finding("latest-tag", Severity::Warning),
            finding("no-hardcoded-secrets", Severity::Critical),
        ]);
        assert!(output.contains("app.yaml: [latest-tag] message"));
        assert!(output.contains("Remediation: fix it"));
        assert!(output.contains("Found 2 issue(s) (1 critical, 1 warning)."));
        assert_eq!(format_findings(&[]), "No issues found.\n");
    }

    #[test]
    fn test_cost_table_is_rounded() {
        colored::control::set_override(false);
        let estimate = CostEstimate {
            currency: "RUB".to_string(),
            total_monthly: Decimal::new(4501, 1),
            per_document: BTreeMap::from([("app-deployment.yaml".to_string(), Decimal::new(4501, 1))]),
            optimizations: vec![Optimization {
                action: OptimizationAction::EnableSpot,
                target_document: "app-deployment.yaml".to_string(),
                delta_monthly: Decimal::new(-157535, 3),
            }],
        };
        let output = format_cost(&estimate);
        assert!(output.contains("Estimated monthly cost: 450.10 RUB"));
        assert!(output.contains("enable-spot"));
        assert!(output.contains("-157.54"));
        assert!(output.contains("Potential savings: 157.54 RUB"));
    }
}
