use crate::analyzer::rules::RuleInput;
use crate::analyzer::types::Diagnostic;

/// `network-policy-missing`
///
/// Evaluated over the whole set: one finding, reported against the first
/// workload, when workloads exist and no NetworkPolicy does.
pub fn check(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    if input.documents.iter().any(|d| d.is_kind("NetworkPolicy")) {
        return Vec::new();
    }
    let Some(first) = input.workloads().next() else {
        return Vec::new();
    };

    let count = input.workloads().count();
    vec![
        Diagnostic::new(
            &first.filename,
            format!("No NetworkPolicy restricts traffic to {} workload(s)", count),
        )
        .with_remediation("Add a default-deny NetworkPolicy and allow only the required ingress"),
    ]
}
