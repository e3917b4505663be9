use crate::analyzer::rules::RuleInput;
use crate::analyzer::types::Diagnostic;
use crate::generator::naming::{MAX_NAME_LENGTH, is_dns1123_label};

fn describe(value: &str) -> &'static str {
    if value.len() > MAX_NAME_LENGTH {
        "is longer than 63 characters"
    } else {
        "is not a DNS-1123 label"
    }
}

/// `name-compliance`
pub fn check(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for doc in input.documents {
        match doc.name.as_deref() {
            None => out.push(
                Diagnostic::new(&doc.filename, format!("{} has no metadata.name", doc.kind))
                    .with_remediation("Set metadata.name"),
            ),
            Some(name) if !is_dns1123_label(name) => out.push(
                Diagnostic::new(
                    &doc.filename,
                    format!("Name '{}' {}", name, describe(name)),
                )
                .with_remediation("Use lowercase alphanumerics and '-', at most 63 characters"),
            ),
            Some(_) => {}
        }

        if let Some(namespace) = doc.namespace.as_deref()
            && !is_dns1123_label(namespace)
        {
            out.push(
                Diagnostic::new(
                    &doc.filename,
                    format!("Namespace '{}' {}", namespace, describe(namespace)),
                )
                .with_remediation("Use lowercase alphanumerics and '-', at most 63 characters"),
            );
        }
    }
    out
}
