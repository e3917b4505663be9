use crate::analyzer::document::{container_name, get_quantity};
use crate::analyzer::rules::RuleInput;
use crate::analyzer::types::Diagnostic;

const CHECKED_KINDS: &[&str] = &["Deployment", "StatefulSet"];

const REQUIRED: [(&str, &str); 4] = [
    ("requests", "cpu"),
    ("requests", "memory"),
    ("limits", "cpu"),
    ("limits", "memory"),
];

/// `resource-limits-present`
pub fn check(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for doc in input.documents {
        if !CHECKED_KINDS.contains(&doc.kind.as_str()) {
            continue;
        }
        for container in doc.containers() {
            let missing: Vec<String> = REQUIRED
                .iter()
                .filter(|(section, resource)| {
                    get_quantity(container, &["resources", *section, *resource]).is_none()
                })
                .map(|(section, resource)| format!("{}.{}", section, resource))
                .collect();

            if !missing.is_empty() {
                out.push(
                    Diagnostic::new(
                        &doc.filename,
                        format!(
                            "Container '{}' in {} is missing resources: {}",
                            container_name(container),
                            doc.display_name(),
                            missing.join(", ")
                        ),
                    )
                    .with_remediation("Set cpu and memory under both resources.requests and resources.limits"),
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::rules::test_support::run;

    #[test]
    fn test_complete_resources_pass() {
        let yaml = r#"
kind: Deployment
metadata:
  name: web
spec:
  template:
    spec:
      containers:
        - name: app
          resources:
            requests: {cpu: 100m, memory: 128Mi}
            limits: {cpu: 1, memory: 1Gi}
"#;
        assert!(run(check, yaml, None).is_empty());
    }

    #[test]
    fn test_missing_limits_fire_per_container() {
        let yaml = r#"
kind: StatefulSet
metadata:
  name: db
spec:
  template:
    spec:
      containers:
        - name: postgres
          resources:
            requests: {cpu: 1, memory: 2Gi}
        - name: exporter
"#;
        let diags = run(check, yaml, None);
        assert_eq!(diags.len(), 2);
        assert!(diags[0].message.contains("limits.cpu, limits.memory"));
        assert!(diags[1].message.contains("requests.cpu"));
    }

    #[test]
    fn test_other_kinds_are_ignored() {
        let yaml = "kind: Pod\nmetadata:\n  name: p\nspec:\n  containers:\n    - name: c\n";
        assert!(run(check, yaml, None).is_empty());
    }
}
