//! Health probe and service account checks on long-running pods.

use crate::analyzer::document::{ParsedDocument, container_name, get_str};
use crate::analyzer::rules::RuleInput;
use crate::analyzer::types::Diagnostic;

/// Run-to-completion kinds have no use for probes.
fn is_long_running(doc: &ParsedDocument) -> bool {
    !doc.is_kind("Job") && !doc.is_kind("CronJob")
}

/// `missing-probes`
pub fn check_probes(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for doc in input.workloads().filter(|doc| is_long_running(doc)) {
        for container in doc.app_containers() {
            let missing: Vec<_> = ["readinessProbe", "livenessProbe"]
                .into_iter()
                .filter(|probe| container.get(*probe).is_none_or(|p| p.is_null()))
                .collect();
            if missing.is_empty() {
                continue;
            }
            out.push(
                Diagnostic::new(
                    &doc.filename,
                    format!(
                        "Container '{}' in {} has no {}",
                        container_name(container),
                        doc.display_name(),
                        missing.join(" or ")
                    ),
                )
                .with_remediation("Add readinessProbe and livenessProbe on the container's health port"),
            );
        }
    }
    out
}

fn is_default_account(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name == "default"
}

/// `service-account-missing`
pub fn check_service_account(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    input
        .workloads()
        .filter(|doc| {
            let Some(pod) = doc.pod_spec() else { return false };
            ["serviceAccountName", "serviceAccount"]
                .iter()
                .all(|field| get_str(pod, &[*field]).is_none_or(is_default_account))
        })
        .map(|doc| {
            Diagnostic::new(
                &doc.filename,
                format!("{} runs under the namespace's default service account", doc.display_name()),
            )
            .with_remediation("Set serviceAccountName to a dedicated ServiceAccount")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::rules::test_support::run;

    #[test]
    fn test_missing_probes_are_named() {
        let yaml = r#"
kind: Deployment
metadata:
  name: api
spec:
  template:
    spec:
      containers:
        - name: api
          readinessProbe:
            httpGet: {path: /ready, port: 8080}
        - name: sidecar
          readinessProbe:
            tcpSocket: {port: 9000}
          livenessProbe:
            tcpSocket: {port: 9000}
      initContainers:
        - name: migrate
"#;
        let diags = run(check_probes, yaml, None);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'api'"));
        assert!(diags[0].message.contains("livenessProbe"));
        assert!(!diags[0].message.contains("readinessProbe"));
    }

    #[test]
    fn test_jobs_need_no_probes() {
        let yaml = r#"
kind: Job
metadata:
  name: migrate
spec:
  template:
    spec:
      containers:
        - name: migrate
"#;
        assert!(run(check_probes, yaml, None).is_empty());
    }

    #[test]
    fn test_service_account() {
        let yaml = r#"
kind: Deployment
metadata:
  name: api
spec:
  template:
    spec:
      serviceAccountName: api
      containers:
        - name: api
---
kind: StatefulSet
metadata:
  name: db
spec:
  template:
    spec:
      serviceAccountName: ""
      containers:
        - name: db
---
kind: DaemonSet
metadata:
  name: agent
spec:
  template:
    spec:
      serviceAccountName: default
      containers:
        - name: agent
---
kind: Service
metadata:
  name: api
"#;
        let diags = run(check_service_account, yaml, None);
        let documents: Vec<_> = diags.iter().map(|d| d.document.as_str()).collect();
        assert_eq!(documents, vec!["doc-1.yaml", "doc-2.yaml"]);
    }
}
