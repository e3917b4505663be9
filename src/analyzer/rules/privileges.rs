//! Privilege, capability and host-access checks on pod specs.

use crate::analyzer::document::{ParsedDocument, container_name, get_bool, lookup};
use crate::analyzer::rules::RuleInput;
use crate::analyzer::types::{Diagnostic, Severity};
use serde_yaml::Value;

/// Capabilities that grant host-level control.
pub const DANGEROUS_CAPABILITIES: &[&str] =
    &["NET_ADMIN", "SYS_ADMIN", "NET_RAW", "SYS_PTRACE", "SYS_MODULE"];

/// Capabilities added to a container's securityContext.
pub fn added_capabilities(container: &Value) -> Vec<&str> {
    lookup(container, &["securityContext", "capabilities", "add"])
        .and_then(Value::as_sequence)
        .map(|caps| caps.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Capabilities dropped from a container's securityContext.
pub fn dropped_capabilities(container: &Value) -> Vec<&str> {
    lookup(container, &["securityContext", "capabilities", "drop"])
        .and_then(Value::as_sequence)
        .map(|caps| caps.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

pub fn is_privileged(container: &Value) -> bool {
    get_bool(container, &["securityContext", "privileged"]) == Some(true)
}

/// Whether the container may run as UID 0, taking pod defaults into account.
pub fn may_run_as_root(doc: &ParsedDocument, container: &Value) -> bool {
    let pod = doc.pod_spec();
    let pod_field = |field: &str| pod.and_then(|p| lookup(p, &["securityContext", field]));
    let container_field = |field: &str| lookup(container, &["securityContext", field]);

    let user = container_field("runAsUser")
        .or_else(|| pod_field("runAsUser"))
        .and_then(Value::as_i64);
    let non_root = container_field("runAsNonRoot")
        .or_else(|| pod_field("runAsNonRoot"))
        .and_then(Value::as_bool);

    match user {
        Some(0) => true,
        Some(_) => false,
        None => non_root != Some(true),
    }
}

/// Host namespaces a pod shares.
pub fn host_namespaces(doc: &ParsedDocument) -> Vec<&'static str> {
    let Some(pod) = doc.pod_spec() else {
        return Vec::new();
    };
    ["hostNetwork", "hostPID", "hostIPC"]
        .into_iter()
        .filter(|field| get_bool(pod, &[*field]) == Some(true))
        .collect()
}

/// Names of volumes that mount a host path.
pub fn host_path_volumes(doc: &ParsedDocument) -> Vec<&str> {
    doc.pod_spec()
        .and_then(|pod| pod.get("volumes"))
        .and_then(Value::as_sequence)
        .map(|volumes| {
            volumes
                .iter()
                .filter(|v| v.get("hostPath").is_some())
                .map(|v| v.get("name").and_then(Value::as_str).unwrap_or("<unnamed>"))
                .collect()
        })
        .unwrap_or_default()
}

/// `no-privileged-without-justification`
pub fn check_privileged(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let justified = |cap: &str| input.profile.is_some_and(|p| p.critical && p.permits_capability(cap));

    let mut out = Vec::new();
    for doc in input.workloads() {
        for container in doc.containers() {
            let name = container_name(container);
            if is_privileged(container) {
                out.push(
                    Diagnostic::new(
                        &doc.filename,
                        format!("Container '{}' in {} runs privileged", name, doc.display_name()),
                    )
                    .with_remediation("Remove privileged: true and add only the capabilities the workload needs"),
                );
            }

            for cap in added_capabilities(container) {
                let upper = cap.to_uppercase();
                let bare = upper.trim_start_matches("CAP_");
                if DANGEROUS_CAPABILITIES.contains(&bare) && !justified(bare) {
                    out.push(
                        Diagnostic::new(
                            &doc.filename,
                            format!(
                                "Container '{}' in {} adds capability {} without a profile that requires it",
                                name,
                                doc.display_name(),
                                bare
                            ),
                        )
                        .with_remediation(format!("Drop {} or deploy with a profile that lists it", bare)),
                    );
                }
            }
        }
    }
    out
}

/// `privilege-escalation`
pub fn check_privilege_escalation(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for doc in input.workloads() {
        for container in doc.containers() {
            if get_bool(container, &["securityContext", "allowPrivilegeEscalation"]) != Some(false) {
                out.push(
                    Diagnostic::new(
                        &doc.filename,
                        format!(
                            "Container '{}' in {} allows privilege escalation",
                            container_name(container),
                            doc.display_name()
                        ),
                    )
                    .with_remediation("Set securityContext.allowPrivilegeEscalation: false"),
                );
            }
        }
    }
    out
}

/// `missing-security-context`
pub fn check_security_context(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for doc in input.workloads() {
        for container in doc.containers() {
            if !container.get("securityContext").is_some_and(Value::is_mapping) {
                out.push(
                    Diagnostic::new(
                        &doc.filename,
                        format!(
                            "Container '{}' in {} has no securityContext",
                            container_name(container),
                            doc.display_name()
                        ),
                    )
                    .with_remediation("Add a securityContext that drops ALL capabilities and runs as non-root"),
                );
            }
        }
    }
    out
}

/// `run-as-root`
///
/// Downgraded to info when the profile grants capabilities, since such
/// workloads run as root on purpose.
pub fn check_run_as_root(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let permitted = input.profile.is_some_and(|p| !p.capabilities.is_empty());

    let mut out = Vec::new();
    for doc in input.workloads() {
        for container in doc.containers() {
            if !may_run_as_root(doc, container) {
                continue;
            }
            let mut diag = Diagnostic::new(
                &doc.filename,
                format!(
                    "Container '{}' in {} may run as root",
                    container_name(container),
                    doc.display_name()
                ),
            )
            .with_remediation("Set runAsNonRoot: true and a non-zero runAsUser");
            if permitted {
                diag = diag.with_severity(Severity::Info);
            }
            out.push(diag);
        }
    }
    out
}

/// `host-namespaces`
pub fn check_host_namespaces(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for doc in input.workloads() {
        for field in host_namespaces(doc) {
            out.push(
                Diagnostic::new(
                    &doc.filename,
                    format!("{} sets {}: true", doc.display_name(), field),
                )
                .with_remediation(format!("Remove {} from the pod spec", field)),
            );
        }
    }
    out
}

/// `host-path-volume`
pub fn check_host_path(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for doc in input.workloads() {
        for volume in host_path_volumes(doc) {
            out.push(
                Diagnostic::new(
                    &doc.filename,
                    format!("{} mounts host path volume '{}'", doc.display_name(), volume),
                )
                .with_remediation("Use a PersistentVolumeClaim, ConfigMap or emptyDir instead"),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::rules::test_support::run;
    use crate::generator::catalog::{ComponentCatalog, ComponentType};

    const CAPS_POD: &str = r#"
kind: Deployment
metadata:
  name: upf
spec:
  template:
    spec:
      containers:
        - name: upf
          securityContext:
            allowPrivilegeEscalation: false
            capabilities:
              add: [NET_ADMIN, SYS_ADMIN]
              drop: [ALL]
"#;

    const ROOTLESS_POD: &str = r#"
kind: Deployment
metadata:
  name: web
spec:
  template:
    spec:
      securityContext:
        runAsNonRoot: true
        runAsUser: 1000
      containers:
        - name: web
          securityContext:
            allowPrivilegeEscalation: false
"#;

    #[test]
    fn test_capabilities_need_a_critical_profile() {
        let diags = run(check_privileged, CAPS_POD, None);
        assert_eq!(diags.len(), 2);

        let upf = ComponentCatalog::builtin().get(ComponentType::Upf).unwrap();
        assert!(run(check_privileged, CAPS_POD, Some(upf)).is_empty());

        // AMF only lists NET_ADMIN
        let amf = ComponentCatalog::builtin().get(ComponentType::Amf).unwrap();
        let diags = run(check_privileged, CAPS_POD, Some(amf));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("SYS_ADMIN"));
    }

    #[test]
    fn test_privileged_is_never_justified() {
        let yaml = CAPS_POD.replace("allowPrivilegeEscalation: false", "privileged: true");
        let upf = ComponentCatalog::builtin().get(ComponentType::Upf).unwrap();
        let diags = run(check_privileged, &yaml, Some(upf));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("runs privileged"));
    }

    #[test]
    fn test_privilege_escalation() {
        assert!(run(check_privilege_escalation, ROOTLESS_POD, None).is_empty());
        let yaml = ROOTLESS_POD.replace("allowPrivilegeEscalation: false", "readOnlyRootFilesystem: true");
        assert_eq!(run(check_privilege_escalation, &yaml, None).len(), 1);
    }

    #[test]
    fn test_run_as_root_uses_pod_defaults() {
        assert!(run(check_run_as_root, ROOTLESS_POD, None).is_empty());

        let diags = run(check_run_as_root, CAPS_POD, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, None);

        let upf = ComponentCatalog::builtin().get(ComponentType::Upf).unwrap();
        let diags = run(check_run_as_root, CAPS_POD, Some(upf));
        assert_eq!(diags[0].severity, Some(Severity::Info));

        let yaml = ROOTLESS_POD.replace(
            "allowPrivilegeEscalation: false",
            "allowPrivilegeEscalation: false\n            runAsUser: 0",
        );
        assert_eq!(run(check_run_as_root, &yaml, None).len(), 1);
    }

    #[test]
    fn test_missing_security_context() {
        let yaml = "kind: Pod\nmetadata:\n  name: p\nspec:\n  containers:\n    - name: c\n      image: nginx:1.25\n";
        assert_eq!(run(check_security_context, yaml, None).len(), 1);
        assert!(run(check_security_context, ROOTLESS_POD, None).is_empty());
    }

    #[test]
    fn test_host_access() {
        let yaml = r#"
kind: DaemonSet
metadata:
  name: agent
spec:
  template:
    spec:
      hostNetwork: true
      hostPID: true
      volumes:
        - name: docker-sock
          hostPath:
            path: /var/run/docker.sock
        - name: scratch
          emptyDir: {}
      containers:
        - name: agent
"#;
        let diags = run(check_host_namespaces, yaml, None);
        assert_eq!(diags.len(), 2);
        assert!(diags[1].message.contains("hostPID"));

        let diags = run(check_host_path, yaml, None);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("docker-sock"));
    }
}
