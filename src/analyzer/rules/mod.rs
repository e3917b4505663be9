//! Rule engine shared by the validator and the security analyzer.
//!
//! A rule is a plain function over every parsed document of a set. The engine
//! runs rules in registration order and stamps each diagnostic with the
//! rule's code and severity.

pub mod images;
pub mod naming;
pub mod network;
pub mod pod;
pub mod privileges;
pub mod resources;
pub mod secrets;

use crate::analyzer::document::ParsedDocument;
use crate::analyzer::security::SecuritySettings;
use crate::analyzer::types::{Diagnostic, Finding, RuleCode, Severity};
use crate::generator::catalog::ResourceProfile;

/// Rule codes.
pub mod codes {
    pub const NO_HARDCODED_SECRETS: &str = "no-hardcoded-secrets";
    pub const RESOURCE_LIMITS_PRESENT: &str = "resource-limits-present";
    pub const NAME_COMPLIANCE: &str = "name-compliance";
    pub const NO_PRIVILEGED_WITHOUT_JUSTIFICATION: &str = "no-privileged-without-justification";
    pub const PRIVILEGE_ESCALATION: &str = "privilege-escalation";
    pub const MISSING_SECURITY_CONTEXT: &str = "missing-security-context";
    pub const RUN_AS_ROOT: &str = "run-as-root";
    pub const HOST_NAMESPACES: &str = "host-namespaces";
    pub const HOST_PATH_VOLUME: &str = "host-path-volume";
    pub const MISSING_PROBES: &str = "missing-probes";
    pub const SERVICE_ACCOUNT_MISSING: &str = "service-account-missing";
    pub const NETWORK_POLICY_MISSING: &str = "network-policy-missing";
    pub const LATEST_TAG: &str = "latest-tag";
    pub const UNTRUSTED_REGISTRY: &str = "untrusted-registry";
    pub const PULL_SECRET_MISSING: &str = "pull-secret-missing";
}

/// Everything a rule check can look at.
pub struct RuleInput<'a> {
    pub documents: &'a [ParsedDocument],
    pub profile: Option<&'a ResourceProfile>,
    pub settings: &'a SecuritySettings,
}

impl<'a> RuleInput<'a> {
    /// Workload documents in file name order.
    pub fn workloads(&self) -> impl Iterator<Item = &'a ParsedDocument> + 'a {
        self.documents.iter().filter(|d| d.is_workload())
    }
}

pub type CheckFn = fn(&RuleInput<'_>) -> Vec<Diagnostic>;

/// A registered rule.
#[derive(Clone)]
pub struct Rule {
    pub code: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub check: CheckFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("code", &self.code)
            .field("severity", &self.severity)
            .finish()
    }
}

/// Ordered list of rules.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run every rule and collect findings in registration order.
    pub fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for rule in &self.rules {
            let diagnostics = (rule.check)(input);
            log::trace!("Rule {} produced {} diagnostics", rule.code, diagnostics.len());
            findings.extend(diagnostics.into_iter().map(|diag| Finding {
                rule_id: RuleCode::new(rule.code),
                severity: diag.severity.unwrap_or(rule.severity),
                message: diag.message,
                document: diag.document,
                remediation: diag.remediation,
            }));
        }
        log::debug!(
            "Evaluated {} rules over {} documents: {} findings",
            self.rules.len(),
            input.documents.len(),
            findings.len()
        );
        findings
    }
}

fn no_hardcoded_secrets() -> Rule {
    Rule {
        code: codes::NO_HARDCODED_SECRETS,
        severity: Severity::Critical,
        description: "Credentials must be placeholders or secret references",
        check: secrets::check,
    }
}

fn no_privileged_without_justification() -> Rule {
    Rule {
        code: codes::NO_PRIVILEGED_WITHOUT_JUSTIFICATION,
        severity: Severity::Warning,
        description: "Privileged mode and dangerous capabilities need a profile that requires them",
        check: privileges::check_privileged,
    }
}

/// Rules run by the validator, in order.
pub fn validator_rules() -> Vec<Rule> {
    vec![
        no_hardcoded_secrets(),
        Rule {
            code: codes::RESOURCE_LIMITS_PRESENT,
            severity: Severity::High,
            description: "Every workload container declares CPU and memory requests and limits",
            check: resources::check,
        },
        Rule {
            code: codes::NAME_COMPLIANCE,
            severity: Severity::Critical,
            description: "Object names and namespaces are DNS-1123 labels",
            check: naming::check,
        },
        no_privileged_without_justification(),
    ]
}

/// Rules run by the security analyzer, in order.
pub fn security_rules() -> Vec<Rule> {
    vec![
        no_hardcoded_secrets(),
        no_privileged_without_justification(),
        Rule {
            code: codes::PRIVILEGE_ESCALATION,
            severity: Severity::High,
            description: "Containers set allowPrivilegeEscalation: false",
            check: privileges::check_privilege_escalation,
        },
        Rule {
            code: codes::MISSING_SECURITY_CONTEXT,
            severity: Severity::Warning,
            description: "Containers declare a securityContext",
            check: privileges::check_security_context,
        },
        Rule {
            code: codes::RUN_AS_ROOT,
            severity: Severity::Warning,
            description: "Containers run as a non-root user",
            check: privileges::check_run_as_root,
        },
        Rule {
            code: codes::HOST_NAMESPACES,
            severity: Severity::High,
            description: "Pods do not share the host network, PID or IPC namespace",
            check: privileges::check_host_namespaces,
        },
        Rule {
            code: codes::HOST_PATH_VOLUME,
            severity: Severity::High,
            description: "Pods do not mount host paths",
            check: privileges::check_host_path,
        },
        Rule {
            code: codes::MISSING_PROBES,
            severity: Severity::Warning,
            description: "Long-running containers declare readiness and liveness probes",
            check: pod::check_probes,
        },
        Rule {
            code: codes::SERVICE_ACCOUNT_MISSING,
            severity: Severity::Warning,
            description: "Pods run under a dedicated service account",
            check: pod::check_service_account,
        },
        Rule {
            code: codes::NETWORK_POLICY_MISSING,
            severity: Severity::Warning,
            description: "Workloads are covered by a NetworkPolicy",
            check: network::check,
        },
        Rule {
            code: codes::LATEST_TAG,
            severity: Severity::Warning,
            description: "Images are pinned to a tag other than latest",
            check: images::check_latest_tag,
        },
        Rule {
            code: codes::UNTRUSTED_REGISTRY,
            severity: Severity::Warning,
            description: "Images come from a trusted registry",
            check: images::check_trusted_registry,
        },
        Rule {
            code: codes::PULL_SECRET_MISSING,
            severity: Severity::Warning,
            description: "Images from private registries have an image pull secret",
            check: images::check_pull_secret,
        },
    ]
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_codes_are_unique() {
        let mut seen = HashSet::new();
        for rule in security_rules().into_iter().chain(validator_rules()) {
            seen.insert(rule.code);
        }
        assert_eq!(seen.len(), 15);
    }

    #[test]
    fn test_shared_rules_lead_security_rules() {
        let codes: Vec<_> = security_rules().iter().map(|r| r.code).collect();
        assert_eq!(codes[0], codes::NO_HARDCODED_SECRETS);
        assert_eq!(codes[1], codes::NO_PRIVILEGED_WITHOUT_JUSTIFICATION);
        assert_eq!(codes.last(), Some(&codes::PULL_SECRET_MISSING));
    }

    fn always(input: &RuleInput<'_>) -> Vec<Diagnostic> {
        input
            .documents
            .iter()
            .map(|d| Diagnostic::new(&d.filename, "seen"))
            .collect()
    }

    fn downgraded(input: &RuleInput<'_>) -> Vec<Diagnostic> {
        vec![Diagnostic::new(&input.documents[0].filename, "minor").with_severity(Severity::Info)]
    }

    #[test]
    fn test_engine_stamps_code_and_severity_in_order() {
        let engine = RuleEngine::new(vec![
            Rule {
                code: "first",
                severity: Severity::High,
                description: "",
                check: always,
            },
            Rule {
                code: "second",
                severity: Severity::Critical,
                description: "",
                check: downgraded,
            },
        ]);
        let documents = test_support::parse_docs("kind: A\n---\nkind: B\n");
        let settings = SecuritySettings::default();
        let findings = engine.evaluate(&RuleInput {
            documents: &documents,
            profile: None,
            settings: &settings,
        });

        let summary: Vec<_> = findings
            .iter()
            .map(|f| (f.rule_id.as_str(), f.severity, f.document.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("first", Severity::High, "doc-0.yaml"),
                ("first", Severity::High, "doc-1.yaml"),
                ("second", Severity::Info, "doc-0.yaml"),
            ]
        );
    }
}
