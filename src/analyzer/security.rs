//! Security analyzer.
//!
//! Extends the validator's security rules with pod-hardening, host-access,
//! network and supply-chain checks, then scores the set and derives Pod
//! Security Standards compliance flags.

use crate::analyzer::document::{ParsedDocument, parse_set};
use crate::analyzer::rules::privileges::{
    added_capabilities, dropped_capabilities, host_namespaces, host_path_volumes, is_privileged,
    may_run_as_root,
};
use crate::analyzer::rules::{RuleEngine, RuleInput, codes, security_rules};
use crate::analyzer::types::{Finding, Severity};
use crate::config::types::SecurityConfig;
use crate::error::Result;
use crate::generator::catalog::ResourceProfile;
use crate::generator::types::RenderedSet;
use serde::Serialize;
use serde_yaml::Value;
use std::fmt;

/// Capabilities the Pod Security "baseline" profile allows adding.
const BASELINE_CAPABILITIES: &[&str] = &[
    "AUDIT_WRITE",
    "CHOWN",
    "DAC_OVERRIDE",
    "FOWNER",
    "FSETID",
    "KILL",
    "MKNOD",
    "NET_BIND_SERVICE",
    "SETFCAP",
    "SETGID",
    "SETPCAP",
    "SETUID",
    "SYS_CHROOT",
];

/// Registry trust settings used by the image rules.
#[derive(Debug, Clone)]
pub struct SecuritySettings {
    pub trusted_registries: Vec<String>,
    pub private_registries: Vec<String>,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self::from(&SecurityConfig::default())
    }
}

impl From<&SecurityConfig> for SecuritySettings {
    fn from(config: &SecurityConfig) -> Self {
        Self {
            trusted_registries: config.trusted_registries.clone(),
            private_registries: config.private_registries.clone(),
        }
    }
}

/// Letter grade derived from the security score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Self::A,
            75..=89 => Self::B,
            60..=74 => Self::C,
            40..=59 => Self::D,
            _ => Self::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        write!(f, "{}", letter)
    }
}

/// Compliance flags for the analyzed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplianceStatus {
    pub pod_security_baseline: bool,
    pub pod_security_restricted: bool,
    pub zero_trust_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityReport {
    pub findings: Vec<Finding>,
    pub score: u32,
    pub grade: Grade,
    pub compliance: ComplianceStatus,
}

/// Score out of 100: 15 off per critical, 10 per high and 5 per warning finding.
pub fn security_score(findings: &[Finding]) -> u32 {
    let penalty: u32 = findings
        .iter()
        .map(|f| match f.severity {
            Severity::Critical => 15,
            Severity::High => 10,
            Severity::Warning => 5,
            Severity::Info => 0,
        })
        .sum();
    100u32.saturating_sub(penalty)
}

#[derive(Debug, Clone)]
pub struct SecurityAnalyzer {
    engine: RuleEngine,
    settings: SecuritySettings,
}

impl Default for SecurityAnalyzer {
    fn default() -> Self {
        Self::new(SecuritySettings::default())
    }
}

impl SecurityAnalyzer {
    pub fn new(settings: SecuritySettings) -> Self {
        Self {
            engine: RuleEngine::new(security_rules()),
            settings,
        }
    }

    pub fn analyze(
        &self,
        set: &RenderedSet,
        profile: Option<&ResourceProfile>,
    ) -> Result<SecurityReport> {
        let documents = parse_set(set)?;
        let findings = self.engine.evaluate(&RuleInput {
            documents: &documents,
            profile,
            settings: &self.settings,
        });

        let score = security_score(&findings);
        let compliance = compliance(&documents, &findings);
        log::debug!(
            "Security score {} ({} findings, restricted: {})",
            score,
            findings.len(),
            compliance.pod_security_restricted
        );

        Ok(SecurityReport {
            grade: Grade::from_score(score),
            findings,
            score,
            compliance,
        })
    }
}

fn meets_baseline(doc: &ParsedDocument) -> bool {
    host_namespaces(doc).is_empty()
        && host_path_volumes(doc).is_empty()
        && doc.containers().into_iter().all(|container| {
            !is_privileged(container)
                && added_capabilities(container)
                    .iter()
                    .all(|cap| BASELINE_CAPABILITIES.contains(&cap.to_uppercase().trim_start_matches("CAP_")))
        })
}

fn meets_restricted(doc: &ParsedDocument) -> bool {
    meets_baseline(doc)
        && doc.containers().into_iter().all(|container| {
            let escalation = container
                .get("securityContext")
                .and_then(|sc| sc.get("allowPrivilegeEscalation"))
                .and_then(Value::as_bool);
            escalation == Some(false)
                && !may_run_as_root(doc, container)
                && dropped_capabilities(container)
                    .iter()
                    .any(|cap| cap.eq_ignore_ascii_case("ALL"))
                && added_capabilities(container)
                    .iter()
                    .all(|cap| cap.eq_ignore_ascii_case("NET_BIND_SERVICE"))
        })
}

fn compliance(documents: &[ParsedDocument], findings: &[Finding]) -> ComplianceStatus {
    let workloads: Vec<_> = documents.iter().filter(|d| d.is_workload()).collect();
    let baseline = workloads.iter().all(|doc| meets_baseline(doc));
    let restricted = baseline && workloads.iter().all(|doc| meets_restricted(doc));

    let blocks_zero_trust = |code: &str| findings.iter().any(|f| f.rule_id.as_str() == code);
    let zero_trust = restricted
        && !blocks_zero_trust(codes::NETWORK_POLICY_MISSING)
        && !blocks_zero_trust(codes::UNTRUSTED_REGISTRY)
        && !blocks_zero_trust(codes::NO_HARDCODED_SECRETS);

    ComplianceStatus {
        pod_security_baseline: baseline,
        pod_security_restricted: restricted,
        zero_trust_ready: zero_trust,
    }
}
