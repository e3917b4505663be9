//! Core finding types shared by the validator and the security analyzer.
//!
//! - `Severity` - how bad a finding is
//! - `RuleCode` - rule identifiers (e.g., "no-hardcoded-secrets")
//! - `Diagnostic` - what a rule check reports, before the engine stamps it
//! - `Finding` - a diagnostic with its rule code and severity attached

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Severity levels for findings.
///
/// Ordered from most severe to least severe:
/// `Critical > High > Warning > Info`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed before deploying
    Critical,
    /// Serious weakening of the workload's security posture
    High,
    /// Should be addressed
    #[default]
    Warning,
    /// Informational
    Info,
}

impl Severity {
    /// Parse a severity from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Critical => 3,
            Self::High => 2,
            Self::Warning => 1,
            Self::Info => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A rule identifier (e.g., "latest-tag", "name-compliance").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RuleCode(pub String);

impl RuleCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// What a rule check reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File name of the offending document
    pub document: String,
    pub message: String,
    pub remediation: Option<String>,
    /// Replaces the rule's default severity for this diagnostic only
    pub severity: Option<Severity>,
}

impl Diagnostic {
    pub fn new(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            message: message.into(),
            remediation: None,
            severity: None,
        }
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// A rule violation found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule_id: RuleCode,
    pub severity: Severity,
    pub message: String,
    pub document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl Finding {
    /// Whether two findings report the same problem in the same place.
    pub fn same_issue(&self, other: &Finding) -> bool {
        self.rule_id == other.rule_id
            && self.document == other.document
            && self.message == other.message
    }
}

/// Count findings per severity, most severe first.
pub fn severity_counts(findings: &[Finding]) -> [(Severity, usize); 4] {
    [Severity::Critical, Severity::High, Severity::Warning, Severity::Info]
        .map(|severity| (severity, findings.iter().filter(|f| f.severity == severity).count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        let mut all = vec![Severity::Info, Severity::Critical, Severity::Warning, Severity::High];
        all.sort();
        assert_eq!(
            all,
            vec![Severity::Info, Severity::Warning, Severity::High, Severity::Critical]
        );
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("CRITICAL"), Some(Severity::Critical));
        assert_eq!(Severity::parse("high"), Some(Severity::High));
        assert_eq!(Severity::parse("error"), None);
    }

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::new("a.yaml", "bad")
            .with_remediation("fix it")
            .with_severity(Severity::Info);
        assert_eq!(diag.remediation.as_deref(), Some("fix it"));
        assert_eq!(diag.severity, Some(Severity::Info));
    }

    #[test]
    fn test_severity_counts() {
        let finding = |severity| Finding {
            rule_id: RuleCode::new("latest-tag"),
            severity,
            message: String::new(),
            document: "a.yaml".to_string(),
            remediation: None,
        };
        let findings = vec![finding(Severity::Warning), finding(Severity::Warning), finding(Severity::Critical)];
        let counts = severity_counts(&findings);
        assert_eq!(counts[0], (Severity::Critical, 1));
        assert_eq!(counts[2], (Severity::Warning, 2));
    }
}
