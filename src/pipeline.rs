//! Render once, then analyze.
//!
//! The validator, security analyzer and cost estimator are independent
//! passes over the same rendered set. They may run concurrently; their
//! results are always merged as validator, then security, then cost.

use crate::analyzer::cost::{CostEstimate, CostEstimator, CostSettings, RateTable};
use crate::analyzer::security::{SecurityAnalyzer, SecurityReport, SecuritySettings};
use crate::analyzer::types::Finding;
use crate::analyzer::validator::Validator;
use crate::config::types::Config;
use crate::error::Result;
use crate::generator::catalog::ComponentCatalog;
use crate::generator::renderer::{ManifestRenderer, RenderSettings};
use crate::generator::spec::ComponentSpec;
use crate::generator::types::RenderedSet;
use serde::Serialize;

/// Everything produced for one component.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub documents: RenderedSet,
    /// Validator findings, then security findings not already reported.
    pub findings: Vec<Finding>,
    pub security: SecurityReport,
    pub cost: CostEstimate,
}

impl PipelineReport {
    /// Whether any finding is critical or high.
    pub fn has_blocking_findings(&self) -> bool {
        use crate::analyzer::types::Severity;
        self.findings
            .iter()
            .any(|f| matches!(f.severity, Severity::Critical | Severity::High))
    }
}

pub struct Pipeline<'a> {
    renderer: ManifestRenderer<'a>,
    validator: Validator,
    security: SecurityAnalyzer,
    cost: CostEstimator,
    parallel: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        renderer: ManifestRenderer<'a>,
        security: SecurityAnalyzer,
        cost: CostEstimator,
        parallel: bool,
    ) -> Self {
        Self {
            renderer,
            validator: Validator::new(),
            security,
            cost,
            parallel,
        }
    }

    /// Wire every stage from the loaded configuration.
    pub fn from_config(catalog: &'a ComponentCatalog, config: &Config) -> Self {
        Self::new(
            ManifestRenderer::new(catalog, RenderSettings::from(&config.render)),
            SecurityAnalyzer::new(SecuritySettings::from(&config.security)),
            CostEstimator::new(RateTable::from(&config.cost), CostSettings::from(&config.cost)),
            config.output.parallel_analysis,
        )
    }

    pub fn run(&self, spec: &ComponentSpec) -> Result<PipelineReport> {
        let profile = self.renderer.effective_profile(spec)?;
        let documents = self.renderer.render(spec)?;
        log::debug!(
            "Rendered {} documents for {} ({})",
            documents.len(),
            spec.instance_name(),
            profile.component
        );

        let validate = || self.validator.validate(&documents, Some(&profile));
        let secure = || self.security.analyze(&documents, Some(&profile));
        let estimate = || self.cost.estimate(&documents, &profile);

        let (validation, (security, cost)) = if self.parallel {
            rayon::join(validate, || rayon::join(secure, estimate))
        } else {
            (validate(), (secure(), estimate()))
        };
        let (validation, security, cost) = (validation?, security?, cost?);

        let mut findings = validation;
        for finding in &security.findings {
            if !findings.iter().any(|f| f.same_issue(finding)) {
                findings.push(finding.clone());
            }
        }

        Ok(PipelineReport {
            documents,
            findings,
            security,
            cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Config;

    fn run(parallel: bool, spec: &ComponentSpec) -> PipelineReport {
        let mut config = Config::default();
        config.output.parallel_analysis = parallel;
        Pipeline::from_config(ComponentCatalog::builtin(), &config)
            .run(spec)
            .unwrap()
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let spec = ComponentSpec::new("billing", "billing-main", "telecom").unwrap();
        let sequential = run(false, &spec);
        let parallel = run(true, &spec);
        assert_eq!(sequential.findings, parallel.findings);
        assert_eq!(sequential.security, parallel.security);
        assert_eq!(sequential.cost, parallel.cost);
        assert_eq!(sequential.documents, parallel.documents);
    }

    #[test]
    fn test_findings_are_not_duplicated() {
        let spec = ComponentSpec::new("5g_upf", "moscow-upf", "telecom").unwrap();
        let report = run(false, &spec);
        for (i, a) in report.findings.iter().enumerate() {
            assert!(
                report.findings[i + 1..].iter().all(|b| !a.same_issue(b)),
                "duplicate finding {:?}",
                a
            );
        }
        // Capabilities listed by a critical profile are justified.
        assert!(
            report
                .findings
                .iter()
                .all(|f| f.rule_id.as_str() != "no-privileged-without-justification")
        );
    }

    #[test]
    fn test_rendered_secrets_pass_validation() {
        let spec = ComponentSpec::new("billing", "billing-main", "telecom").unwrap();
        let report = run(false, &spec);
        assert!(
            report
                .findings
                .iter()
                .all(|f| f.rule_id.as_str() != "no-hardcoded-secrets")
        );
        assert!(report.cost.total_monthly > rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn test_render_errors_propagate() {
        let spec = ComponentSpec::new("redis", "cache", "telecom")
            .unwrap()
            .with_override("replicas", 0);
        assert!(
            Pipeline::from_config(ComponentCatalog::builtin(), &Config::default())
                .run(&spec)
                .is_err()
        );
    }
}
