use crate::{
    analyzer::{
        CostEstimator, CostSettings, RateTable, SecurityAnalyzer, SecuritySettings, Validator,
        formatter::{OutputFormat, format_cost, format_findings, format_security},
        load_manifests,
    },
    config::types::Config,
    generator::{ComponentCatalog, RenderedSet, ResourceProfile},
    handlers::utils::exit_for_findings,
};
use std::io;
use std::path::Path;

fn load(path: &Path) -> crate::Result<RenderedSet> {
    if !path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )
        .into());
    }
    let set = load_manifests(path)?;
    if set.is_empty() {
        log::warn!("No YAML documents found under {}", path.display());
    }
    Ok(set)
}

fn profile_for(component: &str) -> crate::Result<&'static ResourceProfile> {
    ComponentCatalog::builtin().lookup(component)
}

pub fn handle_validate(path: &Path, format: OutputFormat, fail_on_findings: bool) -> crate::Result<()> {
    let documents = load(path)?;
    let findings = Validator::new().validate(&documents, None)?;
    print!("{}", format_findings(&findings, format));

    if fail_on_findings && !findings.is_empty() {
        exit_for_findings(&findings);
    }
    Ok(())
}

pub fn handle_security(
    path: &Path,
    component: Option<&str>,
    format: OutputFormat,
    fail_on_findings: bool,
    config: &Config,
) -> crate::Result<()> {
    let documents = load(path)?;
    let profile = component.map(profile_for).transpose()?;
    let analyzer = SecurityAnalyzer::new(SecuritySettings::from(&config.security));
    let report = analyzer.analyze(&documents, profile)?;
    print!("{}", format_security(&report, format));

    if fail_on_findings && !report.findings.is_empty() {
        exit_for_findings(&report.findings);
    }
    Ok(())
}

pub fn handle_cost(path: &Path, component: &str, format: OutputFormat, config: &Config) -> crate::Result<()> {
    let documents = load(path)?;
    let profile = profile_for(component)?;
    let estimator = CostEstimator::new(RateTable::from(&config.cost), CostSettings::from(&config.cost));
    let estimate = estimator.estimate(&documents, profile)?;
    print!("{}", format_cost(&estimate, format));
    Ok(())
}
