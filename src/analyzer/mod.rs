//! # Analyzer Module
//!
//! Static analysis over rendered or loaded manifest sets:
//! - Validation rules (secrets, resource limits, naming, privileges)
//! - Security analysis with a score, grade and compliance flags
//! - Monthly cost estimation with optimization suggestions

pub mod cost;
pub mod document;
pub mod formatter;
pub mod quantity;
pub mod rules;
pub mod security;
pub mod types;
pub mod validator;

pub use cost::{CostEstimate, CostEstimator, CostSettings, Optimization, OptimizationAction, RateTable};
pub use document::{ParsedDocument, load_manifests};
pub use formatter::OutputFormat;
pub use rules::{Rule, RuleEngine, RuleInput};
pub use security::{ComplianceStatus, Grade, SecurityAnalyzer, SecurityReport, SecuritySettings};
pub use types::{Finding, RuleCode, Severity};
pub use validator::Validator;
