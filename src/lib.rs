//! # deploy-forge
//!
//! Renders deterministic Kubernetes manifests for telecom components (5G
//! core functions, billing, message brokers, caches) from a static resource
//! catalog, then runs static analysis over the result.
//!
//! ## Features
//!
//! - **Resource Catalog**: built-in CPU, memory, replica, network and storage profiles
//! - **Manifest Rendering**: Deployment, Service, HPA, PVC, Multus attachments, Secret, ConfigMap
//! - **Validation**: secrets, resource limits, naming and privilege rules
//! - **Security Analysis**: hardening rules, score, grade and Pod Security compliance
//! - **Cost Estimation**: fixed-point monthly cost with optimization suggestions
//! - **CI/CD Pipelines**: GitLab CI and GitHub Actions definitions
//!
//! ## Example
//!
//! ```rust,no_run
//! use deploy_forge::{ComponentCatalog, ComponentSpec, Pipeline, config::types::Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = ComponentSpec::new("5g_upf", "moscow-upf", "telecom")?
//!     .with_override("replicas", 4);
//! let report = Pipeline::from_config(ComponentCatalog::builtin(), &Config::default()).run(&spec)?;
//! for document in &report.documents {
//!     println!("{}", document.filename);
//! }
//! println!("security grade {}", report.security.grade);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod pipeline;

// Re-export commonly used types and functions
pub use analyzer::{CostEstimate, Finding, SecurityReport, Severity};
pub use error::{DeployForgeError, Result};
pub use generator::{ComponentCatalog, ComponentSpec, ManifestRenderer, RenderSettings, RenderedSet};
pub use pipeline::{Pipeline, PipelineReport};

use cli::Commands;
use config::types::Config;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate {
            component_type,
            name,
            namespace,
            overrides,
            output,
            dry_run,
            force,
            format,
        } => handlers::handle_generate(
            handlers::GenerateOptions {
                component_type,
                name,
                namespace,
                overrides,
                output,
                dry_run,
                force,
                format,
            },
            config,
        ),
        Commands::Validate {
            path,
            format,
            fail_on_findings,
        } => handlers::handle_validate(&path, format, fail_on_findings),
        Commands::Security {
            path,
            component,
            format,
            fail_on_findings,
        } => handlers::handle_security(&path, component.as_deref(), format, fail_on_findings, config),
        Commands::Cost {
            path,
            component,
            format,
        } => handlers::handle_cost(&path, &component, format, config),
        Commands::Pipeline {
            platform,
            project,
            no_security,
            output,
            force,
        } => handlers::handle_pipeline(platform, project, no_security, output.as_deref(), force),
        Commands::Catalog { detailed } => handlers::handle_catalog(detailed),
    }
}
