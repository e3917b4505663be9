use crate::analyzer::formatter::OutputFormat;
use crate::generator::pipeline::{CiPlatform, ProjectType};
use crate::generator::spec::parse_override;
use clap::{Parser, Subcommand};
use serde_yaml::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deploy-ctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render and analyze Kubernetes manifests for telecom components")]
#[command(long_about = "Renders deterministic Kubernetes manifests for 5G core, billing and infrastructure components, then checks them for validation, security and cost issues. Also generates CI/CD pipelines.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render manifests for a component, analyze them and write them to disk
    Generate {
        /// Component type (e.g. 5g_upf, billing, redis); unknown types use the generic profile
        #[arg(value_name = "TYPE")]
        component_type: String,

        /// Instance name, used as the prefix of every resource name
        #[arg(value_name = "NAME")]
        name: String,

        /// Target namespace (defaults to the configured namespace)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Override a profile value, e.g. --set replicas=5 --set cpu_max=6
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
        overrides: Vec<(String, Value)>,

        /// Output directory for generated files
        #[arg(short, long, value_name = "OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Print the manifests instead of writing files
        #[arg(long)]
        dry_run: bool,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,

        /// Report format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Validate existing manifest files
    Validate {
        /// A YAML file or a directory of YAML files
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Report format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Exit with a non-zero code when findings are reported
        #[arg(long)]
        fail_on_findings: bool,
    },

    /// Run the security analysis on existing manifest files
    Security {
        /// A YAML file or a directory of YAML files
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Component type whose profile justifies privileges
        #[arg(long, value_name = "TYPE")]
        component: Option<String>,

        /// Report format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Exit with a non-zero code when findings are reported
        #[arg(long)]
        fail_on_findings: bool,
    },

    /// Estimate the monthly cost of existing manifest files
    Cost {
        /// A YAML file or a directory of YAML files
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Component type the manifests belong to
        #[arg(long, value_name = "TYPE")]
        component: String,

        /// Report format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Generate a CI/CD pipeline definition
    Pipeline {
        /// CI platform
        #[arg(long, value_enum)]
        platform: CiPlatform,

        /// Project type
        #[arg(long, value_enum)]
        project: ProjectType,

        /// Leave out the security scanning stage
        #[arg(long)]
        no_security: bool,

        /// Write the pipeline to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,
    },

    /// List the built-in component profiles
    Catalog {
        /// Show every profile field
        #[arg(short, long)]
        detailed: bool,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_parses_overrides() {
        let cli = Cli::try_parse_from([
            "deploy-ctl",
            "generate",
            "5g_upf",
            "moscow-upf",
            "-n",
            "core",
            "--set",
            "replicas=5",
            "--set",
            "cpu_max=6",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                component_type,
                name,
                namespace,
                overrides,
                dry_run,
                ..
            } => {
                assert_eq!(component_type, "5g_upf");
                assert_eq!(name, "moscow-upf");
                assert_eq!(namespace.as_deref(), Some("core"));
                assert_eq!(overrides[0], ("replicas".to_string(), Value::from(5)));
                assert_eq!(overrides[1].0, "cpu_max");
                assert!(dry_run);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_malformed_override_is_rejected() {
        assert!(Cli::try_parse_from(["deploy-ctl", "generate", "redis", "cache", "--set", "replicas"]).is_err());
    }

    #[test]
    fn test_unknown_project_type_is_rejected() {
        assert!(
            Cli::try_parse_from(["deploy-ctl", "pipeline", "--platform", "gitlab", "--project", "cobol"]).is_err()
        );
    }
}
