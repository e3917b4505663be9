use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub cost: CostConfig,
    pub security: SecurityConfig,
    pub output: OutputConfig,
}

/// Manifest rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Container registry host images are pulled from
    pub registry: String,
    /// Registry organization / project
    pub organization: String,
    /// Image tag used when no `image_tag` override is given
    pub image_tag: String,
    /// Name of the docker-registry Secret referenced from pod specs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_secret: Option<String>,
    /// First two octets of the telecom interface networks (e.g. "10.100")
    pub network_base: String,
    /// Host interface Multus macvlan attachments bind to
    pub master_interface: String,
    /// Namespace used when the caller does not pass one
    pub default_namespace: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            registry: "registry.telecom.local".to_string(),
            organization: "telecom".to_string(),
            image_tag: "latest".to_string(),
            pull_secret: Some("registry-credentials".to_string()),
            network_base: "10.100".to_string(),
            master_interface: "eth1".to_string(),
            default_namespace: "telecom".to_string(),
        }
    }
}

/// Cost estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// ISO-ish currency label printed next to amounts
    pub currency: String,
    /// Monthly price of one CPU core
    pub cpu_rate: Decimal,
    /// Monthly price of one GiB of memory
    pub memory_rate: Decimal,
    /// Monthly price of one GiB of persistent storage
    pub storage_rate: Decimal,
    /// Fraction saved by moving a workload to spot capacity (0.35 = 35%)
    pub spot_discount: Decimal,
    /// Fraction of requests suggested for removal when limits dwarf requests
    pub rightsizing_fraction: Decimal,
    /// Limit-to-request ratio above which requests are considered inflated
    pub request_ratio_threshold: Decimal,
    /// Expected minimum replica count for non-critical workloads
    pub baseline_min_replicas: u32,
    /// CPU priced for a container without a cpu request
    pub default_cpu_request: String,
    /// Memory priced for a container without a memory request
    pub default_memory_request: String,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            currency: "RUB".to_string(),
            cpu_rate: Decimal::from(1500),
            memory_rate: Decimal::from(600),
            storage_rate: Decimal::from(50),
            spot_discount: Decimal::new(35, 2),
            rightsizing_fraction: Decimal::new(30, 2),
            request_ratio_threshold: Decimal::from(2),
            baseline_min_replicas: 2,
            default_cpu_request: "100m".to_string(),
            default_memory_request: "128Mi".to_string(),
        }
    }
}

/// Security analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Registries whose images are considered trusted
    pub trusted_registries: Vec<String>,
    /// Registries that require an image pull secret
    pub private_registries: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let registry = RenderConfig::default().registry;
        Self {
            trusted_registries: vec![registry.clone(), "docker.io/library".to_string()],
            private_registries: vec![registry],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory generated files are written to
    pub directory: String,
    pub overwrite_existing: bool,
    /// Run validator, security and cost passes on the rayon pool
    pub parallel_analysis: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./output".to_string(),
            overwrite_existing: false,
            parallel_analysis: true,
        }
    }
}
