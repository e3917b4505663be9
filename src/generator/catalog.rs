//! Built-in resource profiles for telecom components.
//!
//! The catalog is a static table keyed by [`ComponentType`]. It is built once
//! and shared; the renderer receives it by reference so tests can pass their
//! own tables.

use crate::error::{DeployForgeError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Component types the catalog knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ComponentType {
    #[serde(rename = "5g_upf")]
    Upf,
    #[serde(rename = "5g_amf")]
    Amf,
    #[serde(rename = "5g_smf")]
    Smf,
    #[serde(rename = "billing")]
    Billing,
    #[serde(rename = "rabbitmq")]
    RabbitMq,
    #[serde(rename = "redis")]
    Redis,
    #[serde(rename = "generic")]
    Generic,
}

impl ComponentType {
    pub const ALL: [ComponentType; 7] = [
        Self::Upf,
        Self::Amf,
        Self::Smf,
        Self::Billing,
        Self::RabbitMq,
        Self::Redis,
        Self::Generic,
    ];

    /// Parse a catalog key such as `5g_upf`. Accepts `-` in place of `_`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "5g_upf" => Some(Self::Upf),
            "5g_amf" => Some(Self::Amf),
            "5g_smf" => Some(Self::Smf),
            "billing" => Some(Self::Billing),
            "rabbitmq" => Some(Self::RabbitMq),
            "redis" => Some(Self::Redis),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upf => "5g_upf",
            Self::Amf => "5g_amf",
            Self::Smf => "5g_smf",
            Self::Billing => "billing",
            Self::RabbitMq => "rabbitmq",
            Self::Redis => "redis",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External services a component talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dependency {
    Database,
    Cache,
    Queue,
}

impl Dependency {
    /// Whether the dependency needs a password, and therefore a Secret.
    pub fn needs_credentials(&self) -> bool {
        matches!(self, Self::Database | Self::Queue)
    }
}

/// Resource requirements and deployment traits of one component type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceProfile {
    pub component: ComponentType,
    pub description: String,
    pub cpu_min: String,
    pub cpu_max: String,
    pub memory_min: String,
    pub memory_max: String,
    pub replicas: u32,
    pub max_replicas: u32,
    pub critical: bool,
    pub network_interfaces: Vec<String>,
    pub capabilities: Vec<String>,
    pub storage_size: Option<String>,
    pub storage_class: Option<String>,
    pub priority_class: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub ports: Vec<u16>,
}

impl ResourceProfile {
    /// Autoscaling applies only when there is room above the base replica count.
    pub fn autoscales(&self) -> bool {
        self.max_replicas > self.replicas
    }

    pub fn has_dependency(&self, dependency: Dependency) -> bool {
        self.dependencies.contains(&dependency)
    }

    /// Whether the profile lists `capability` as one it legitimately needs.
    pub fn permits_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c.eq_ignore_ascii_case(capability))
    }
}

/// Immutable table of resource profiles.
#[derive(Debug, Clone)]
pub struct ComponentCatalog {
    profiles: BTreeMap<ComponentType, ResourceProfile>,
}

static BUILTIN: LazyLock<ComponentCatalog> = LazyLock::new(ComponentCatalog::build_builtin);

impl ComponentCatalog {
    /// Build a catalog from an explicit list of profiles.
    pub fn from_profiles(profiles: impl IntoIterator<Item = ResourceProfile>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.component, p)).collect(),
        }
    }

    /// The shared built-in catalog.
    pub fn builtin() -> &'static ComponentCatalog {
        &BUILTIN
    }

    /// Look up the profile for a component type name.
    pub fn lookup(&self, component_type: &str) -> Result<&ResourceProfile> {
        ComponentType::parse(component_type)
            .and_then(|t| self.profiles.get(&t))
            .ok_or_else(|| DeployForgeError::UnknownComponent(component_type.to_string()))
    }

    pub fn get(&self, component: ComponentType) -> Option<&ResourceProfile> {
        self.profiles.get(&component)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ResourceProfile> {
        self.profiles.values()
    }

    fn build_builtin() -> Self {
        let telecom_ports = vec![8080, 9090];
        Self::from_profiles([
            ResourceProfile {
                component: ComponentType::Upf,
                description: "5G User Plane Function, user traffic forwarding".to_string(),
                cpu_min: "4".to_string(),
                cpu_max: "8".to_string(),
                memory_min: "8Gi".to_string(),
                memory_max: "16Gi".to_string(),
                replicas: 3,
                max_replicas: 9,
                critical: true,
                network_interfaces: strings(&["n3", "n4", "n6"]),
                capabilities: strings(&["NET_ADMIN", "SYS_ADMIN"]),
                storage_size: Some("100Gi".to_string()),
                storage_class: Some("fast-ssd".to_string()),
                priority_class: Some("system-cluster-critical".to_string()),
                dependencies: Vec::new(),
                ports: telecom_ports.clone(),
            },
            ResourceProfile {
                component: ComponentType::Amf,
                description: "5G Access and Mobility Management Function".to_string(),
                cpu_min: "2".to_string(),
                cpu_max: "4".to_string(),
                memory_min: "4Gi".to_string(),
                memory_max: "8Gi".to_string(),
                replicas: 3,
                max_replicas: 9,
                critical: true,
                network_interfaces: strings(&["n1", "n2"]),
                capabilities: strings(&["NET_ADMIN"]),
                storage_size: None,
                storage_class: None,
                priority_class: Some("system-cluster-critical".to_string()),
                dependencies: Vec::new(),
                ports: telecom_ports.clone(),
            },
            ResourceProfile {
                component: ComponentType::Smf,
                description: "5G Session Management Function".to_string(),
                cpu_min: "2".to_string(),
                cpu_max: "4".to_string(),
                memory_min: "4Gi".to_string(),
                memory_max: "8Gi".to_string(),
                replicas: 3,
                max_replicas: 9,
                critical: true,
                network_interfaces: strings(&["n4", "n7"]),
                capabilities: strings(&["NET_ADMIN"]),
                storage_size: None,
                storage_class: None,
                priority_class: Some("system-cluster-critical".to_string()),
                dependencies: Vec::new(),
                ports: telecom_ports.clone(),
            },
            ResourceProfile {
                component: ComponentType::Billing,
                description: "Billing and charging system".to_string(),
                cpu_min: "1".to_string(),
                cpu_max: "4".to_string(),
                memory_min: "2Gi".to_string(),
                memory_max: "8Gi".to_string(),
                replicas: 3,
                max_replicas: 9,
                critical: true,
                network_interfaces: Vec::new(),
                capabilities: Vec::new(),
                storage_size: None,
                storage_class: None,
                priority_class: Some("high-priority".to_string()),
                dependencies: vec![Dependency::Database, Dependency::Cache, Dependency::Queue],
                ports: telecom_ports,
            },
            ResourceProfile {
                component: ComponentType::RabbitMq,
                description: "Message broker for inter-service communication".to_string(),
                cpu_min: "1".to_string(),
                cpu_max: "2".to_string(),
                memory_min: "2Gi".to_string(),
                memory_max: "4Gi".to_string(),
                replicas: 3,
                max_replicas: 3,
                critical: false,
                network_interfaces: Vec::new(),
                capabilities: Vec::new(),
                storage_size: Some("100Gi".to_string()),
                storage_class: Some("fast-ssd".to_string()),
                priority_class: None,
                dependencies: Vec::new(),
                ports: vec![5672, 15672, 25672],
            },
            ResourceProfile {
                component: ComponentType::Redis,
                description: "In-memory cache for fast data access".to_string(),
                cpu_min: "500m".to_string(),
                cpu_max: "2".to_string(),
                memory_min: "1Gi".to_string(),
                memory_max: "4Gi".to_string(),
                replicas: 3,
                max_replicas: 3,
                critical: false,
                network_interfaces: Vec::new(),
                capabilities: Vec::new(),
                storage_size: Some("20Gi".to_string()),
                storage_class: Some("fast-ssd".to_string()),
                priority_class: None,
                dependencies: Vec::new(),
                ports: vec![6379],
            },
            ResourceProfile {
                component: ComponentType::Generic,
                description: "Generic stateless service".to_string(),
                cpu_min: "100m".to_string(),
                cpu_max: "500m".to_string(),
                memory_min: "128Mi".to_string(),
                memory_max: "512Mi".to_string(),
                replicas: 2,
                max_replicas: 2,
                critical: false,
                network_interfaces: Vec::new(),
                capabilities: Vec::new(),
                storage_size: None,
                storage_class: None,
                priority_class: None,
                dependencies: Vec::new(),
                ports: vec![8080],
            },
        ])
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
