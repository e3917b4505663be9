//! Monthly cost estimation.
//!
//! Prices the CPU and memory requests of every workload, and the storage of
//! every PersistentVolumeClaim, using fixed-point arithmetic. It then
//! suggests optimizations with their estimated monthly saving.

use crate::analyzer::document::{ParsedDocument, container_name, get_quantity, get_str, lookup, parse_set};
use crate::analyzer::quantity::{parse_cpu_cores, parse_memory_gib, parse_storage_gib};
use crate::config::types::CostConfig;
use crate::error::{DeployForgeError, Result};
use crate::generator::catalog::ResourceProfile;
use crate::generator::types::RenderedSet;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Baseline minimum replica count for critical workloads.
const CRITICAL_BASELINE_REPLICAS: u32 = 3;

/// Monthly prices.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub currency: String,
    pub cpu_rate: Decimal,
    pub memory_rate: Decimal,
    pub storage_rate: Decimal,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::from(&CostConfig::default())
    }
}

impl From<&CostConfig> for RateTable {
    fn from(config: &CostConfig) -> Self {
        Self {
            currency: config.currency.clone(),
            cpu_rate: config.cpu_rate,
            memory_rate: config.memory_rate,
            storage_rate: config.storage_rate,
        }
    }
}

/// Thresholds for optimization suggestions.
#[derive(Debug, Clone, PartialEq)]
pub struct CostSettings {
    pub spot_discount: Decimal,
    pub rightsizing_fraction: Decimal,
    pub request_ratio_threshold: Decimal,
    pub baseline_min_replicas: u32,
    /// Quantities priced for a container that sets no request.
    pub default_cpu_request: String,
    pub default_memory_request: String,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self::from(&CostConfig::default())
    }
}

impl From<&CostConfig> for CostSettings {
    fn from(config: &CostConfig) -> Self {
        Self {
            spot_discount: config.spot_discount,
            rightsizing_fraction: config.rightsizing_fraction,
            request_ratio_threshold: config.request_ratio_threshold,
            baseline_min_replicas: config.baseline_min_replicas,
            default_cpu_request: config.default_cpu_request.clone(),
            default_memory_request: config.default_memory_request.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizationAction {
    ReduceRequests,
    EnableSpot,
    LowerMinReplicas,
}

impl OptimizationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReduceRequests => "reduce-requests",
            Self::EnableSpot => "enable-spot",
            Self::LowerMinReplicas => "lower-min-replicas",
        }
    }
}

impl fmt::Display for OptimizationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Optimization {
    pub action: OptimizationAction,
    pub target_document: String,
    /// Change in monthly cost; negative is a saving.
    pub delta_monthly: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub currency: String,
    pub total_monthly: Decimal,
    pub per_document: BTreeMap<String, Decimal>,
    pub optimizations: Vec<Optimization>,
}

fn overflow(document: &str, what: &str) -> DeployForgeError {
    DeployForgeError::MalformedDocument {
        document: document.to_string(),
        reason: format!("{} is out of the representable cost range", what),
    }
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl CostEstimate {
    /// Amounts rounded to minor units for reporting.
    pub fn rounded(&self) -> Self {
        Self {
            currency: self.currency.clone(),
            total_monthly: round_money(self.total_monthly),
            per_document: self
                .per_document
                .iter()
                .map(|(k, v)| (k.clone(), round_money(*v)))
                .collect(),
            optimizations: self
                .optimizations
                .iter()
                .map(|o| Optimization {
                    delta_monthly: round_money(o.delta_monthly),
                    ..o.clone()
                })
                .collect(),
        }
    }

    /// Sum of all suggested savings (a non-positive amount).
    pub fn potential_savings(&self) -> Decimal {
        self.optimizations
            .iter()
            .fold(Decimal::ZERO, |acc, o| acc.saturating_add(o.delta_monthly))
    }
}

/// Priced workload, kept for the optimization pass.
struct WorkloadCost<'d> {
    doc: &'d ParsedDocument,
    per_replica: Decimal,
    monthly: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct CostEstimator {
    rates: RateTable,
    settings: CostSettings,
}

impl CostEstimator {
    pub fn new(rates: RateTable, settings: CostSettings) -> Self {
        Self { rates, settings }
    }

    pub fn estimate(&self, set: &RenderedSet, profile: &ResourceProfile) -> Result<CostEstimate> {
        let documents = parse_set(set)?;
        let mut per_document = BTreeMap::new();
        let mut workloads = Vec::new();

        for doc in &documents {
            if doc.is_workload() {
                let per_replica = self.per_replica_cost(doc)?;
                let monthly = per_replica
                    .checked_mul(Decimal::from(doc.replicas()))
                    .ok_or_else(|| overflow(&doc.filename, "monthly workload cost"))?;
                per_document.insert(doc.filename.clone(), monthly);
                workloads.push(WorkloadCost {
                    doc,
                    per_replica,
                    monthly,
                });
            } else if doc.is_kind("PersistentVolumeClaim") {
                let monthly = self.storage_cost(doc)?;
                per_document.insert(doc.filename.clone(), monthly);
            }
        }

        let mut total_monthly = Decimal::ZERO;
        for (filename, amount) in &per_document {
            total_monthly = total_monthly
                .checked_add(*amount)
                .ok_or_else(|| overflow(filename, "monthly total"))?;
        }
        let optimizations = self.optimizations(&documents, &workloads, profile)?;
        log::debug!(
            "Estimated {} {} per month across {} documents, {} optimizations",
            total_monthly,
            self.rates.currency,
            per_document.len(),
            optimizations.len()
        );

        Ok(CostEstimate {
            currency: self.rates.currency.clone(),
            total_monthly,
            per_document,
            optimizations,
        })
    }

    /// Requests of the regular containers, priced for one replica.
    fn per_replica_cost(&self, doc: &ParsedDocument) -> Result<Decimal> {
        let mut cost = Decimal::ZERO;
        for container in doc.app_containers() {
            let cores = self.request(doc, container, "cpu", parse_cpu_cores)?;
            let gib = self.request(doc, container, "memory", parse_memory_gib)?;
            cost = cores
                .checked_mul(self.rates.cpu_rate)
                .zip(gib.checked_mul(self.rates.memory_rate))
                .and_then(|(cpu, memory)| cpu.checked_add(memory))
                .and_then(|container_cost| cost.checked_add(container_cost))
                .ok_or_else(|| {
                    overflow(
                        &doc.filename,
                        &format!("cost of container '{}'", container_name(container)),
                    )
                })?;
        }
        Ok(cost)
    }

    fn storage_cost(&self, doc: &ParsedDocument) -> Result<Decimal> {
        let Some(raw) = get_quantity(&doc.value, &["spec", "resources", "requests", "storage"]) else {
            return Ok(Decimal::ZERO);
        };
        let gib = parse_storage_gib(&raw).ok_or_else(|| DeployForgeError::MalformedDocument {
            document: doc.filename.clone(),
            reason: format!("invalid storage quantity '{}'", raw),
        })?;
        gib.checked_mul(self.rates.storage_rate)
            .ok_or_else(|| overflow(&doc.filename, "storage cost"))
    }

    fn optimizations(
        &self,
        documents: &[ParsedDocument],
        workloads: &[WorkloadCost<'_>],
        profile: &ResourceProfile,
    ) -> Result<Vec<Optimization>> {
        let mut out = Vec::new();

        if !profile.critical {
            for workload in workloads {
                if self.requests_inflated(workload.doc) {
                    out.push(saving(
                        OptimizationAction::ReduceRequests,
                        &workload.doc.filename,
                        self.settings.rightsizing_fraction,
                        workload.monthly,
                    )?);
                }
            }
            for workload in workloads {
                out.push(saving(
                    OptimizationAction::EnableSpot,
                    &workload.doc.filename,
                    self.settings.spot_discount,
                    workload.monthly,
                )?);
            }
        }

        let baseline = if profile.critical {
            CRITICAL_BASELINE_REPLICAS
        } else {
            self.settings.baseline_min_replicas
        };
        for hpa in documents.iter().filter(|d| d.is_kind("HorizontalPodAutoscaler")) {
            let Some(min_replicas) = lookup(&hpa.value, &["spec", "minReplicas"]).and_then(Value::as_u64) else {
                continue;
            };
            if min_replicas <= u64::from(baseline) {
                continue;
            }
            let target = get_str(&hpa.value, &["spec", "scaleTargetRef", "name"]);
            let Some(workload) = workloads.iter().find(|w| w.doc.name.as_deref() == target) else {
                log::debug!("{} targets a workload outside this set", hpa.display_name());
                continue;
            };
            let excess = Decimal::from(min_replicas - u64::from(baseline));
            out.push(saving(
                OptimizationAction::LowerMinReplicas,
                &hpa.filename,
                excess,
                workload.per_replica,
            )?);
        }

        Ok(out)
    }

    /// A container's request for `resource`, or the configured default when unset.
    fn request(
        &self,
        doc: &ParsedDocument,
        container: &Value,
        resource: &str,
        parse: fn(&str) -> Option<Decimal>,
    ) -> Result<Decimal> {
        let raw = match get_quantity(container, &["resources", "requests", resource]) {
            Some(raw) => raw,
            None => {
                let default = match resource {
                    "cpu" => &self.settings.default_cpu_request,
                    _ => &self.settings.default_memory_request,
                };
                log::debug!(
                    "Container '{}' in {} has no {} request; pricing it at {}",
                    container_name(container),
                    doc.display_name(),
                    resource,
                    default
                );
                default.clone()
            }
        };
        parse(&raw).ok_or_else(|| DeployForgeError::MalformedDocument {
            document: doc.filename.clone(),
            reason: format!(
                "invalid {} quantity '{}' in container '{}'",
                resource,
                raw,
                container_name(container)
            ),
        })
    }

    /// Whether any container's CPU or memory limit exceeds the threshold
    /// multiple of its request.
    fn requests_inflated(&self, doc: &ParsedDocument) -> bool {
        let threshold = self.settings.request_ratio_threshold;
        let exceeds = |container: &Value, resource: &str, parse: fn(&str) -> Option<Decimal>| {
            let request = get_quantity(container, &["resources", "requests", resource]).and_then(|q| parse(&q));
            let limit = get_quantity(container, &["resources", "limits", resource]).and_then(|q| parse(&q));
            match (request, limit) {
                (Some(request), Some(limit)) if !request.is_zero() => {
                    threshold.checked_mul(request).is_some_and(|bound| limit > bound)
                }
                _ => false,
            }
        };

        doc.app_containers().into_iter().any(|container| {
            exceeds(container, "cpu", parse_cpu_cores) || exceeds(container, "memory", parse_memory_gib)
        })
    }
}

/// An optimization saving `factor * amount` per month.
fn saving(action: OptimizationAction, target: &str, factor: Decimal, amount: Decimal) -> Result<Optimization> {
    let saved = factor
        .checked_mul(amount)
        .ok_or_else(|| overflow(target, &format!("{} saving", action)))?;
    Ok(Optimization {
        action,
        target_document: target.to_string(),
        delta_monthly: -saved,
    })
}
