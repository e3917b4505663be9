//! Parsed manifests and YAML navigation helpers.
//!
//! Rules work on `serde_yaml::Value` trees rather than typed objects, so
//! YAML loaded from disk with unexpected or missing fields can still be
//! analyzed.

use crate::error::{DeployForgeError, Result};
use crate::generator::types::{DocumentKind, RenderedDocument, RenderedSet};
use serde_yaml::Value;
use std::path::Path;
use walkdir::WalkDir;

/// Kinds whose objects own a pod template.
const WORKLOAD_KINDS: &[&str] = &[
    "Deployment",
    "StatefulSet",
    "DaemonSet",
    "ReplicaSet",
    "Job",
    "CronJob",
    "Pod",
];

/// A rendered or loaded document parsed into a YAML tree.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub filename: String,
    pub kind: String,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub value: Value,
}

impl ParsedDocument {
    pub fn parse(filename: &str, content: &str) -> Result<Self> {
        let malformed = |reason: String| DeployForgeError::MalformedDocument {
            document: filename.to_string(),
            reason,
        };

        let value: Value = serde_yaml::from_str(content).map_err(|e| malformed(e.to_string()))?;
        if !value.is_mapping() {
            return Err(malformed("document is not a mapping".to_string()));
        }

        Ok(Self {
            filename: filename.to_string(),
            kind: get_str(&value, &["kind"]).unwrap_or_default().to_string(),
            name: get_str(&value, &["metadata", "name"]).map(str::to_string),
            namespace: get_str(&value, &["metadata", "namespace"]).map(str::to_string),
            value,
        })
    }

    /// Label used when reporting on this object, e.g. `Deployment/web`.
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.kind, self.name.as_deref().unwrap_or("<unnamed>"))
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn is_workload(&self) -> bool {
        WORKLOAD_KINDS.contains(&self.kind.as_str())
    }

    /// The pod spec of a workload, wherever its kind keeps it.
    pub fn pod_spec(&self) -> Option<&Value> {
        match self.kind.as_str() {
            "Pod" => lookup(&self.value, &["spec"]),
            "CronJob" => lookup(&self.value, &["spec", "jobTemplate", "spec", "template", "spec"]),
            kind if WORKLOAD_KINDS.contains(&kind) => {
                lookup(&self.value, &["spec", "template", "spec"])
            }
            _ => None,
        }
    }

    /// Regular containers followed by init containers.
    pub fn containers(&self) -> Vec<&Value> {
        self.containers_in(&["containers", "initContainers"])
    }

    /// Regular containers only.
    pub fn app_containers(&self) -> Vec<&Value> {
        self.containers_in(&["containers"])
    }

    fn containers_in(&self, fields: &[&str]) -> Vec<&Value> {
        let Some(pod) = self.pod_spec() else {
            return Vec::new();
        };
        fields
            .iter()
            .filter_map(|field| pod.get(*field).and_then(Value::as_sequence))
            .flatten()
            .collect()
    }

    /// `spec.replicas`, defaulting to 1.
    pub fn replicas(&self) -> u64 {
        lookup(&self.value, &["spec", "replicas"])
            .and_then(Value::as_u64)
            .unwrap_or(1)
    }
}

/// Name of a container for messages.
pub fn container_name(container: &Value) -> &str {
    get_str(container, &["name"]).unwrap_or("<unnamed>")
}

/// Follow a path of mapping keys.
pub fn lookup<'v>(value: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

pub fn get_str<'v>(value: &'v Value, path: &[&str]) -> Option<&'v str> {
    lookup(value, path).and_then(Value::as_str)
}

pub fn get_bool(value: &Value, path: &[&str]) -> Option<bool> {
    lookup(value, path).and_then(Value::as_bool)
}

/// A quantity field as text. Bare numbers such as `cpu: 2` are accepted.
pub fn get_quantity(value: &Value, path: &[&str]) -> Option<String> {
    match lookup(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse every document in a set, failing on the first malformed one.
pub fn parse_set(set: &RenderedSet) -> Result<Vec<ParsedDocument>> {
    set.iter()
        .map(|doc| ParsedDocument::parse(&doc.filename, &doc.content))
        .collect()
}

/// Load Kubernetes YAML from a file or a directory tree into a set.
///
/// Multi-document files are split on `---`; each part is stored as
/// `<path>#<index>`. Empty parts are skipped. Content is not parsed here,
/// so malformed files surface later as `MalformedDocument`.
pub fn load_manifests(path: &Path) -> Result<RenderedSet> {
    let files: Vec<_> = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        WalkDir::new(path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e == "yaml" || e == "yml")
            })
            .collect()
    };

    let mut set = RenderedSet::new();
    for file in files {
        let content = std::fs::read_to_string(&file)?;
        let label = file
            .strip_prefix(path)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(file.as_path())
            .display()
            .to_string();

        let parts = split_documents(&content);
        let multiple = parts.len() > 1;
        for (index, part) in parts.into_iter().enumerate() {
            let filename = if multiple {
                format!("{}#{}", label, index)
            } else {
                label.clone()
            };
            let kind = serde_yaml::from_str::<Value>(part)
                .ok()
                .and_then(|v| get_str(&v, &["kind"]).map(DocumentKind::from_kind))
                .unwrap_or_else(|| DocumentKind::Other(String::new()));

            let document = RenderedDocument {
                filename,
                content: part.to_string(),
                kind,
            };
            if let Err(duplicate) = set.insert(document) {
                log::warn!("Skipping duplicate document {}", duplicate.filename);
            }
        }
    }

    log::debug!("Loaded {} documents from {}", set.len(), path.display());
    Ok(set)
}

/// Split a YAML stream into its non-empty documents.
pub fn split_documents(content: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        if line.trim_end() == "---" || line.starts_with("--- ") {
            parts.push(&content[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    parts.push(&content[start..]);

    parts
        .into_iter()
        .filter(|part| {
            part.lines()
                .any(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        })
        .collect()
}
