//! Container image checks.

use crate::analyzer::document::{ParsedDocument, container_name, get_str};
use crate::analyzer::rules::RuleInput;
use crate::analyzer::types::Diagnostic;
use serde_yaml::Value;

const DEFAULT_REGISTRY: &str = "docker.io";

/// A parsed image reference (`registry/repository[:tag][@digest]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub registry: String,
    pub repository: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    /// Parse an image string, filling in Docker Hub defaults.
    pub fn parse(image: &str) -> Self {
        let image = image.trim();
        let (name, digest) = match image.split_once('@') {
            Some((name, digest)) => (name, Some(digest.to_string())),
            None => (image, None),
        };

        // A ':' after the last '/' separates the tag; earlier ones are ports
        let last_slash = name.rfind('/').map_or(0, |i| i + 1);
        let (name, tag) = match name[last_slash..].rfind(':') {
            Some(i) => (&name[..last_slash + i], Some(name[last_slash + i + 1..].to_string())),
            None => (name, None),
        };

        let (registry, repository) = match name.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (first.to_string(), rest.to_string())
            }
            Some(_) => (DEFAULT_REGISTRY.to_string(), name.to_string()),
            None => (DEFAULT_REGISTRY.to_string(), format!("library/{}", name)),
        };

        Self {
            registry,
            repository,
            tag,
            digest,
        }
    }

    /// `registry/repository`, e.g. `docker.io/library/nginx`.
    pub fn location(&self) -> String {
        format!("{}/{}", self.registry, self.repository)
    }

    /// Whether the image resolves to `latest`, explicitly or by omission.
    pub fn is_latest(&self) -> bool {
        self.digest.is_none() && self.tag.as_deref().is_none_or(|t| t == "latest")
    }

    /// Whether the image lives under one of `prefixes` (`host` or `host/path`).
    pub fn is_under_any(&self, prefixes: &[String]) -> bool {
        let location = self.location();
        prefixes.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            location == prefix || location.starts_with(&format!("{}/", prefix))
        })
    }
}

fn images(doc: &ParsedDocument) -> Vec<(&str, &str)> {
    doc.containers()
        .into_iter()
        .filter_map(|c| get_str(c, &["image"]).map(|image| (container_name(c), image)))
        .collect()
}

fn has_pull_secret(doc: &ParsedDocument) -> bool {
    doc.pod_spec()
        .and_then(|pod| pod.get("imagePullSecrets"))
        .and_then(Value::as_sequence)
        .is_some_and(|secrets| !secrets.is_empty())
}

/// `latest-tag`
pub fn check_latest_tag(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for doc in input.workloads() {
        for (name, image) in images(doc) {
            if ImageReference::parse(image).is_latest() {
                out.push(
                    Diagnostic::new(
                        &doc.filename,
                        format!("Container '{}' uses unpinned image '{}'", name, image),
                    )
                    .with_remediation("Pin the image to a version tag or digest"),
                );
            }
        }
    }
    out
}

/// `untrusted-registry`
pub fn check_trusted_registry(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let trusted = &input.settings.trusted_registries;
    let mut out = Vec::new();
    for doc in input.workloads() {
        for (name, image) in images(doc) {
            let reference = ImageReference::parse(image);
            if !reference.is_under_any(trusted) {
                out.push(
                    Diagnostic::new(
                        &doc.filename,
                        format!(
                            "Container '{}' pulls from untrusted registry {}",
                            name, reference.registry
                        ),
                    )
                    .with_remediation(format!("Mirror the image to one of: {}", trusted.join(", "))),
                );
            }
        }
    }
    out
}

/// `pull-secret-missing`
pub fn check_pull_secret(input: &RuleInput<'_>) -> Vec<Diagnostic> {
    let private = &input.settings.private_registries;
    let mut out = Vec::new();
    for doc in input.workloads() {
        if has_pull_secret(doc) {
            continue;
        }
        for (name, image) in images(doc) {
            let reference = ImageReference::parse(image);
            if reference.is_under_any(private) {
                out.push(
                    Diagnostic::new(
                        &doc.filename,
                        format!(
                            "Container '{}' pulls from private registry {} without imagePullSecrets",
                            name, reference.registry
                        ),
                    )
                    .with_remediation("Reference a docker-registry Secret in spec.imagePullSecrets"),
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::rules::test_support::parse_docs;
    use crate::analyzer::security::SecuritySettings;

    #[test]
    fn test_parse_image_references() {
        let nginx = ImageReference::parse("nginx");
        assert_eq!(nginx.location(), "docker.io/library/nginx");
        assert!(nginx.is_latest());

        let pinned = ImageReference::parse("registry.local:5000/telecom/upf:1.2.3");
        assert_eq!(pinned.registry, "registry.local:5000");
        assert_eq!(pinned.repository, "telecom/upf");
        assert_eq!(pinned.tag.as_deref(), Some("1.2.3"));
        assert!(!pinned.is_latest());

        let digest = ImageReference::parse("bitnami/redis@sha256:abc");
        assert_eq!(digest.location(), "docker.io/bitnami/redis");
        assert!(!digest.is_latest());

        assert!(ImageReference::parse("ghcr.io/org/app:latest").is_latest());
    }

    #[test]
    fn test_is_under_any() {
        let image = ImageReference::parse("docker.io/library/nginx:1.25");
        assert!(image.is_under_any(&["docker.io/library".to_string()]));
        assert!(!image.is_under_any(&["docker.io/lib".to_string()]));
        assert!(image.is_under_any(&["docker.io".to_string()]));
    }

    const POD: &str = r#"
kind: Deployment
metadata:
  name: app
spec:
  template:
    spec:
      containers:
        - name: app
          image: registry.telecom.local/telecom/app:latest
        - name: sidecar
          image: quay.io/prometheus/node-exporter:v1.7.0
"#;

    fn run_with(check: crate::analyzer::rules::CheckFn, yaml: &str) -> Vec<Diagnostic> {
        let documents = parse_docs(yaml);
        let settings = SecuritySettings::default();
        check(&RuleInput {
            documents: &documents,
            profile: None,
            settings: &settings,
        })
    }

    #[test]
    fn test_image_rules() {
        let latest = run_with(check_latest_tag, POD);
        assert_eq!(latest.len(), 1);
        assert!(latest[0].message.contains("'app'"));

        let untrusted = run_with(check_trusted_registry, POD);
        assert_eq!(untrusted.len(), 1);
        assert!(untrusted[0].message.contains("quay.io"));

        let pull = run_with(check_pull_secret, POD);
        assert_eq!(pull.len(), 1);

        let with_secret = POD.replace(
            "      containers:",
            "      imagePullSecrets:\n        - name: registry-credentials\n      containers:",
        );
        assert!(run_with(check_pull_secret, &with_secret).is_empty());
    }
}
