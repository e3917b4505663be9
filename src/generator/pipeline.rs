//! CI/CD pipeline generation for GitLab CI and GitHub Actions.
//!
//! Pipelines are assembled as ordered YAML mappings and serialized once, so
//! output is always well-formed and stable across runs.

use crate::error::Result;
use clap::ValueEnum;
use serde_yaml::{Mapping, Value};
use std::fmt;

/// CI system to generate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CiPlatform {
    Gitlab,
    Github,
}

impl CiPlatform {
    /// File the pipeline is conventionally stored in.
    pub fn default_filename(&self) -> &'static str {
        match self {
            Self::Gitlab => ".gitlab-ci.yml",
            Self::Github => ".github/workflows/ci.yml",
        }
    }
}

/// Project toolchain the test stage is set up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProjectType {
    Python,
    Nodejs,
    Golang,
    Java,
    Telecom,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Nodejs => "nodejs",
            Self::Golang => "golang",
            Self::Java => "java",
            Self::Telecom => "telecom",
        }
    }

    fn test_image(&self) -> &'static str {
        match self {
            Self::Python | Self::Telecom => "python:3.11",
            Self::Nodejs => "node:20",
            Self::Golang => "golang:1.21",
            Self::Java => "maven:3.9-eclipse-temurin-17",
        }
    }

    fn test_commands(&self) -> &'static [&'static str] {
        match self {
            Self::Python => &[
                "pip install -r requirements.txt",
                "pip install pytest pytest-cov",
                "pytest --cov=. --cov-report=term",
            ],
            Self::Nodejs => &["npm ci", "npm run test", "npm run lint"],
            Self::Golang => &[
                "go mod download",
                "go test ./... -v -coverprofile=coverage.out",
                "go vet ./...",
            ],
            Self::Java => &["mvn clean verify"],
            Self::Telecom => &[
                "pip install -r requirements.txt",
                "pip install pytest",
                "pytest tests/",
            ],
        }
    }

    /// GitHub action that installs the toolchain, with its `with:` inputs.
    fn setup_action(&self) -> (&'static str, Vec<(&'static str, &'static str)>) {
        match self {
            Self::Python | Self::Telecom => {
                ("actions/setup-python@v5", vec![("python-version", "3.11")])
            }
            Self::Nodejs => ("actions/setup-node@v4", vec![("node-version", "20")]),
            Self::Golang => ("actions/setup-go@v5", vec![("go-version", "1.21")]),
            Self::Java => (
                "actions/setup-java@v4",
                vec![("java-version", "17"), ("distribution", "temurin")],
            ),
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generate a pipeline definition as YAML text.
pub fn generate_pipeline(
    platform: CiPlatform,
    project: ProjectType,
    include_security: bool,
) -> Result<String> {
    let document = match platform {
        CiPlatform::Gitlab => gitlab_ci(project, include_security),
        CiPlatform::Github => github_actions(project, include_security),
    };
    log::debug!(
        "Generated {:?} pipeline for {} (security stage: {})",
        platform,
        project,
        include_security
    );
    Ok(serde_yaml::to_string(&document)?)
}

// ============================================================================
// YAML helpers
// ============================================================================

fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
    let mut mapping = Mapping::new();
    for (key, value) in entries {
        mapping.insert(Value::from(key), value);
    }
    Value::Mapping(mapping)
}

fn list(items: &[&str]) -> Value {
    Value::Sequence(items.iter().map(|item| Value::from(*item)).collect())
}

fn s(value: &str) -> Value {
    Value::from(value)
}

fn insert(target: &mut Mapping, key: &str, value: Value) {
    target.insert(Value::from(key), value);
}

// ============================================================================
// GitLab CI
// ============================================================================

fn gitlab_deploy(environment: &str, branch: &str, manual: bool) -> Value {
    let mut job = Mapping::new();
    insert(&mut job, "stage", s("deploy"));
    insert(&mut job, "image", s("bitnami/kubectl:1.29"));
    insert(
        &mut job,
        "script",
        Value::Sequence(vec![
            s("kubectl config use-context $KUBE_CONTEXT"),
            s("kubectl apply -f output/"),
            Value::from(format!(
                "kubectl rollout status deployment/$APP_NAME -n {}",
                environment
            )),
        ]),
    );
    insert(&mut job, "environment", map([("name", s(environment))]));
    if manual {
        insert(&mut job, "when", s("manual"));
    }
    insert(&mut job, "only", list(&[branch]));
    Value::Mapping(job)
}

fn gitlab_ci(project: ProjectType, include_security: bool) -> Value {
    let mut root = Mapping::new();
    insert(&mut root, "stages", list(&["build", "test", "security", "deploy"]));
    insert(
        &mut root,
        "variables",
        map([
            ("DOCKER_DRIVER", s("overlay2")),
            ("DOCKER_TLS_CERTDIR", s("")),
            ("IMAGE_TAG", s("$CI_REGISTRY_IMAGE:$CI_COMMIT_SHA")),
        ]),
    );

    insert(
        &mut root,
        "build",
        map([
            ("stage", s("build")),
            ("image", s("docker:24.0")),
            ("services", list(&["docker:24.0-dind"])),
            (
                "script",
                list(&[
                    "docker login -u $CI_REGISTRY_USER -p $CI_REGISTRY_PASSWORD $CI_REGISTRY",
                    "docker build -t $IMAGE_TAG .",
                    "docker push $IMAGE_TAG",
                ]),
            ),
            ("only", list(&["main", "develop"])),
        ]),
    );

    insert(
        &mut root,
        "test",
        map([
            ("stage", s("test")),
            ("image", s(project.test_image())),
            ("script", list(project.test_commands())),
        ]),
    );

    if include_security {
        insert(
            &mut root,
            "security:trivy",
            map([
                ("stage", s("security")),
                ("image", s("aquasec/trivy:0.50.1")),
                (
                    "script",
                    list(&["trivy image --exit-code 1 --severity HIGH,CRITICAL $IMAGE_TAG"]),
                ),
                ("allow_failure", Value::Bool(false)),
            ]),
        );
        insert(
            &mut root,
            "security:secrets",
            map([
                ("stage", s("security")),
                ("image", s("trufflesecurity/trufflehog:3.63.0")),
                ("script", list(&["trufflehog filesystem . --only-verified"])),
                ("allow_failure", Value::Bool(true)),
            ]),
        );
    }

    insert(&mut root, "deploy:staging", gitlab_deploy("staging", "develop", false));
    insert(&mut root, "deploy:production", gitlab_deploy("production", "main", true));
    Value::Mapping(root)
}

// ============================================================================
// GitHub Actions
// ============================================================================

fn checkout_step() -> Value {
    map([("name", s("Checkout code")), ("uses", s("actions/checkout@v4"))])
}

fn github_actions(project: ProjectType, include_security: bool) -> Value {
    let image_ref = "${{ env.REGISTRY }}/${{ env.IMAGE_NAME }}:${{ github.sha }}";

    let build = map([
        ("runs-on", s("ubuntu-latest")),
        (
            "permissions",
            map([("contents", s("read")), ("packages", s("write"))]),
        ),
        (
            "steps",
            Value::Sequence(vec![
                checkout_step(),
                map([
                    ("name", s("Set up Docker Buildx")),
                    ("uses", s("docker/setup-buildx-action@v3")),
                ]),
                map([
                    ("name", s("Log in to Container Registry")),
                    ("uses", s("docker/login-action@v3")),
                    (
                        "with",
                        map([
                            ("registry", s("${{ env.REGISTRY }}")),
                            ("username", s("${{ github.actor }}")),
                            ("password", s("${{ secrets.GITHUB_TOKEN }}")),
                        ]),
                    ),
                ]),
                map([
                    ("name", s("Build and push Docker image")),
                    ("uses", s("docker/build-push-action@v5")),
                    (
                        "with",
                        map([
                            ("context", s(".")),
                            ("push", Value::Bool(true)),
                            ("tags", s(image_ref)),
                            ("cache-from", s("type=gha")),
                            ("cache-to", s("type=gha,mode=max")),
                        ]),
                    ),
                ]),
            ]),
        ),
    ]);

    let (setup_uses, setup_with) = project.setup_action();
    let mut with = Mapping::new();
    for (key, value) in setup_with {
        insert(&mut with, key, s(value));
    }
    let test = map([
        ("runs-on", s("ubuntu-latest")),
        ("needs", s("build")),
        (
            "steps",
            Value::Sequence(vec![
                checkout_step(),
                map([
                    ("name", Value::from(format!("Setup {} environment", project))),
                    ("uses", s(setup_uses)),
                    ("with", Value::Mapping(with)),
                ]),
                map([
                    ("name", s("Run tests")),
                    ("run", Value::from(project.test_commands().join("\n"))),
                ]),
            ]),
        ),
    ]);

    let mut jobs = Mapping::new();
    insert(&mut jobs, "build", build);
    insert(&mut jobs, "test", test);

    if include_security {
        insert(
            &mut jobs,
            "security",
            map([
                ("runs-on", s("ubuntu-latest")),
                ("needs", s("build")),
                ("permissions", map([("security-events", s("write"))])),
                (
                    "steps",
                    Value::Sequence(vec![
                        checkout_step(),
                        map([
                            ("name", s("Run Trivy vulnerability scanner")),
                            ("uses", s("aquasecurity/trivy-action@0.20.0")),
                            (
                                "with",
                                map([
                                    ("image-ref", s(image_ref)),
                                    ("format", s("sarif")),
                                    ("output", s("trivy-results.sarif")),
                                    ("severity", s("CRITICAL,HIGH")),
                                ]),
                            ),
                        ]),
                        map([
                            ("name", s("Upload Trivy results to GitHub Security")),
                            ("uses", s("github/codeql-action/upload-sarif@v3")),
                            ("with", map([("sarif_file", s("trivy-results.sarif"))])),
                        ]),
                    ]),
                ),
            ]),
        );
    }

    let deploy_needs: &[&str] = if include_security {
        &["build", "test", "security"]
    } else {
        &["build", "test"]
    };
    insert(
        &mut jobs,
        "deploy",
        map([
            ("runs-on", s("ubuntu-latest")),
            ("needs", list(deploy_needs)),
            ("if", s("github.ref == 'refs/heads/main'")),
            (
                "steps",
                Value::Sequence(vec![
                    checkout_step(),
                    map([
                        ("name", s("Configure kubectl")),
                        ("uses", s("azure/k8s-set-context@v3")),
                        ("with", map([("kubeconfig", s("${{ secrets.KUBE_CONFIG }}"))])),
                    ]),
                    map([
                        ("name", s("Deploy to Kubernetes")),
                        (
                            "run",
                            s("kubectl apply -f output/\nkubectl rollout status deployment/${{ vars.APP_NAME }} -n production"),
                        ),
                    ]),
                ]),
            ),
        ]),
    );

    let mut root = Mapping::new();
    insert(&mut root, "name", s("CI/CD Pipeline"));
    insert(
        &mut root,
        "on",
        map([
            ("push", map([("branches", list(&["main", "develop"]))])),
            ("pull_request", map([("branches", list(&["main"]))])),
        ]),
    );
    insert(
        &mut root,
        "env",
        map([
            ("REGISTRY", s("ghcr.io")),
            ("IMAGE_NAME", s("${{ github.repository }}")),
        ]),
    );
    insert(&mut root, "jobs", Value::Mapping(jobs));
    Value::Mapping(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_gitlab_stages_and_jobs() {
        let yaml = generate_pipeline(CiPlatform::Gitlab, ProjectType::Golang, true).unwrap();
        let doc = parse(&yaml);

        let stages: Vec<_> = doc["stages"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|s| s.as_str().unwrap())
            .collect();
        assert_eq!(stages, vec!["build", "test", "security", "deploy"]);
        assert_eq!(doc["test"]["image"].as_str(), Some("golang:1.21"));
        assert!(doc["security:trivy"].is_mapping());
        assert_eq!(doc["deploy:production"]["when"].as_str(), Some("manual"));
    }

    #[test]
    fn test_gitlab_without_security() {
        let yaml = generate_pipeline(CiPlatform::Gitlab, ProjectType::Python, false).unwrap();
        let doc = parse(&yaml);
        assert!(doc.get("security:trivy").is_none());
        assert!(doc.get("security:secrets").is_none());
    }

    #[test]
    fn test_github_jobs() {
        let yaml = generate_pipeline(CiPlatform::Github, ProjectType::Java, true).unwrap();
        let doc = parse(&yaml);
        let jobs = doc["jobs"].as_mapping().unwrap();
        let names: Vec<_> = jobs.keys().map(|k| k.as_str().unwrap()).collect();
        assert_eq!(names, vec!["build", "test", "security", "deploy"]);

        let setup = &doc["jobs"]["test"]["steps"][1];
        assert_eq!(setup["uses"].as_str(), Some("actions/setup-java@v4"));
        assert_eq!(setup["with"]["distribution"].as_str(), Some("temurin"));
        assert_eq!(doc["jobs"]["deploy"]["needs"][2].as_str(), Some("security"));
    }

    #[test]
    fn test_output_is_stable() {
        let first = generate_pipeline(CiPlatform::Github, ProjectType::Telecom, true).unwrap();
        let second = generate_pipeline(CiPlatform::Github, ProjectType::Telecom, true).unwrap();
        assert_eq!(first, second);
    }
}
