//! CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn deploy_ctl(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("deploy-ctl").unwrap();
    cmd.current_dir(dir.path()).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_catalog_lists_profiles() {
    let dir = TempDir::new().unwrap();
    deploy_ctl(&dir)
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("5g_upf").and(predicate::str::contains("rabbitmq")));
}

#[test]
fn test_generate_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    deploy_ctl(&dir)
        .args(["generate", "5g_upf", "moscow-upf", "--dry-run"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--- moscow-upf-deployment.yaml (dry run) ---")
                .and(predicate::str::contains("moscow-upf-n3-network.yaml"))
                .and(predicate::str::contains("Security score")),
        );
    assert!(!dir.path().join("output").exists());
}

#[test]
fn test_generate_writes_and_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("manifests");

    deploy_ctl(&dir)
        .args(["generate", "redis", "cache", "-n", "infra", "-o"])
        .arg(&out)
        .assert()
        .success();
    let deployment = fs::read_to_string(out.join("cache-deployment.yaml")).unwrap();
    assert!(deployment.contains("namespace: infra"));
    assert!(out.join("cache-pvc.yaml").exists());

    deploy_ctl(&dir)
        .args(["generate", "redis", "cache", "-n", "infra", "-o"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));

    deploy_ctl(&dir)
        .args(["generate", "redis", "cache", "-n", "infra", "--force", "-o"])
        .arg(&out)
        .assert()
        .success();
}

#[test]
fn test_generate_json_report() {
    let dir = TempDir::new().unwrap();
    let output = deploy_ctl(&dir)
        .args(["generate", "billing", "billing-main", "--dry-run", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["documents"].as_array().unwrap().len() >= 4);
    assert!(report["security"]["score"].as_u64().is_some());
    assert_eq!(report["cost"]["currency"], "RUB");
}

#[test]
fn test_generate_rejects_long_names_and_bad_overrides() {
    let dir = TempDir::new().unwrap();
    deploy_ctl(&dir)
        .args(["generate", "generic", &"a".repeat(70), "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("characters long"));

    deploy_ctl(&dir)
        .args(["generate", "redis", "cache", "--set", "replicas=0", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid override 'replicas'"));
}

#[test]
fn test_validate_reports_and_fails_on_findings() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("creds.yaml"),
        "kind: Secret\nmetadata:\n  name: creds\nstringData:\n  password: \"hunter2\"\n",
    )
    .unwrap();

    deploy_ctl(&dir)
        .args(["validate", "creds.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no-hardcoded-secrets").and(predicate::str::contains("Found 1 issue(s)")));

    deploy_ctl(&dir)
        .args(["validate", "creds.yaml", "--fail-on-findings"])
        .assert()
        .code(1);

    deploy_ctl(&dir)
        .args(["validate", "missing-dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_security_and_cost_on_generated_files() {
    let dir = TempDir::new().unwrap();
    deploy_ctl(&dir)
        .args(["generate", "5g_amf", "amf-1", "-o", "amf"])
        .assert()
        .success();

    deploy_ctl(&dir)
        .args(["security", "amf", "--component", "5g_amf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Security score").and(predicate::str::contains("Pod Security baseline")));

    deploy_ctl(&dir)
        .args(["cost", "amf", "--component", "5g_amf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated monthly cost"));

    deploy_ctl(&dir)
        .args(["cost", "amf", "--component", "6g_amf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown component type"));
}

#[test]
fn test_pipeline_to_stdout_and_file() {
    let dir = TempDir::new().unwrap();
    deploy_ctl(&dir)
        .args(["pipeline", "--platform", "gitlab", "--project", "python"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stages:").and(predicate::str::contains("trivy")));

    deploy_ctl(&dir)
        .args(["pipeline", "--platform", "github", "--project", "telecom", "--no-security", "-o", "ci.yml"])
        .assert()
        .success();
    let written = fs::read_to_string(dir.path().join("ci.yml")).unwrap();
    assert!(!written.contains("trivy"));
}

#[test]
fn test_config_file_changes_registry() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("forge.toml"),
        "[render]\nregistry = \"harbor.example.net\"\nimage_tag = \"2.4.1\"\n",
    )
    .unwrap();

    deploy_ctl(&dir)
        .args(["-c", "forge.toml", "generate", "5g_smf", "smf", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("harbor.example.net/telecom/"));

    fs::write(dir.path().join("broken.toml"), "[cost]\nspot_discount = 3\n").unwrap();
    deploy_ctl(&dir)
        .args(["-c", "broken.toml", "catalog"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("spot_discount"));
}

#[test]
fn test_cost_overflow_is_an_error_not_a_crash() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("huge.yaml"),
        r#"
kind: Deployment
metadata:
  name: huge
spec:
  template:
    spec:
      containers:
        - name: huge
          resources:
            requests:
              cpu: "79228162514264337593543950335"
              memory: 1Gi
"#,
    )
    .unwrap();

    deploy_ctl(&dir)
        .args(["cost", "huge.yaml", "--component", "generic"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Malformed document 'huge.yaml'"));
}
