//! End-to-end rendering through the public API.

use deploy_forge::generator::{DocumentKind, RenderedSet};
use deploy_forge::{ComponentCatalog, ComponentSpec, DeployForgeError, ManifestRenderer, RenderSettings};
use proptest::prelude::*;
use serde_yaml::Value;

fn render(component_type: &str, name: &str) -> deploy_forge::Result<RenderedSet> {
    let renderer = ManifestRenderer::new(ComponentCatalog::builtin(), RenderSettings::default());
    renderer.render(&ComponentSpec::new(component_type, name, "telecom")?)
}

fn parse(set: &RenderedSet, filename: &str) -> Value {
    let document = set
        .get(filename)
        .unwrap_or_else(|| panic!("missing {filename}"));
    serde_yaml::from_str(&document.content).unwrap()
}

#[test]
fn test_moscow_upf_scenario() {
    let set = render("5g_upf", "moscow-upf").unwrap();

    let deployment = parse(&set, "moscow-upf-deployment.yaml");
    assert_eq!(deployment["metadata"]["name"].as_str(), Some("moscow-upf-deployment"));
    assert!(deployment["spec"]["replicas"].as_u64().unwrap() >= 3);
    assert!(
        deployment["spec"]["template"]["spec"]["affinity"]["podAntiAffinity"]
            ["requiredDuringSchedulingIgnoredDuringExecution"]
            .as_sequence()
            .is_some_and(|terms| !terms.is_empty())
    );

    assert!(set.contains("moscow-upf-service.yaml"));
    for iface in ["n3", "n4", "n6"] {
        let nad = parse(&set, &format!("moscow-upf-{iface}-network.yaml"));
        assert_eq!(nad["kind"].as_str(), Some("NetworkAttachmentDefinition"));
    }

    let pvc = parse(&set, "moscow-upf-pvc.yaml");
    assert_eq!(pvc["spec"]["resources"]["requests"]["storage"].as_str(), Some("100Gi"));
}

#[test]
fn test_every_profile_renders_its_resources() {
    for profile in ComponentCatalog::builtin().profiles() {
        let set = render(profile.component.as_str(), "svc").unwrap();
        assert_eq!(set.of_kind(&DocumentKind::Deployment).count(), 1, "{}", profile.component);
        assert_eq!(set.of_kind(&DocumentKind::Service).count(), 1, "{}", profile.component);

        let deployment = parse(&set, "svc-deployment.yaml");
        let resources = &deployment["spec"]["template"]["spec"]["containers"][0]["resources"];
        assert_eq!(resources["requests"]["cpu"].as_str(), Some(profile.cpu_min.as_str()));
        assert_eq!(resources["requests"]["memory"].as_str(), Some(profile.memory_min.as_str()));
        assert_eq!(resources["limits"]["cpu"].as_str(), Some(profile.cpu_max.as_str()));
        assert_eq!(resources["limits"]["memory"].as_str(), Some(profile.memory_max.as_str()));

        assert_eq!(
            set.contains("svc-hpa.yaml"),
            profile.max_replicas > profile.replicas,
            "{}",
            profile.component
        );
    }
}

#[test]
fn test_unsupported_type_uses_generic_profile() {
    let set = render("quantum_router", "qr").unwrap();
    let deployment = parse(&set, "qr-deployment.yaml");
    let resources = &deployment["spec"]["template"]["spec"]["containers"][0]["resources"];
    assert_eq!(resources["requests"]["cpu"].as_str(), Some("100m"));
    assert_eq!(resources["limits"]["memory"].as_str(), Some("512Mi"));
}

#[test]
fn test_secret_fields_carry_placeholders() {
    let set = render("billing", "billing-main").unwrap();
    let secrets: Vec<_> = set.of_kind(&DocumentKind::Secret).collect();
    assert_eq!(secrets.len(), 1);

    let secret: Value = serde_yaml::from_str(&secrets[0].content).unwrap();
    let data = secret["stringData"].as_mapping().unwrap();
    assert!(!data.is_empty());
    for (key, value) in data {
        let value = value.as_str().unwrap();
        assert!(value.contains("__PLACEHOLDER_"), "{:?} = {}", key, value);
    }
}

#[test]
fn test_seventy_character_name_is_too_long() {
    let name = "a".repeat(70);
    match render("generic", &name) {
        Err(DeployForgeError::NameTooLong { length, .. }) => assert!(length > 63),
        other => panic!("expected NameTooLong, got {:?}", other.map(|s| s.len())),
    }
}

proptest! {
    #[test]
    fn prop_name_length_limit(name in "[a-z][a-z0-9]{0,70}") {
        // The longest derived name for a generic component is "<name>-deployment".
        let result = render("generic", &name);
        prop_assert_eq!(result.is_ok(), name.len() + "-deployment".len() <= 63);
    }

    #[test]
    fn prop_rendering_is_idempotent(replicas in 1u32..20, tag in "[a-z0-9][a-z0-9.]{0,8}") {
        let renderer = ManifestRenderer::new(ComponentCatalog::builtin(), RenderSettings::default());
        let spec = ComponentSpec::new("redis", "cache", "telecom")
            .unwrap()
            .with_override("replicas", replicas)
            .with_override("image_tag", tag);
        let first = renderer.render(&spec).unwrap();
        let second = renderer.render(&spec).unwrap();
        prop_assert_eq!(first.to_multi_document(), second.to_multi_document());
    }
}
