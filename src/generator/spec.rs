use crate::error::Result;
use crate::generator::naming::check_label_chars;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// A request to render one component instance.
///
/// Immutable once built: names are checked on construction, overrides are
/// attached with [`ComponentSpec::with_override`] and checked by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    component_type: String,
    instance_name: String,
    namespace: String,
    overrides: BTreeMap<String, Value>,
}

impl ComponentSpec {
    /// Create a spec, rejecting instance names and namespaces with characters
    /// that are not allowed in a DNS-1123 label.
    pub fn new(
        component_type: impl Into<String>,
        instance_name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<Self> {
        let instance_name = instance_name.into();
        let namespace = namespace.into();
        check_label_chars(&instance_name)?;
        check_label_chars(&namespace)?;

        Ok(Self {
            component_type: component_type.into(),
            instance_name,
            namespace,
            overrides: BTreeMap::new(),
        })
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn overrides(&self) -> &BTreeMap<String, Value> {
        &self.overrides
    }
}

/// Parse a `key=value` override as given on the command line.
///
/// The value is read as YAML so `replicas=5` becomes a number and
/// `image_tag=1.2` stays usable as a string by the renderer.
pub fn parse_override(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    let value = serde_yaml::from_str::<Value>(value.trim())
        .unwrap_or_else(|_| Value::String(value.trim().to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeployForgeError;

    #[test]
    fn test_new_rejects_bad_characters() {
        let err = ComponentSpec::new("5g_upf", "Moscow_UPF", "telecom").unwrap_err();
        assert!(matches!(err, DeployForgeError::InvalidName { .. }));

        let err = ComponentSpec::new("5g_upf", "moscow-upf", "Telecom").unwrap_err();
        assert!(matches!(err, DeployForgeError::InvalidName { .. }));
    }

    #[test]
    fn test_overrides_are_kept_in_key_order() {
        let spec = ComponentSpec::new("redis", "cache", "default")
            .unwrap()
            .with_override("replicas", 5)
            .with_override("cpu_min", "250m");
        let keys: Vec<_> = spec.overrides().keys().cloned().collect();
        assert_eq!(keys, vec!["cpu_min", "replicas"]);
    }

    #[test]
    fn test_parse_override() {
        let (key, value) = parse_override("replicas=5").unwrap();
        assert_eq!(key, "replicas");
        assert_eq!(value.as_u64(), Some(5));

        let (_, value) = parse_override("memory_max=16Gi").unwrap();
        assert_eq!(value.as_str(), Some("16Gi"));

        assert!(parse_override("replicas").is_err());
        assert!(parse_override("=5").is_err());
    }
}
