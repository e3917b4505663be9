//! Kubernetes object naming.
//!
//! Every name this crate emits is a DNS-1123 label: lowercase alphanumerics
//! and `-`, starting and ending with an alphanumeric, at most 63 characters.

use crate::error::{DeployForgeError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Maximum length of a DNS-1123 label.
pub const MAX_NAME_LENGTH: usize = 63;

static DNS1123_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap());

/// Check whether `name` is a valid DNS-1123 label, length included.
pub fn is_dns1123_label(name: &str) -> bool {
    name.len() <= MAX_NAME_LENGTH && DNS1123_LABEL.is_match(name)
}

/// Check the character rules only. Length is checked separately because
/// derived names are longer than the instance name they come from.
pub fn check_label_chars(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DeployForgeError::InvalidName {
            name: name.to_string(),
            reason: "name cannot be empty".to_string(),
        });
    }
    if !DNS1123_LABEL.is_match(name) {
        return Err(DeployForgeError::InvalidName {
            name: name.to_string(),
            reason: "must consist of lowercase alphanumerics or '-', and start and end with an alphanumeric"
                .to_string(),
        });
    }
    Ok(())
}

pub fn check_label_length(name: &str) -> Result<()> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(DeployForgeError::NameTooLong {
            name: name.to_string(),
            length: name.len(),
        });
    }
    Ok(())
}

/// Turn a catalog key such as `5g_upf` into a label fragment (`5g-upf`).
pub fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}

/// Names of every object rendered for one component instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    instance: String,
}

impl DerivedNames {
    pub fn new(instance: &str) -> Self {
        Self {
            instance: instance.to_string(),
        }
    }

    pub fn deployment(&self) -> String {
        format!("{}-deployment", self.instance)
    }

    pub fn service(&self) -> String {
        format!("{}-service", self.instance)
    }

    pub fn hpa(&self) -> String {
        format!("{}-hpa", self.instance)
    }

    pub fn pvc(&self) -> String {
        format!("{}-pvc", self.instance)
    }

    pub fn network(&self, interface: &str) -> String {
        format!("{}-{}-network", self.instance, slugify(interface))
    }

    pub fn secret(&self) -> String {
        format!("{}-secrets", self.instance)
    }

    pub fn config_map(&self) -> String {
        format!("{}-config", self.instance)
    }
}

/// File name a rendered object is stored under.
pub fn filename_for(name: &str) -> String {
    format!("{}.yaml", name)
}
