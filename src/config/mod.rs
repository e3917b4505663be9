pub mod types;

use crate::analyzer::quantity::{parse_cpu_cores, parse_memory_gib};
use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".deploy-forge.toml";

/// Get the global config file path (~/.deploy-forge.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (project/.deploy-forge.toml)
pub fn local_config_path(project_path: &Path) -> PathBuf {
    project_path.join(CONFIG_FILE_NAME)
}

/// Load configuration from an explicit file, the local directory, or the
/// global config, in that order. Falls back to defaults when none exist.
///
/// An explicit file that fails to parse is an error; discovered files that
/// fail to parse are skipped with a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<types::Config> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path)?;
        return parse_config(&content);
    }

    let mut candidates = vec![local_config_path(Path::new("."))];
    if let Some(global) = global_config_path() {
        candidates.push(global);
    }

    for candidate in candidates {
        if !candidate.exists() {
            continue;
        }
        match fs::read_to_string(&candidate).map_err(Into::into).and_then(|c| parse_config(&c)) {
            Ok(config) => {
                log::debug!("Loaded configuration from {}", candidate.display());
                return Ok(config);
            }
            Err(e) => log::warn!("Ignoring {}: {}", candidate.display(), e),
        }
    }

    Ok(types::Config::default())
}

/// Parse and sanity-check a TOML configuration document.
pub fn parse_config(content: &str) -> Result<types::Config> {
    let config: types::Config =
        toml::from_str(content).map_err(|e| ConfigError::ParsingFailed(e.to_string()))?;
    check_config(&config)?;
    Ok(config)
}

fn check_config(config: &types::Config) -> std::result::Result<(), ConfigError> {
    let unit = rust_decimal::Decimal::ONE;
    for (key, value) in [
        ("cost.spot_discount", config.cost.spot_discount),
        ("cost.rightsizing_fraction", config.cost.rightsizing_fraction),
    ] {
        if value.is_sign_negative() || value > unit {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                reason: format!("{} is not a fraction between 0 and 1", value),
            });
        }
    }

    for (key, value) in [
        ("cost.cpu_rate", config.cost.cpu_rate),
        ("cost.memory_rate", config.cost.memory_rate),
        ("cost.storage_rate", config.cost.storage_rate),
    ] {
        if value.is_sign_negative() {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                reason: "rates cannot be negative".to_string(),
            });
        }
    }

    let defaults = [
        (
            "cost.default_cpu_request",
            &config.cost.default_cpu_request,
            parse_cpu_cores(&config.cost.default_cpu_request),
        ),
        (
            "cost.default_memory_request",
            &config.cost.default_memory_request,
            parse_memory_gib(&config.cost.default_memory_request),
        ),
    ];
    for (key, raw, parsed) in defaults {
        if parsed.is_none() {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                reason: format!("'{}' is not a Kubernetes quantity", raw),
            });
        }
    }

    let octets: Vec<&str> = config.render.network_base.split('.').collect();
    if octets.len() != 2 || octets.iter().any(|o| o.parse::<u8>().is_err()) {
        return Err(ConfigError::InvalidValue {
            key: "render.network_base".to_string(),
            reason: format!(
                "'{}' must be two dotted octets such as 10.100",
                config.render.network_base
            ),
        });
    }

    Ok(())
}
