//! Configuration system for kubegraph
//!
//! A single YAML file plus `KUBEGRAPH_*` environment overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, OutputConfig};

use crate::error::Error;
use anyhow::Context;

/// Configuration keys accepted by `get` / `set`
pub const CONFIG_KEYS: &[&str] = &[
    "includeSystem",
    "namespace",
    "systemNamespaces",
    "hiddenPrefixes",
    "output.pretty",
    "output.includeRaw",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "includeSystem" => Ok(config.include_system.to_string()),
        "namespace" => Ok(config.namespace.clone().unwrap_or_default()),
        "systemNamespaces" => Ok(config.system_namespaces.join(",")),
        "hiddenPrefixes" => Ok(config.hidden_prefixes.join(",")),
        "output.pretty" => Ok(config.output.pretty.to_string()),
        "output.includeRaw" => Ok(config.output.include_raw.to_string()),
        _ => Err(Error::UnknownConfigKey(key.to_string()).into()),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "includeSystem" => {
            config.include_system = value
                .parse()
                .context("includeSystem must be 'true' or 'false'")?;
        }
        "namespace" => {
            if value.is_empty() {
                config.namespace = None;
            } else {
                config.namespace = Some(value.to_string());
            }
        }
        "systemNamespaces" => {
            config.system_namespaces = parse_list(value)
                .context("systemNamespaces must be a YAML array or comma-separated list")?;
        }
        "hiddenPrefixes" => {
            config.hidden_prefixes = parse_list(value)
                .context("hiddenPrefixes must be a YAML array or comma-separated list")?;
        }
        "output.pretty" => {
            config.output.pretty = value
                .parse()
                .context("output.pretty must be 'true' or 'false'")?;
        }
        "output.includeRaw" => {
            config.output.include_raw = value
                .parse()
                .context("output.includeRaw must be 'true' or 'false'")?;
        }
        _ => return Err(Error::UnknownConfigKey(key.to_string()).into()),
    }

    Ok(())
}

/// Parse a YAML array (`[a, b]`) or a comma-separated list
fn parse_list(value: &str) -> anyhow::Result<Vec<String>> {
    if value.trim_start().starts_with('[') {
        Ok(serde_yaml::from_str(value)?)
    } else {
        Ok(value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}
