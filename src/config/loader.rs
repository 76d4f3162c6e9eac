//! Configuration loading
//!
//! Precedence order (highest to lowest):
//! 1. Environment variable overrides
//! 2. Root config file
//! 3. Built-in defaults

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers applied
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load configuration from an explicit file, falling back to defaults when
    /// the file does not exist
    pub fn load_from(path: &Path) -> Result<Config> {
        let config = if path.exists() {
            Self::load_file(path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::load_defaults()
        };
        Ok(Self::apply_overrides(config, |key| std::env::var(key).ok()))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // An empty file is a valid, all-defaults config
        if contents.trim().is_empty() {
            return Ok(Self::load_defaults());
        }

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the config file: YAML syntax, value types and list contents
    pub fn validate(path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let config = Self::load_file(path)?;

        if config.system_namespaces.iter().any(|ns| ns.is_empty()) {
            return Err(anyhow::anyhow!("systemNamespaces must not contain empty names"));
        }
        if config.hidden_prefixes.iter().any(|p| p.is_empty()) {
            // An empty prefix would hide every RBAC object
            return Err(anyhow::anyhow!("hiddenPrefixes must not contain empty prefixes"));
        }
        if config.namespace.as_deref() == Some("") {
            return Err(anyhow::anyhow!(
                "namespace must be a namespace name; remove the key to list all namespaces"
            ));
        }

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply `KUBEGRAPH_*` overrides read through `lookup`
    fn apply_overrides(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
        // KUBEGRAPH_INCLUDE_SYSTEM override
        if let Some(include_system) = lookup("KUBEGRAPH_INCLUDE_SYSTEM") {
            if let Ok(val) = include_system.parse::<bool>() {
                config.include_system = val;
            }
        }

        // KUBEGRAPH_NAMESPACE override; empty or "all" means every namespace
        if let Some(namespace) = lookup("KUBEGRAPH_NAMESPACE") {
            config.namespace = match namespace.as_str() {
                "" | "all" | "-A" => None,
                _ => Some(namespace),
            };
        }

        // KUBEGRAPH_PRETTY override
        if let Some(pretty) = lookup("KUBEGRAPH_PRETTY") {
            if let Ok(val) = pretty.parse::<bool>() {
                config.output.pretty = val;
            }
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}
