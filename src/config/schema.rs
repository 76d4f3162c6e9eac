//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use crate::graph::BuildOptions;
use crate::kube::{DEFAULT_HIDDEN_PREFIXES, DEFAULT_SYSTEM_NAMESPACES, FilterOptions};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Keep system namespaces and hidden RBAC objects
    #[serde(default = "default_false")]
    pub include_system: bool,

    /// Namespace scope for listing and snapshot filtering. Unset means all namespaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Namespaces treated as system namespaces
    #[serde(default = "default_system_namespaces")]
    pub system_namespaces: Vec<String>,

    /// RBAC name prefixes treated as system objects
    #[serde(default = "default_hidden_prefixes")]
    pub hidden_prefixes: Vec<String>,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Attach source records to nodes as `raw`
    #[serde(default = "default_true")]
    pub include_raw: bool,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_system_namespaces() -> Vec<String> {
    DEFAULT_SYSTEM_NAMESPACES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_hidden_prefixes() -> Vec<String> {
    DEFAULT_HIDDEN_PREFIXES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_system: default_false(),
            namespace: None,
            system_namespaces: default_system_namespaces(),
            hidden_prefixes: default_hidden_prefixes(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_true(),
            include_raw: default_true(),
        }
    }
}

impl Config {
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            include_system: self.include_system,
            namespace: self.namespace.clone(),
            system_namespaces: self.system_namespaces.clone(),
            hidden_prefixes: self.hidden_prefixes.clone(),
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            include_raw: self.output.include_raw,
        }
    }
}
