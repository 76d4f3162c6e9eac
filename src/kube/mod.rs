//! Kubernetes input module
//!
//! Turns Kubernetes objects into builder input:
//! - `extract` - raw API objects and snapshot files to typed records
//! - `filter` - drops system namespaces and hidden RBAC objects
//! - `fetch` - lists everything from a live cluster (feature `cluster`)
//!
//! The live client honours `HTTP_PROXY` / `HTTPS_PROXY` / `NO_PROXY` through
//! kube-rs.

pub mod extract;
#[cfg(feature = "cluster")]
pub mod fetch;
pub mod filter;

pub use extract::{FromManifest, Snapshot, extract_all};
#[cfg(feature = "cluster")]
pub use fetch::{fetch_access_input, fetch_workload_input};
pub use filter::{DEFAULT_HIDDEN_PREFIXES, DEFAULT_SYSTEM_NAMESPACES, FilterOptions};

#[cfg(feature = "cluster")]
use anyhow::{Context, Result};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
#[cfg(feature = "cluster")]
pub async fn create_client() -> Result<kube::Client> {
    let config = kube::Config::infer()
        .await
        .context("Failed to load Kubernetes configuration")?;
    tracing::debug!("Connecting to cluster at {}", config.cluster_url);
    let client = kube::Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}
