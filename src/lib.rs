//! kubegraph library
//!
//! Builds compound relationship graphs from Kubernetes resources:
//! - the access graph links service accounts to the roles their bindings grant
//! - the workload graph nests pods inside their controllers and links them to
//!   services, ingresses, mounted config and service accounts
//!
//! The builders are pure functions over typed records (`models`). The `kube`
//! module turns API objects, snapshot files or a live cluster into those records.

pub mod config;
pub mod error;
pub mod graph;
pub mod kube;
pub mod models;

pub use error::{Error, Result};

// Re-export commonly used types for convenience
pub use graph::{
    BuildOptions, Elements, build_access_graph, build_access_graph_with, build_workload_graph,
    build_workload_graph_with,
};
pub use models::{AccessInput, WorkloadInput};
