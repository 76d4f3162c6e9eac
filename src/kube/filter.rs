//! System resource filtering
//!
//! Clusters carry a lot of control-plane RBAC and workloads. These are hidden
//! unless explicitly requested. Snapshots can also be narrowed to a single
//! namespace, matching what a namespaced live listing returns.

use crate::models::{AccessInput, NamespacedRecord, WorkloadInput};

/// Namespaces whose workloads are hidden by default
pub const DEFAULT_SYSTEM_NAMESPACES: &[&str] = &["kube-system", "kube-public", "kube-node-lease"];

/// RBAC name prefixes hidden by default
pub const DEFAULT_HIDDEN_PREFIXES: &[&str] = &["system:", "kubeadm:", "calico-"];

/// Whether an RBAC object name carries one of the default hidden prefixes
pub fn is_hidden_name(name: &str) -> bool {
    DEFAULT_HIDDEN_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

/// Which system resources to drop before building
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub include_system: bool,
    /// Keep only namespaced records from this namespace
    pub namespace: Option<String>,
    pub system_namespaces: Vec<String>,
    pub hidden_prefixes: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            include_system: false,
            namespace: None,
            system_namespaces: DEFAULT_SYSTEM_NAMESPACES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            hidden_prefixes: DEFAULT_HIDDEN_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FilterOptions {
    pub fn is_system_namespace(&self, namespace: &str) -> bool {
        self.system_namespaces.iter().any(|ns| ns == namespace)
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Whether a namespaced record falls inside the namespace scope
    pub fn in_scope(&self, namespace: &str) -> bool {
        self.namespace.as_deref().is_none_or(|scope| scope == namespace)
    }

    /// Drop system service accounts and hidden-prefix roles and bindings.
    ///
    /// Cluster roles and cluster role bindings ignore the namespace scope.
    pub fn apply_access(&self, input: &mut AccessInput) {
        let before = count_access(input);

        retain_in_scope(&mut input.service_accounts, self);
        retain_in_scope(&mut input.roles, self);
        retain_in_scope(&mut input.role_bindings, self);

        if self.include_system {
            return;
        }

        input
            .service_accounts
            .retain(|sa| sa.name != "default" && !self.is_hidden(&sa.name));
        input.roles.retain(|r| !self.is_hidden(&r.name));
        input.cluster_roles.retain(|r| !self.is_hidden(&r.name));
        input.role_bindings.retain(|b| !self.is_hidden(&b.name));
        input.cluster_role_bindings.retain(|b| !self.is_hidden(&b.name));

        tracing::debug!(
            "Filtered {} RBAC objects",
            before - count_access(input)
        );
    }

    /// Drop workload resources living in system namespaces or outside the scope
    pub fn apply_workload(&self, input: &mut WorkloadInput) {
        let before = count_workload(input);

        input
            .namespaces
            .retain(|ns| self.in_scope(ns) && (self.include_system || !self.is_system_namespace(ns)));
        retain_user(&mut input.deployments, self);
        retain_user(&mut input.statefulsets, self);
        retain_user(&mut input.daemonsets, self);
        retain_user(&mut input.replicasets, self);
        retain_user(&mut input.pods, self);
        retain_user(&mut input.services, self);
        retain_user(&mut input.ingresses, self);
        retain_user(&mut input.configmaps, self);
        retain_user(&mut input.secrets, self);
        retain_user(&mut input.pvcs, self);

        tracing::debug!(
            "Filtered {} workload resources",
            before - count_workload(input)
        );
    }
}

fn retain_user<T: NamespacedRecord>(records: &mut Vec<T>, options: &FilterOptions) {
    records.retain(|r| {
        options.in_scope(r.namespace())
            && (options.include_system || !options.is_system_namespace(r.namespace()))
    });
}

fn retain_in_scope<T: NamespacedRecord>(records: &mut Vec<T>, options: &FilterOptions) {
    records.retain(|r| options.in_scope(r.namespace()));
}

fn count_access(input: &AccessInput) -> usize {
    input.service_accounts.len()
        + input.roles.len()
        + input.cluster_roles.len()
        + input.role_bindings.len()
        + input.cluster_role_bindings.len()
}

fn count_workload(input: &WorkloadInput) -> usize {
    input.deployments.len()
        + input.statefulsets.len()
        + input.daemonsets.len()
        + input.replicasets.len()
        + input.pods.len()
        + input.services.len()
        + input.ingresses.len()
        + input.configmaps.len()
        + input.secrets.len()
        + input.pvcs.len()
}
