//! Kubernetes resource kind definitions
//!
//! Centralizes every kind the graph builders understand, together with the
//! node id prefix each kind renders under. Node ids are derived from kind,
//! namespace and name so that independent passes referring to the same
//! logical resource converge on one node.

use std::fmt;
use std::str::FromStr;

/// Enumeration of the Kubernetes kinds that take part in a graph build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    // Core
    Namespace,
    ServiceAccount,
    Pod,
    Service,
    ConfigMap,
    Secret,
    PersistentVolumeClaim,
    // RBAC
    Role,
    ClusterRole,
    RoleBinding,
    ClusterRoleBinding,
    // Apps
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    // Networking
    Ingress,
}

impl ResourceKind {
    /// Get the API kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::Pod => "Pod",
            ResourceKind::Service => "Service",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceKind::Role => "Role",
            ResourceKind::ClusterRole => "ClusterRole",
            ResourceKind::RoleBinding => "RoleBinding",
            ResourceKind::ClusterRoleBinding => "ClusterRoleBinding",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::DaemonSet => "DaemonSet",
            ResourceKind::ReplicaSet => "ReplicaSet",
            ResourceKind::Ingress => "Ingress",
        }
    }

    /// Id prefix of the kind.
    ///
    /// Bindings are drawn as edges, so their prefix only appears in edge ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "ns",
            ResourceKind::ServiceAccount => "sa",
            ResourceKind::Pod => "pod",
            ResourceKind::Service => "svc",
            ResourceKind::ConfigMap => "cm",
            ResourceKind::Secret => "sec",
            ResourceKind::PersistentVolumeClaim => "pvc",
            ResourceKind::Role => "role",
            ResourceKind::ClusterRole => "clusterrole",
            ResourceKind::RoleBinding => "rb",
            ResourceKind::ClusterRoleBinding => "crb",
            ResourceKind::Deployment => "deploy",
            ResourceKind::StatefulSet => "sts",
            ResourceKind::DaemonSet => "ds",
            ResourceKind::ReplicaSet => "rs",
            ResourceKind::Ingress => "ing",
        }
    }

    /// Whether the kind lives outside any namespace
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(
            self,
            ResourceKind::Namespace | ResourceKind::ClusterRole | ResourceKind::ClusterRoleBinding
        )
    }

    /// Controllers become compound parents of the pods and replica sets they own
    pub fn is_controller(&self) -> bool {
        matches!(
            self,
            ResourceKind::Deployment | ResourceKind::StatefulSet | ResourceKind::DaemonSet
        )
    }

    /// Kinds whose ownership is conveyed by compound nesting instead of an edge
    pub fn is_compound_eligible(&self) -> bool {
        self.is_controller() || matches!(self, ResourceKind::ReplicaSet)
    }

    /// Build the deterministic node id for a resource of this kind.
    ///
    /// Cluster-scoped kinds ignore `namespace`.
    pub fn node_id(&self, namespace: &str, name: &str) -> String {
        if self.is_cluster_scoped() {
            format!("{}:{}", self.id_prefix(), name)
        } else {
            format!("{}:{}/{}", self.id_prefix(), namespace, name)
        }
    }

    /// Get all resource kinds
    pub fn all() -> &'static [Self] {
        &[
            ResourceKind::Namespace,
            ResourceKind::ServiceAccount,
            ResourceKind::Pod,
            ResourceKind::Service,
            ResourceKind::ConfigMap,
            ResourceKind::Secret,
            ResourceKind::PersistentVolumeClaim,
            ResourceKind::Role,
            ResourceKind::ClusterRole,
            ResourceKind::RoleBinding,
            ResourceKind::ClusterRoleBinding,
            ResourceKind::Deployment,
            ResourceKind::StatefulSet,
            ResourceKind::DaemonSet,
            ResourceKind::ReplicaSet,
            ResourceKind::Ingress,
        ]
    }

    /// Try to parse a string (case-insensitive, kubectl short names allowed)
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "namespace" | "namespaces" | "ns" => Some(ResourceKind::Namespace),
            "serviceaccount" | "serviceaccounts" | "sa" => Some(ResourceKind::ServiceAccount),
            "pod" | "pods" | "po" => Some(ResourceKind::Pod),
            "service" | "services" | "svc" => Some(ResourceKind::Service),
            "configmap" | "configmaps" | "cm" => Some(ResourceKind::ConfigMap),
            "secret" | "secrets" | "sec" => Some(ResourceKind::Secret),
            "persistentvolumeclaim" | "persistentvolumeclaims" | "pvc" => {
                Some(ResourceKind::PersistentVolumeClaim)
            }
            "role" | "roles" => Some(ResourceKind::Role),
            "clusterrole" | "clusterroles" => Some(ResourceKind::ClusterRole),
            "rolebinding" | "rolebindings" | "rb" => Some(ResourceKind::RoleBinding),
            "clusterrolebinding" | "clusterrolebindings" | "crb" => {
                Some(ResourceKind::ClusterRoleBinding)
            }
            "deployment" | "deployments" | "deploy" => Some(ResourceKind::Deployment),
            "statefulset" | "statefulsets" | "sts" => Some(ResourceKind::StatefulSet),
            "daemonset" | "daemonsets" | "ds" => Some(ResourceKind::DaemonSet),
            "replicaset" | "replicasets" | "rs" => Some(ResourceKind::ReplicaSet),
            "ingress" | "ingresses" | "ing" => Some(ResourceKind::Ingress),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown resource kind: {}", s))
    }
}
