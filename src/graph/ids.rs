//! Node and edge id scheme
//!
//! Ids are part of the output contract: the renderer keys animations and
//! selection state on them across rebuilds.

use crate::models::ResourceKind;

/// Id of the synthetic external zone
pub const EXTERNAL_ZONE_ID: &str = "zone:external";

/// Id of the synthetic Internet node
pub const INTERNET_ID: &str = "internet";

pub fn namespace_id(namespace: &str) -> String {
    ResourceKind::Namespace.node_id("", namespace)
}

pub fn service_account_id(namespace: &str, name: &str) -> String {
    ResourceKind::ServiceAccount.node_id(namespace, name)
}

pub fn role_id(namespace: &str, name: &str) -> String {
    ResourceKind::Role.node_id(namespace, name)
}

pub fn cluster_role_id(name: &str) -> String {
    ResourceKind::ClusterRole.node_id("", name)
}

/// `rb:{ns}/{binding}:{subject}`
pub fn role_binding_edge_id(namespace: &str, binding: &str, subject: &str) -> String {
    format!(
        "{}:{}/{}:{}",
        ResourceKind::RoleBinding.id_prefix(),
        namespace,
        binding,
        subject
    )
}

/// `crb:{binding}:{ns}/{subject}`
pub fn cluster_role_binding_edge_id(binding: &str, namespace: &str, subject: &str) -> String {
    format!(
        "{}:{}:{}/{}",
        ResourceKind::ClusterRoleBinding.id_prefix(),
        binding,
        namespace,
        subject
    )
}

/// `{relation}:{source}->{target}`, used by owns/selects/routes/mounts/envfrom/usessa
pub fn relation_edge_id(relation: &str, source: &str, target: &str) -> String {
    format!("{}:{}->{}", relation, source, target)
}

/// `inet->:{target}`
pub fn external_edge_id(target: &str) -> String {
    format!("inet->:{}", target)
}
