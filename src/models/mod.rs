//! Resource model layer
//!
//! Typed records for every Kubernetes kind the graph builders consume.
//!
//! Structure:
//! - `resource_kind.rs` - Kind enum and node id scheme
//! - `access.rs` - RBAC records (service accounts, roles, bindings)
//! - `workload.rs` - Workload topology records (controllers, pods, services, ...)
//!
//! Records deserialize from the flattened snake_case shape produced by the
//! listing layer. Missing or `null` collections become empty, missing scalar
//! fields become `None`.

mod access;
mod resource_kind;
mod workload;

pub use access::*;
pub use resource_kind::ResourceKind;
pub use workload::*;

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Label and selector maps. Ordered so rendered output is stable.
pub type Labels = BTreeMap<String, String>;

/// Deserialize `null` as the type's default value
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Common accessors for records that live inside a namespace
pub trait NamespacedRecord {
    /// Resource kind of the record
    const KIND: ResourceKind;

    fn name(&self) -> &str;
    fn namespace(&self) -> &str;

    /// Deterministic node id for this record
    fn node_id(&self) -> String {
        Self::KIND.node_id(self.namespace(), self.name())
    }
}

macro_rules! namespaced_record {
    ($($record:ty => $kind:expr),+ $(,)?) => {
        $(
            impl NamespacedRecord for $record {
                const KIND: ResourceKind = $kind;

                fn name(&self) -> &str {
                    &self.name
                }

                fn namespace(&self) -> &str {
                    &self.namespace
                }
            }
        )+
    };
}

namespaced_record! {
    ServiceAccountRecord => ResourceKind::ServiceAccount,
    RoleRecord => ResourceKind::Role,
    RoleBindingRecord => ResourceKind::RoleBinding,
    DeploymentRecord => ResourceKind::Deployment,
    StatefulSetRecord => ResourceKind::StatefulSet,
    DaemonSetRecord => ResourceKind::DaemonSet,
    ReplicaSetRecord => ResourceKind::ReplicaSet,
    PodRecord => ResourceKind::Pod,
    ServiceRecord => ResourceKind::Service,
    IngressRecord => ResourceKind::Ingress,
    ConfigMapRecord => ResourceKind::ConfigMap,
    SecretRecord => ResourceKind::Secret,
    PvcRecord => ResourceKind::PersistentVolumeClaim,
}

/// Equality-based selector match: every selector pair must be present in the labels.
///
/// An empty selector matches nothing.
pub fn selector_matches(selector: &Labels, labels: &Labels) -> bool {
    !selector.is_empty()
        && selector
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
}
