//! Workload topology records
//!
//! Controllers, replica sets, pods and the flat resources they reference.

use super::{Labels, nullable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Owner reference recorded on a replica set or pod
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerReference {
    pub kind: String,
    #[serde(default)]
    pub name: String,
    pub uid: String,
}

/// A Deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Labels,
    #[serde(default, deserialize_with = "nullable")]
    pub selector: Labels,
    #[serde(default, deserialize_with = "nullable")]
    pub replicas: i32,
    #[serde(default, deserialize_with = "nullable")]
    pub ready_replicas: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
}

/// A StatefulSet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatefulSetRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Labels,
    #[serde(default, deserialize_with = "nullable")]
    pub selector: Labels,
    #[serde(default, deserialize_with = "nullable")]
    pub replicas: i32,
    #[serde(default, deserialize_with = "nullable")]
    pub ready_replicas: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
}

/// A DaemonSet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaemonSetRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Labels,
    #[serde(default, deserialize_with = "nullable")]
    pub selector: Labels,
    /// Desired number of scheduled pods
    #[serde(default, deserialize_with = "nullable")]
    pub desired: i32,
    #[serde(default, deserialize_with = "nullable")]
    pub ready: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
}

/// A ReplicaSet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicaSetRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub owner_references: Vec<OwnerReference>,
    #[serde(default, deserialize_with = "nullable")]
    pub replicas: i32,
    #[serde(default, deserialize_with = "nullable")]
    pub ready_replicas: i32,
}

/// Source kind of a pod volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeSourceKind {
    ConfigMap,
    Secret,
    Pvc,
    #[serde(other)]
    Other,
}

/// A pod volume backed by a ConfigMap, Secret or PVC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRef {
    #[serde(rename = "type")]
    pub kind: VolumeSourceKind,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

/// Source kind of a container `envFrom` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvSourceKind {
    ConfigMap,
    Secret,
    #[serde(other)]
    Other,
}

/// A container `envFrom` reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvFromRef {
    #[serde(rename = "type")]
    pub kind: EnvSourceKind,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

/// A Pod
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Labels,
    #[serde(default, deserialize_with = "nullable")]
    pub owner_references: Vec<OwnerReference>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub service_account_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub volumes: Vec<VolumeRef>,
    #[serde(default, deserialize_with = "nullable")]
    pub env_refs: Vec<EnvFromRef>,
}

impl PodRecord {
    /// Service account worth drawing: set, non-empty and not `default`
    pub fn explicit_service_account(&self) -> Option<&str> {
        self.service_account_name
            .as_deref()
            .filter(|sa| !sa.is_empty() && *sa != "default")
    }
}

/// Service type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    #[default]
    ClusterIP,
    NodePort,
    LoadBalancer,
    ExternalName,
    /// Any other type string, kept verbatim
    #[serde(untagged)]
    Other(String),
}

impl ServiceType {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceType::ClusterIP => "ClusterIP",
            ServiceType::NodePort => "NodePort",
            ServiceType::LoadBalancer => "LoadBalancer",
            ServiceType::ExternalName => "ExternalName",
            ServiceType::Other(other) => other,
        }
    }

    /// LoadBalancer and NodePort services are reachable from outside the cluster
    pub fn is_externally_reachable(&self) -> bool {
        matches!(self, ServiceType::LoadBalancer | ServiceType::NodePort)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A service port
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicePort {
    pub port: i32,
    #[serde(default)]
    pub target_port: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A Service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub selector: Labels,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub service_type: ServiceType,
    #[serde(default, deserialize_with = "nullable")]
    pub ports: Vec<ServicePort>,
    #[serde(default)]
    pub cluster_ip: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub external_ips: Vec<String>,
}

/// Backend port of an ingress path, by number or by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortRef {
    Number(i32),
    Name(String),
}

/// One ingress rule path and the service it routes to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngressBackend {
    #[serde(default = "wildcard_host", deserialize_with = "host_or_wildcard")]
    pub host: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub service_port: Option<PortRef>,
}

fn wildcard_host() -> String {
    "*".to_string()
}

fn host_or_wildcard<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|host| !host.is_empty())
        .unwrap_or_else(wildcard_host))
}

impl IngressBackend {
    /// Path of the rule, `/` when unset or empty
    pub fn path_or_root(&self) -> &str {
        self.path.as_deref().filter(|p| !p.is_empty()).unwrap_or("/")
    }

    /// Name of the backend service, when the path routes to one
    pub fn backend_service(&self) -> Option<&str> {
        self.service_name.as_deref().filter(|s| !s.is_empty())
    }
}

/// An Ingress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngressRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub backends: Vec<IngressBackend>,
}

/// A ConfigMap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigMapRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub data_keys: Vec<String>,
}

/// A Secret. Only key names are carried, never values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(rename = "type", default)]
    pub secret_type: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub data_keys: Vec<String>,
}

/// A PersistentVolumeClaim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PvcRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(default)]
    pub storage_class: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub access_modes: Vec<String>,
    #[serde(default)]
    pub capacity: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
}

/// Everything the workload graph is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadInput {
    #[serde(default, deserialize_with = "nullable")]
    pub namespaces: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub deployments: Vec<DeploymentRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub statefulsets: Vec<StatefulSetRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub daemonsets: Vec<DaemonSetRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub replicasets: Vec<ReplicaSetRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub pods: Vec<PodRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub services: Vec<ServiceRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub ingresses: Vec<IngressRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub configmaps: Vec<ConfigMapRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub secrets: Vec<SecretRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub pvcs: Vec<PvcRecord>,
}

impl WorkloadInput {
    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
            && self.statefulsets.is_empty()
            && self.daemonsets.is_empty()
            && self.replicasets.is_empty()
            && self.pods.is_empty()
            && self.services.is_empty()
            && self.ingresses.is_empty()
            && self.configmaps.is_empty()
            && self.secrets.is_empty()
            && self.pvcs.is_empty()
    }
}
