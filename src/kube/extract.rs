//! Manifest extraction
//!
//! Converts Kubernetes API objects (the camelCase shape returned by the API
//! server or `kubectl get -o json`) into the flat records the graph builders
//! consume. Only graph-relevant fields are kept.

use super::filter::is_hidden_name;
use crate::error::{Error, Result};
use crate::models::{
    AccessInput, ClusterRoleBindingRecord, ClusterRoleRecord, ConfigMapRecord, DaemonSetRecord,
    DeploymentRecord, EnvFromRef, EnvSourceKind, IngressBackend, IngressRecord, Labels,
    OwnerReference, PodRecord, PolicyRule, PortRef, PvcRecord, ReplicaSetRecord, ResourceKind,
    RoleBindingRecord, RoleRecord, RoleRef, SecretRecord, ServiceAccountRecord, ServicePort,
    ServiceRecord, ServiceType, StatefulSetRecord, Subject, VolumeRef, VolumeSourceKind,
    WorkloadInput,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Records that can be extracted from a raw API object
pub trait FromManifest: Sized {
    /// Kind this record is extracted from
    const KIND: ResourceKind;

    fn from_manifest(obj: &Value) -> Result<Self>;
}

/// Object metadata shared by every kind
struct Meta {
    name: String,
    namespace: String,
    uid: String,
    creation_timestamp: Option<String>,
}

fn meta(obj: &Value, kind: ResourceKind) -> Result<Meta> {
    let name = str_at(obj, "/metadata/name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::MissingField {
            kind: kind.to_string(),
            field: "metadata.name",
        })?;
    Ok(Meta {
        name: name.to_string(),
        namespace: str_at(obj, "/metadata/namespace")
            .unwrap_or_default()
            .to_string(),
        uid: str_at(obj, "/metadata/uid").unwrap_or_default().to_string(),
        creation_timestamp: str_at(obj, "/metadata/creationTimestamp").map(str::to_string),
    })
}

fn str_at<'a>(obj: &'a Value, pointer: &str) -> Option<&'a str> {
    obj.pointer(pointer).and_then(Value::as_str)
}

fn i32_at(obj: &Value, pointer: &str) -> i32 {
    obj.pointer(pointer)
        .and_then(Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(0)
}

fn array_at<'a>(obj: &'a Value, pointer: &str) -> &'a [Value] {
    obj.pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// String-valued map, skipping non-string values
fn labels_at(obj: &Value, pointer: &str) -> Labels {
    obj.pointer(pointer)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn sorted_keys_at(obj: &Value, pointer: &str) -> Vec<String> {
    let mut keys: Vec<String> = obj
        .pointer(pointer)
        .and_then(Value::as_object)
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

/// Deserialize an optional nested value, treating absence and `null` as default
fn typed_at<T: DeserializeOwned + Default>(obj: &Value, pointer: &str) -> Result<T> {
    match obj.pointer(pointer) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value.clone())?),
    }
}

fn owner_references(obj: &Value) -> Vec<OwnerReference> {
    array_at(obj, "/metadata/ownerReferences")
        .iter()
        .map(|r| OwnerReference {
            kind: str_at(r, "/kind").unwrap_or_default().to_string(),
            name: str_at(r, "/name").unwrap_or_default().to_string(),
            uid: str_at(r, "/uid").unwrap_or_default().to_string(),
        })
        .collect()
}

impl FromManifest for ServiceAccountRecord {
    const KIND: ResourceKind = ResourceKind::ServiceAccount;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        let is_system = m.name == "default" || is_hidden_name(&m.name);
        Ok(Self {
            name: m.name,
            namespace: m.namespace,
            creation_timestamp: m.creation_timestamp,
            is_system,
        })
    }
}

impl FromManifest for RoleRecord {
    const KIND: ResourceKind = ResourceKind::Role;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            is_system: is_hidden_name(&m.name),
            rules: typed_at::<Vec<PolicyRule>>(obj, "/rules")?,
            name: m.name,
            namespace: m.namespace,
            creation_timestamp: m.creation_timestamp,
        })
    }
}

impl FromManifest for ClusterRoleRecord {
    const KIND: ResourceKind = ResourceKind::ClusterRole;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            is_system: is_hidden_name(&m.name),
            rules: typed_at::<Vec<PolicyRule>>(obj, "/rules")?,
            name: m.name,
            creation_timestamp: m.creation_timestamp,
        })
    }
}

impl FromManifest for RoleBindingRecord {
    const KIND: ResourceKind = ResourceKind::RoleBinding;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            is_system: is_hidden_name(&m.name),
            role_ref: typed_at::<RoleRef>(obj, "/roleRef")?,
            subjects: typed_at::<Vec<Subject>>(obj, "/subjects")?,
            name: m.name,
            namespace: m.namespace,
            creation_timestamp: m.creation_timestamp,
        })
    }
}

impl FromManifest for ClusterRoleBindingRecord {
    const KIND: ResourceKind = ResourceKind::ClusterRoleBinding;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            is_system: is_hidden_name(&m.name),
            role_ref: typed_at::<RoleRef>(obj, "/roleRef")?,
            subjects: typed_at::<Vec<Subject>>(obj, "/subjects")?,
            name: m.name,
            creation_timestamp: m.creation_timestamp,
        })
    }
}

impl FromManifest for DeploymentRecord {
    const KIND: ResourceKind = ResourceKind::Deployment;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            name: m.name,
            namespace: m.namespace,
            uid: m.uid,
            labels: labels_at(obj, "/metadata/labels"),
            selector: labels_at(obj, "/spec/selector/matchLabels"),
            replicas: i32_at(obj, "/spec/replicas"),
            ready_replicas: i32_at(obj, "/status/readyReplicas"),
            creation_timestamp: m.creation_timestamp,
        })
    }
}

impl FromManifest for StatefulSetRecord {
    const KIND: ResourceKind = ResourceKind::StatefulSet;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            name: m.name,
            namespace: m.namespace,
            uid: m.uid,
            labels: labels_at(obj, "/metadata/labels"),
            selector: labels_at(obj, "/spec/selector/matchLabels"),
            replicas: i32_at(obj, "/spec/replicas"),
            ready_replicas: i32_at(obj, "/status/readyReplicas"),
            creation_timestamp: m.creation_timestamp,
        })
    }
}

impl FromManifest for DaemonSetRecord {
    const KIND: ResourceKind = ResourceKind::DaemonSet;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            name: m.name,
            namespace: m.namespace,
            uid: m.uid,
            labels: labels_at(obj, "/metadata/labels"),
            selector: labels_at(obj, "/spec/selector/matchLabels"),
            desired: i32_at(obj, "/status/desiredNumberScheduled"),
            ready: i32_at(obj, "/status/numberReady"),
            creation_timestamp: m.creation_timestamp,
        })
    }
}

impl FromManifest for ReplicaSetRecord {
    const KIND: ResourceKind = ResourceKind::ReplicaSet;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            owner_references: owner_references(obj),
            name: m.name,
            namespace: m.namespace,
            uid: m.uid,
            replicas: i32_at(obj, "/spec/replicas"),
            ready_replicas: i32_at(obj, "/status/readyReplicas"),
        })
    }
}

impl FromManifest for PodRecord {
    const KIND: ResourceKind = ResourceKind::Pod;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;

        // First matching source per volume
        let volumes = array_at(obj, "/spec/volumes")
            .iter()
            .filter_map(|v| {
                if let Some(name) = str_at(v, "/configMap/name") {
                    Some((VolumeSourceKind::ConfigMap, name))
                } else if let Some(name) = str_at(v, "/secret/secretName") {
                    Some((VolumeSourceKind::Secret, name))
                } else {
                    str_at(v, "/persistentVolumeClaim/claimName")
                        .map(|name| (VolumeSourceKind::Pvc, name))
                }
            })
            .map(|(kind, name)| VolumeRef {
                kind,
                name: name.to_string(),
            })
            .collect();

        let env_refs = array_at(obj, "/spec/containers")
            .iter()
            .flat_map(|c| array_at(c, "/envFrom"))
            .filter_map(|ef| {
                if let Some(name) = str_at(ef, "/configMapRef/name") {
                    Some((EnvSourceKind::ConfigMap, name))
                } else {
                    str_at(ef, "/secretRef/name").map(|name| (EnvSourceKind::Secret, name))
                }
            })
            .map(|(kind, name)| EnvFromRef {
                kind,
                name: name.to_string(),
            })
            .collect();

        Ok(Self {
            labels: labels_at(obj, "/metadata/labels"),
            owner_references: owner_references(obj),
            phase: Some(
                str_at(obj, "/status/phase")
                    .filter(|p| !p.is_empty())
                    .unwrap_or("Unknown")
                    .to_string(),
            ),
            service_account_name: str_at(obj, "/spec/serviceAccountName").map(str::to_string),
            volumes,
            env_refs,
            name: m.name,
            namespace: m.namespace,
            uid: m.uid,
        })
    }
}

impl FromManifest for ServiceRecord {
    const KIND: ResourceKind = ResourceKind::Service;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;

        let ports = array_at(obj, "/spec/ports")
            .iter()
            .map(|p| ServicePort {
                port: i32_at(p, "/port"),
                target_port: p.get("targetPort").and_then(|tp| match tp {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                }),
                protocol: Some(str_at(p, "/protocol").unwrap_or("TCP").to_string()),
                name: str_at(p, "/name").map(str::to_string),
            })
            .collect();

        let service_type = match str_at(obj, "/spec/type") {
            None => ServiceType::ClusterIP,
            Some(t) => serde_json::from_value(Value::String(t.to_string()))?,
        };

        // Headless services report the literal string "None"
        let cluster_ip = str_at(obj, "/spec/clusterIP")
            .filter(|ip| !ip.is_empty() && *ip != "None")
            .map(str::to_string);

        let external_ips = array_at(obj, "/status/loadBalancer/ingress")
            .iter()
            .filter_map(|lb| str_at(lb, "/ip").or_else(|| str_at(lb, "/hostname")))
            .map(str::to_string)
            .collect();

        Ok(Self {
            selector: labels_at(obj, "/spec/selector"),
            service_type,
            ports,
            cluster_ip,
            external_ips,
            name: m.name,
            namespace: m.namespace,
            uid: m.uid,
        })
    }
}

impl FromManifest for IngressRecord {
    const KIND: ResourceKind = ResourceKind::Ingress;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;

        let mut backends = Vec::new();
        for rule in array_at(obj, "/spec/rules") {
            let host = str_at(rule, "/host").filter(|h| !h.is_empty()).unwrap_or("*");
            for path in array_at(rule, "/http/paths") {
                let service_port = path
                    .pointer("/backend/service/port")
                    .and_then(|port| match port.get("number").and_then(Value::as_i64) {
                        Some(n) if n != 0 => i32::try_from(n).ok().map(PortRef::Number),
                        _ => str_at(port, "/name").map(|n| PortRef::Name(n.to_string())),
                    });
                backends.push(IngressBackend {
                    host: host.to_string(),
                    path: Some(
                        str_at(path, "/path")
                            .filter(|p| !p.is_empty())
                            .unwrap_or("/")
                            .to_string(),
                    ),
                    service_name: str_at(path, "/backend/service/name").map(str::to_string),
                    service_port,
                });
            }
        }

        Ok(Self {
            name: m.name,
            namespace: m.namespace,
            uid: m.uid,
            backends,
        })
    }
}

impl FromManifest for ConfigMapRecord {
    const KIND: ResourceKind = ResourceKind::ConfigMap;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            name: m.name,
            namespace: m.namespace,
            uid: m.uid,
            data_keys: sorted_keys_at(obj, "/data"),
        })
    }
}

impl FromManifest for SecretRecord {
    const KIND: ResourceKind = ResourceKind::Secret;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            name: m.name,
            namespace: m.namespace,
            uid: m.uid,
            secret_type: Some(
                str_at(obj, "/type")
                    .filter(|t| !t.is_empty())
                    .unwrap_or("Opaque")
                    .to_string(),
            ),
            data_keys: sorted_keys_at(obj, "/data"),
        })
    }
}

impl FromManifest for PvcRecord {
    const KIND: ResourceKind = ResourceKind::PersistentVolumeClaim;

    fn from_manifest(obj: &Value) -> Result<Self> {
        let m = meta(obj, Self::KIND)?;
        Ok(Self {
            name: m.name,
            namespace: m.namespace,
            uid: m.uid,
            storage_class: str_at(obj, "/spec/storageClassName").map(str::to_string),
            access_modes: typed_at::<Vec<String>>(obj, "/spec/accessModes")?,
            capacity: str_at(obj, "/status/capacity/storage").map(str::to_string),
            phase: Some(
                str_at(obj, "/status/phase")
                    .filter(|p| !p.is_empty())
                    .unwrap_or("Unknown")
                    .to_string(),
            ),
        })
    }
}

/// Kind of a raw item, matched leniently (`kind` field, any case)
fn item_kind(item: &Value) -> Option<ResourceKind> {
    str_at(item, "/kind").and_then(ResourceKind::from_str_case_insensitive)
}

/// Extract every item of one kind from a list of raw objects
pub fn extract_all<T: FromManifest>(items: &[Value]) -> Result<Vec<T>> {
    items
        .iter()
        .filter(|item| item_kind(item) == Some(T::KIND))
        .map(T::from_manifest)
        .collect()
}

fn log_skipped(items: &[Value], wanted: &[ResourceKind]) {
    for item in items {
        match item_kind(item) {
            Some(kind) if wanted.contains(&kind) => {}
            _ => tracing::debug!(
                "Skipping {} {}",
                str_at(item, "/kind").unwrap_or("<no kind>"),
                str_at(item, "/metadata/name").unwrap_or("<unnamed>")
            ),
        }
    }
}

impl AccessInput {
    /// Build the access input from a mixed list of API objects.
    ///
    /// Items of other kinds are skipped.
    pub fn from_items(items: &[Value]) -> Result<Self> {
        log_skipped(
            items,
            &[
                ResourceKind::ServiceAccount,
                ResourceKind::Role,
                ResourceKind::ClusterRole,
                ResourceKind::RoleBinding,
                ResourceKind::ClusterRoleBinding,
            ],
        );
        Ok(Self {
            service_accounts: extract_all(items)?,
            roles: extract_all(items)?,
            cluster_roles: extract_all(items)?,
            role_bindings: extract_all(items)?,
            cluster_role_bindings: extract_all(items)?,
        })
    }
}

impl WorkloadInput {
    /// Build the workload input from a mixed list of API objects.
    ///
    /// Namespace objects only contribute their name to `namespaces`.
    pub fn from_items(items: &[Value]) -> Result<Self> {
        log_skipped(
            items,
            &[
                ResourceKind::Namespace,
                ResourceKind::Deployment,
                ResourceKind::StatefulSet,
                ResourceKind::DaemonSet,
                ResourceKind::ReplicaSet,
                ResourceKind::Pod,
                ResourceKind::Service,
                ResourceKind::Ingress,
                ResourceKind::ConfigMap,
                ResourceKind::Secret,
                ResourceKind::PersistentVolumeClaim,
            ],
        );
        let mut namespaces: Vec<String> = items
            .iter()
            .filter(|item| item_kind(item) == Some(ResourceKind::Namespace))
            .filter_map(|item| str_at(item, "/metadata/name"))
            .map(str::to_string)
            .collect();
        namespaces.sort();

        Ok(Self {
            namespaces,
            deployments: extract_all(items)?,
            statefulsets: extract_all(items)?,
            daemonsets: extract_all(items)?,
            replicasets: extract_all(items)?,
            pods: extract_all(items)?,
            services: extract_all(items)?,
            ingresses: extract_all(items)?,
            configmaps: extract_all(items)?,
            secrets: extract_all(items)?,
            pvcs: extract_all(items)?,
        })
    }
}

/// Snapshot accepted on input: a record bundle or raw API objects
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// Already flattened records (the `AccessInput` / `WorkloadInput` shape)
    Records(Value),
    /// Raw API objects from a `List` or a bare array
    Items(Vec<Value>),
}

impl Snapshot {
    /// Parse snapshot text, JSON first and YAML as fallback
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) => serde_yaml::from_str(text)?,
        };
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Snapshot::Items(items)),
            Value::Object(mut map) => {
                if let Some(items) = map.remove("items") {
                    return match items {
                        Value::Array(items) => Ok(Snapshot::Items(items)),
                        Value::Null => Ok(Snapshot::Items(Vec::new())),
                        other => Err(Error::UnsupportedSnapshot(format!(
                            "`items` must be an array, got {}",
                            json_type(&other)
                        ))),
                    };
                }
                // A single API object
                if map.contains_key("kind") && map.contains_key("metadata") {
                    Ok(Snapshot::Items(vec![Value::Object(map)]))
                } else {
                    Ok(Snapshot::Records(Value::Object(map)))
                }
            }
            other => Err(Error::UnsupportedSnapshot(format!(
                "expected an object or array, got {}",
                json_type(&other)
            ))),
        }
    }

    pub fn into_access_input(self) -> Result<AccessInput> {
        match self {
            Snapshot::Records(value) => Ok(serde_json::from_value(value)?),
            Snapshot::Items(items) => AccessInput::from_items(&items),
        }
    }

    pub fn into_workload_input(self) -> Result<WorkloadInput> {
        match self {
            Snapshot::Records(value) => Ok(serde_json::from_value(value)?),
            Snapshot::Items(items) => WorkloadInput::from_items(&items),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
