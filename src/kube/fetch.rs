//! Live cluster listing
//!
//! Lists every kind the builders consume and converts each object through the
//! manifest extractors, so live and snapshot input share one code path.

use super::extract::FromManifest;
use crate::models::{AccessInput, WorkloadInput};
use anyhow::{Context, Result};
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{
    ConfigMap, Namespace, PersistentVolumeClaim, Pod, Secret, Service, ServiceAccount,
};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use kube::api::ListParams;
use kube::{Api, Client, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// List a namespaced kind, in one namespace or across all of them
async fn list_namespaced<K, R>(client: &Client, namespace: Option<&str>) -> Result<Vec<R>>
where
    K: Resource<Scope = NamespaceResourceScope> + Clone + Debug + DeserializeOwned + Serialize,
    K::DynamicType: Default,
    R: FromManifest,
{
    let api: Api<K> = match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };
    convert(api, R::KIND).await
}

/// List a cluster-scoped kind
async fn list_cluster<K, R>(client: &Client) -> Result<Vec<R>>
where
    K: Resource + Clone + Debug + DeserializeOwned + Serialize,
    K::DynamicType: Default,
    R: FromManifest,
{
    let api: Api<K> = Api::all(client.clone());
    convert(api, R::KIND).await
}

async fn convert<K, R>(api: Api<K>, kind: crate::models::ResourceKind) -> Result<Vec<R>>
where
    K: Resource + Clone + Debug + DeserializeOwned + Serialize,
    R: FromManifest,
{
    let list = api
        .list(&ListParams::default())
        .await
        .with_context(|| format!("Failed to list {}", kind))?;
    tracing::debug!("Listed {} {} objects", list.items.len(), kind);

    list.items
        .iter()
        .map(|obj| {
            let value = serde_json::to_value(obj)
                .with_context(|| format!("Failed to serialize {}", kind))?;
            R::from_manifest(&value).map_err(anyhow::Error::from)
        })
        .collect()
}

/// Fetch RBAC input. Cluster roles and cluster role bindings are always cluster-wide.
pub async fn fetch_access_input(client: &Client, namespace: Option<&str>) -> Result<AccessInput> {
    let (service_accounts, roles, cluster_roles, role_bindings, cluster_role_bindings) = tokio::try_join!(
        list_namespaced::<ServiceAccount, _>(client, namespace),
        list_namespaced::<Role, _>(client, namespace),
        list_cluster::<ClusterRole, _>(client),
        list_namespaced::<RoleBinding, _>(client, namespace),
        list_cluster::<ClusterRoleBinding, _>(client),
    )?;

    Ok(AccessInput {
        service_accounts,
        roles,
        cluster_roles,
        role_bindings,
        cluster_role_bindings,
    })
}

/// Fetch workload input, plus the sorted list of namespace names
pub async fn fetch_workload_input(
    client: &Client,
    namespace: Option<&str>,
) -> Result<WorkloadInput> {
    let (namespaces, deployments, statefulsets, daemonsets, replicasets) = tokio::try_join!(
        list_namespace_names(client),
        list_namespaced::<Deployment, _>(client, namespace),
        list_namespaced::<StatefulSet, _>(client, namespace),
        list_namespaced::<DaemonSet, _>(client, namespace),
        list_namespaced::<ReplicaSet, _>(client, namespace),
    )?;
    let (pods, services, ingresses, configmaps, secrets, pvcs) = tokio::try_join!(
        list_namespaced::<Pod, _>(client, namespace),
        list_namespaced::<Service, _>(client, namespace),
        list_namespaced::<Ingress, _>(client, namespace),
        list_namespaced::<ConfigMap, _>(client, namespace),
        list_namespaced::<Secret, _>(client, namespace),
        list_namespaced::<PersistentVolumeClaim, _>(client, namespace),
    )?;

    Ok(WorkloadInput {
        namespaces,
        deployments,
        statefulsets,
        daemonsets,
        replicasets,
        pods,
        services,
        ingresses,
        configmaps,
        secrets,
        pvcs,
    })
}

async fn list_namespace_names(client: &Client) -> Result<Vec<String>> {
    let api: Api<Namespace> = Api::all(client.clone());
    let list = api
        .list(&ListParams::default())
        .await
        .context("Failed to list namespaces")?;
    let mut names: Vec<String> = list
        .items
        .into_iter()
        .filter_map(|ns| ns.metadata.name)
        .collect();
    names.sort();
    Ok(names)
}
