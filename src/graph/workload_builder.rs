//! Workload topology graph builder
//!
//! Turns independently listed workload resources into a compound graph.
//! Controllers (Deployment, StatefulSet, DaemonSet) and ReplicaSets become
//! compound parents of what they own, so a pod renders inside its replica set
//! which renders inside its deployment.
//!
//! Relationship inference:
//!   1. Owner references  - nesting, plus `owns` edges for non-controller owners
//!   2. Label selectors   - Service → Pod
//!   3. Ingress rules     - Ingress → Service
//!   4. Volumes / envFrom - Pod → ConfigMap / Secret / PVC
//!   5. Service accounts  - Pod → ServiceAccount (non-default only)
//!
//! An "External" zone holding an Internet node is added whenever something is
//! reachable from outside the cluster.
//!
//! Edges are only drawn between registered nodes; dangling references degrade
//! to namespace-level nesting or a missing edge, never an error.

use super::BuildOptions;
use super::context::GraphContext;
use super::ids::{self, EXTERNAL_ZONE_ID, INTERNET_ID};
use super::models::{Edge, EdgeType, Elements, Node, NodeDetails, NodeType};
use super::namespaces::add_namespace_nodes;
use crate::models::{
    EnvSourceKind, NamespacedRecord, OwnerReference, PodRecord, ResourceKind, ServiceRecord,
    VolumeSourceKind, WorkloadInput, selector_matches,
};
use std::collections::{HashMap, HashSet};

/// Build the workload graph with default options
pub fn build_workload_graph(input: &WorkloadInput) -> Elements {
    build_workload_graph_with(input, &BuildOptions::default())
}

/// Build the workload graph
pub fn build_workload_graph_with(input: &WorkloadInput, options: &BuildOptions) -> Elements {
    let mut builder = WorkloadGraphBuilder::new(input, options);

    builder.add_namespace_nodes();
    builder.add_controller_nodes();
    builder.add_replica_set_nodes();
    builder.add_pod_nodes();
    builder.add_flat_nodes();

    builder.add_ownership_edges();
    builder.add_selector_edges();
    builder.add_routing_edges();
    builder.add_pod_reference_edges();
    builder.add_external_zone();

    let ctx = builder.ctx;
    tracing::debug!(
        "Built workload graph: {} nodes, {} edges",
        ctx.node_count(),
        ctx.edge_count()
    );
    ctx.into_elements()
}

/// Per-build state: the output context plus uid lookups used for nesting
struct WorkloadGraphBuilder<'a> {
    input: &'a WorkloadInput,
    options: &'a BuildOptions,
    ctx: GraphContext,
    /// child uid → owner uid (last owner reference wins)
    owner_of: HashMap<&'a str, &'a str>,
    /// uid → kind, for compound-eligible kinds only
    kind_of: HashMap<&'a str, ResourceKind>,
    /// uid → node id, for every registered resource
    node_of: HashMap<&'a str, String>,
}

impl<'a> WorkloadGraphBuilder<'a> {
    fn new(input: &'a WorkloadInput, options: &'a BuildOptions) -> Self {
        let mut owner_of = HashMap::new();
        let owned = input
            .replicasets
            .iter()
            .map(|rs| (rs.uid.as_str(), &rs.owner_references))
            .chain(
                input
                    .pods
                    .iter()
                    .map(|pod| (pod.uid.as_str(), &pod.owner_references)),
            );
        for (uid, refs) in owned {
            if uid.is_empty() {
                continue;
            }
            for owner in refs.iter().filter(|r| !r.uid.is_empty()) {
                owner_of.insert(uid, owner.uid.as_str());
            }
        }

        let mut kind_of = HashMap::new();
        let controllers = input
            .deployments
            .iter()
            .map(|d| (d.uid.as_str(), ResourceKind::Deployment))
            .chain(
                input
                    .statefulsets
                    .iter()
                    .map(|s| (s.uid.as_str(), ResourceKind::StatefulSet)),
            )
            .chain(
                input
                    .daemonsets
                    .iter()
                    .map(|d| (d.uid.as_str(), ResourceKind::DaemonSet)),
            )
            .chain(
                input
                    .replicasets
                    .iter()
                    .map(|rs| (rs.uid.as_str(), ResourceKind::ReplicaSet)),
            );
        for (uid, kind) in controllers.filter(|(uid, _)| !uid.is_empty()) {
            kind_of.insert(uid, kind);
        }

        Self {
            input,
            options,
            ctx: GraphContext::new(),
            owner_of,
            kind_of,
            node_of: HashMap::new(),
        }
    }

    fn register(&mut self, uid: &'a str, node_id: &str) {
        if !uid.is_empty() {
            self.node_of.insert(uid, node_id.to_string());
        }
    }

    /// Compound parent from ownership: the owning controller or replica set.
    ///
    /// `None` means the resource nests directly in its namespace.
    fn owner_parent(&self, uid: &str) -> Option<String> {
        let owner_uid = self.owner_of.get(uid)?;
        let kind = self.kind_of.get(owner_uid)?;
        if kind.is_compound_eligible() {
            self.node_of.get(owner_uid).cloned()
        } else {
            None
        }
    }

    fn add_namespace_nodes(&mut self) {
        let input = self.input;
        let namespaces = input
            .deployments
            .iter()
            .map(|r| r.namespace())
            .chain(input.statefulsets.iter().map(|r| r.namespace()))
            .chain(input.daemonsets.iter().map(|r| r.namespace()))
            .chain(input.replicasets.iter().map(|r| r.namespace()))
            .chain(input.pods.iter().map(|r| r.namespace()))
            .chain(input.services.iter().map(|r| r.namespace()))
            .chain(input.ingresses.iter().map(|r| r.namespace()))
            .chain(input.configmaps.iter().map(|r| r.namespace()))
            .chain(input.secrets.iter().map(|r| r.namespace()))
            .chain(input.pvcs.iter().map(|r| r.namespace()));
        add_namespace_nodes(&mut self.ctx, namespaces);
    }

    fn add_controller_nodes(&mut self) {
        let input = self.input;

        for d in &input.deployments {
            let id = d.node_id();
            self.register(&d.uid, &id);
            self.ctx.add_node(
                Node::new(id, format!("{}\n(deployment)", d.name), NodeType::Deployment)
                    .in_namespace(&d.namespace)
                    .with_details(NodeDetails::Replicas {
                        replicas: d.replicas,
                        ready_replicas: d.ready_replicas,
                    })
                    .with_raw(self.options.raw(d)),
            );
        }

        for s in &input.statefulsets {
            let id = s.node_id();
            self.register(&s.uid, &id);
            self.ctx.add_node(
                Node::new(id, format!("{}\n(statefulset)", s.name), NodeType::StatefulSet)
                    .in_namespace(&s.namespace)
                    .with_details(NodeDetails::Replicas {
                        replicas: s.replicas,
                        ready_replicas: s.ready_replicas,
                    })
                    .with_raw(self.options.raw(s)),
            );
        }

        for d in &input.daemonsets {
            let id = d.node_id();
            self.register(&d.uid, &id);
            self.ctx.add_node(
                Node::new(id, format!("{}\n(daemonset)", d.name), NodeType::DaemonSet)
                    .in_namespace(&d.namespace)
                    .with_details(NodeDetails::Scheduled {
                        desired: d.desired,
                        ready: d.ready,
                    })
                    .with_raw(self.options.raw(d)),
            );
        }
    }

    fn add_replica_set_nodes(&mut self) {
        for rs in &self.input.replicasets {
            let id = rs.node_id();
            self.register(&rs.uid, &id);
            let mut node = Node::new(
                id,
                format!(
                    "{}\n(replicaset) {}/{}",
                    rs.name, rs.ready_replicas, rs.replicas
                ),
                NodeType::ReplicaSet,
            )
            .in_namespace(&rs.namespace)
            .with_details(NodeDetails::Replicas {
                replicas: rs.replicas,
                ready_replicas: rs.ready_replicas,
            })
            .with_raw(self.options.raw(rs));
            if let Some(parent) = self.owner_parent(&rs.uid) {
                node = node.with_parent(parent);
            }
            self.ctx.add_node(node);
        }
    }

    fn add_pod_nodes(&mut self) {
        for pod in &self.input.pods {
            let id = pod.node_id();
            self.register(&pod.uid, &id);
            let phase = pod.phase.as_deref().unwrap_or("Unknown");
            let mut node = Node::new(
                id,
                format!("{}\n(pod) {}", pod.name, phase),
                NodeType::Pod,
            )
            .in_namespace(&pod.namespace)
            .with_details(NodeDetails::Pod {
                phase: pod.phase.clone(),
            })
            .with_raw(self.options.raw(pod));
            if let Some(parent) = self.owner_parent(&pod.uid) {
                node = node.with_parent(parent);
            }
            self.ctx.add_node(node);
        }
    }

    /// Services, ingresses, config maps, secrets and PVCs: namespace-parented only
    fn add_flat_nodes(&mut self) {
        let input = self.input;

        for svc in &input.services {
            let id = svc.node_id();
            self.register(&svc.uid, &id);
            self.ctx.add_node(
                Node::new(id, service_label(svc), NodeType::Service)
                    .in_namespace(&svc.namespace)
                    .with_details(NodeDetails::Service {
                        service_type: svc.service_type.clone(),
                        ports: svc.ports.clone(),
                    })
                    .with_raw(self.options.raw(svc)),
            );
        }

        for ing in &input.ingresses {
            let id = ing.node_id();
            self.register(&ing.uid, &id);
            self.ctx.add_node(
                Node::new(id, format!("{}\n(ingress)", ing.name), NodeType::Ingress)
                    .in_namespace(&ing.namespace)
                    .with_raw(self.options.raw(ing)),
            );
        }

        for cm in &input.configmaps {
            let id = cm.node_id();
            self.register(&cm.uid, &id);
            self.ctx.add_node(
                Node::new(id, format!("{}\n(configmap)", cm.name), NodeType::ConfigMap)
                    .in_namespace(&cm.namespace)
                    .with_details(NodeDetails::ConfigMap {
                        data_keys: cm.data_keys.clone(),
                    })
                    .with_raw(self.options.raw(cm)),
            );
        }

        for secret in &input.secrets {
            let id = secret.node_id();
            self.register(&secret.uid, &id);
            self.ctx.add_node(
                Node::new(id, format!("{}\n(secret)", secret.name), NodeType::Secret)
                    .in_namespace(&secret.namespace)
                    .with_details(NodeDetails::Secret {
                        secret_type: secret.secret_type.clone(),
                        data_keys: secret.data_keys.clone(),
                    })
                    .with_raw(self.options.raw(secret)),
            );
        }

        for pvc in &input.pvcs {
            let id = pvc.node_id();
            self.register(&pvc.uid, &id);
            self.ctx.add_node(
                Node::new(id, format!("{}\n(pvc)", pvc.name), NodeType::Pvc)
                    .in_namespace(&pvc.namespace)
                    .with_details(NodeDetails::Claim {
                        storage_class: pvc.storage_class.clone(),
                        capacity: pvc.capacity.clone(),
                        pvc_phase: pvc.phase.clone(),
                    })
                    .with_raw(self.options.raw(pvc)),
            );
        }
    }

    /// `owns` edges for owners that are not already compound parents.
    ///
    /// Owners of kind Deployment, StatefulSet, DaemonSet or ReplicaSet are
    /// skipped: nesting already shows that relationship.
    fn add_ownership_edges(&mut self) {
        let input = self.input;
        for rs in &input.replicasets {
            self.add_owns_edges(&rs.owner_references, &rs.node_id());
        }
        for pod in &input.pods {
            self.add_owns_edges(&pod.owner_references, &pod.node_id());
        }
    }

    fn add_owns_edges(&mut self, owners: &[OwnerReference], child_id: &str) {
        for owner in owners {
            let Some(owner_id) = self.node_of.get(owner.uid.as_str()).cloned() else {
                continue;
            };
            if self
                .kind_of
                .get(owner.uid.as_str())
                .is_some_and(|kind| kind.is_compound_eligible())
            {
                continue;
            }
            self.ctx.add_edge(Edge::new(
                ids::relation_edge_id("owns", &owner_id, child_id),
                owner_id,
                child_id,
                EdgeType::Owns,
                "owns",
            ));
        }
    }

    /// Service → Pod edges by equality label matching within one namespace
    fn add_selector_edges(&mut self) {
        let input = self.input;
        for svc in input.services.iter().filter(|s| !s.selector.is_empty()) {
            let svc_id = svc.node_id();
            for pod in input
                .pods
                .iter()
                .filter(|p| p.namespace == svc.namespace)
                .filter(|p| selector_matches(&svc.selector, &p.labels))
            {
                let pod_id = pod.node_id();
                self.ctx.add_edge(Edge::new(
                    ids::relation_edge_id("selects", &svc_id, &pod_id),
                    svc_id.clone(),
                    pod_id,
                    EdgeType::Selects,
                    "selects",
                ));
            }
        }
    }

    /// Ingress → Service edges for backends that resolve in the ingress namespace
    fn add_routing_edges(&mut self) {
        for ing in &self.input.ingresses {
            let ing_id = ing.node_id();
            for backend in &ing.backends {
                let Some(service_name) = backend.backend_service() else {
                    continue;
                };
                let svc_id = ResourceKind::Service.node_id(&ing.namespace, service_name);
                if !self.ctx.has_node(&svc_id) {
                    continue;
                }
                self.ctx.add_edge(Edge::new(
                    ids::relation_edge_id("routes", &ing_id, &svc_id),
                    ing_id.clone(),
                    svc_id,
                    EdgeType::Routes,
                    format!("{}{}", backend.host, backend.path_or_root()),
                ));
            }
        }
    }

    /// Mount, envFrom and service account edges, pod by pod
    fn add_pod_reference_edges(&mut self) {
        for pod in &self.input.pods {
            self.add_mount_edges(pod);
            self.add_service_account_edge(pod);
        }
    }

    fn add_mount_edges(&mut self, pod: &PodRecord) {
        let pod_id = pod.node_id();
        // A target referenced both as a volume and via envFrom gets one edge
        let mut mounted: HashSet<String> = HashSet::new();

        for volume in &pod.volumes {
            let kind = match volume.kind {
                VolumeSourceKind::ConfigMap => ResourceKind::ConfigMap,
                VolumeSourceKind::Secret => ResourceKind::Secret,
                VolumeSourceKind::Pvc => ResourceKind::PersistentVolumeClaim,
                VolumeSourceKind::Other => continue,
            };
            let target_id = kind.node_id(&pod.namespace, &volume.name);
            if self.ctx.has_node(&target_id) && mounted.insert(target_id.clone()) {
                self.ctx.add_edge(Edge::new(
                    ids::relation_edge_id("mounts", &pod_id, &target_id),
                    pod_id.clone(),
                    target_id,
                    EdgeType::Mounts,
                    "mounts",
                ));
            }
        }

        for env_ref in &pod.env_refs {
            let kind = match env_ref.kind {
                EnvSourceKind::ConfigMap => ResourceKind::ConfigMap,
                EnvSourceKind::Secret => ResourceKind::Secret,
                EnvSourceKind::Other => continue,
            };
            let target_id = kind.node_id(&pod.namespace, &env_ref.name);
            if self.ctx.has_node(&target_id) && mounted.insert(target_id.clone()) {
                self.ctx.add_edge(Edge::new(
                    ids::relation_edge_id("envfrom", &pod_id, &target_id),
                    pod_id.clone(),
                    target_id,
                    EdgeType::Mounts,
                    "envFrom",
                ));
            }
        }
    }

    /// Service accounts are not part of the workload input, so the node is
    /// synthesized on first use.
    fn add_service_account_edge(&mut self, pod: &PodRecord) {
        let Some(sa_name) = pod.explicit_service_account() else {
            return;
        };
        let sa_id = ids::service_account_id(&pod.namespace, sa_name);
        if !self.ctx.has_node(&sa_id) {
            self.ctx.add_node(
                Node::new(
                    sa_id.clone(),
                    format!("{}\n(serviceaccount)", sa_name),
                    NodeType::ServiceAccount,
                )
                .in_namespace(&pod.namespace),
            );
        }
        let pod_id = pod.node_id();
        self.ctx.add_edge(Edge::new(
            ids::relation_edge_id("usessa", &pod_id, &sa_id),
            pod_id,
            sa_id,
            EdgeType::UsesServiceAccount,
            "uses SA",
        ));
    }

    /// External zone with an Internet node, linked to ingresses and to
    /// LoadBalancer / NodePort services
    fn add_external_zone(&mut self) {
        let input = self.input;
        let exposed: Vec<&ServiceRecord> = input
            .services
            .iter()
            .filter(|s| s.service_type.is_externally_reachable())
            .collect();
        if input.ingresses.is_empty() && exposed.is_empty() {
            return;
        }

        self.ctx
            .add_node(Node::new(EXTERNAL_ZONE_ID, "External", NodeType::Zone));
        self.ctx.add_node(
            Node::new(INTERNET_ID, "Internet", NodeType::Internet).with_parent(EXTERNAL_ZONE_ID),
        );

        for ing in &input.ingresses {
            let ing_id = ing.node_id();
            let label = ing
                .backends
                .iter()
                .map(|b| b.host.as_str())
                .find(|host| !host.is_empty() && *host != "*")
                .unwrap_or("HTTPS");
            self.ctx.add_edge(Edge::new(
                ids::external_edge_id(&ing_id),
                INTERNET_ID,
                ing_id,
                EdgeType::External,
                label,
            ));
        }

        for svc in exposed {
            let svc_id = svc.node_id();
            let ports = svc
                .ports
                .iter()
                .map(|p| p.port.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let label = if ports.is_empty() {
                svc.service_type.to_string()
            } else {
                format!("{} :{}", svc.service_type, ports)
            };
            self.ctx.add_edge(Edge::new(
                ids::external_edge_id(&svc_id),
                INTERNET_ID,
                svc_id,
                EdgeType::External,
                label,
            ));
        }
    }
}

/// Service label with internal and external addresses when known
fn service_label(svc: &ServiceRecord) -> String {
    let mut label = format!("{}\n(service)", svc.name);
    if let Some(ip) = svc.cluster_ip.as_deref().filter(|ip| !ip.is_empty()) {
        label.push_str(&format!("\nInternal: {}", ip));
    }
    if !svc.external_ips.is_empty() {
        label.push_str(&format!("\nExternal: {}", svc.external_ips.join(", ")));
    }
    label
}
