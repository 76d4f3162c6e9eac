//! Access (RBAC) graph builder
//!
//! Converts flat lists of service accounts, roles, cluster roles and their
//! bindings into a compound graph:
//!
//! 1. Nodes for namespaces, service accounts, roles and cluster roles.
//! 2. RoleBindings become subject → role edges.
//! 3. ClusterRoleBindings become subject → cluster role edges.
//!
//! Bindings routinely reference roles the caller cannot list, so missing
//! roles and subjects are synthesized as placeholders instead of dropping
//! the edge.

use super::BuildOptions;
use super::context::GraphContext;
use super::ids;
use super::models::{Edge, EdgeType, Elements, Node, NodeDetails, NodeType};
use super::namespaces::add_namespace_nodes;
use crate::models::{AccessInput, ClusterRoleBindingRecord, RoleBindingRecord, RoleRefKind};

/// Namespace assumed for ClusterRoleBinding subjects that do not name one
pub const CLUSTER_BINDING_DEFAULT_NAMESPACE: &str = "default";

/// Build the access graph with default options
pub fn build_access_graph(input: &AccessInput) -> Elements {
    build_access_graph_with(input, &BuildOptions::default())
}

/// Build the access graph
pub fn build_access_graph_with(input: &AccessInput, options: &BuildOptions) -> Elements {
    let mut ctx = GraphContext::new();

    add_direct_nodes(&mut ctx, input, options);

    for binding in &input.role_bindings {
        add_role_binding(&mut ctx, binding);
    }

    for binding in &input.cluster_role_bindings {
        add_cluster_role_binding(&mut ctx, binding);
    }

    tracing::debug!(
        "Built access graph: {} nodes, {} edges",
        ctx.node_count(),
        ctx.edge_count()
    );
    ctx.into_elements()
}

fn add_direct_nodes(ctx: &mut GraphContext, input: &AccessInput, options: &BuildOptions) {
    let namespaces = input
        .service_accounts
        .iter()
        .map(|sa| sa.namespace.as_str())
        .chain(input.roles.iter().map(|r| r.namespace.as_str()))
        .chain(input.role_bindings.iter().map(|rb| rb.namespace.as_str()));
    add_namespace_nodes(ctx, namespaces);

    for sa in &input.service_accounts {
        ctx.add_node(
            Node::new(
                ids::service_account_id(&sa.namespace, &sa.name),
                &sa.name,
                NodeType::ServiceAccount,
            )
            .in_namespace(&sa.namespace)
            .with_raw(options.raw(sa)),
        );
    }

    for role in &input.roles {
        ctx.add_node(
            Node::new(
                ids::role_id(&role.namespace, &role.name),
                &role.name,
                NodeType::Role,
            )
            .in_namespace(&role.namespace)
            .with_details(NodeDetails::Rules {
                rule_count: role.rules.len(),
            })
            .with_raw(options.raw(role)),
        );
    }

    for cluster_role in &input.cluster_roles {
        ctx.add_node(
            Node::new(
                ids::cluster_role_id(&cluster_role.name),
                &cluster_role.name,
                NodeType::ClusterRole,
            )
            .with_details(NodeDetails::Rules {
                rule_count: cluster_role.rules.len(),
            })
            .with_raw(options.raw(cluster_role)),
        );
    }
}

fn add_role_binding(ctx: &mut GraphContext, binding: &RoleBindingRecord) {
    let role_ref = &binding.role_ref;
    let role_id = match role_ref.kind {
        RoleRefKind::ClusterRole => ensure_cluster_role(ctx, &role_ref.name),
        RoleRefKind::Role => {
            let id = ids::role_id(&binding.namespace, &role_ref.name);
            if !ctx.has_node(&id) {
                tracing::trace!("Synthesizing unlisted role {}", id);
                ctx.add_node(
                    Node::new(id.clone(), &role_ref.name, NodeType::Role)
                        .in_namespace(&binding.namespace)
                        .with_details(NodeDetails::Rules { rule_count: 0 }),
                );
            }
            id
        }
    };

    for subject in binding.subjects.iter().filter(|s| s.is_service_account()) {
        // Subjects without a namespace live in the binding's namespace
        let namespace = subject
            .explicit_namespace()
            .unwrap_or(binding.namespace.as_str());
        let sa_id = ensure_subject(ctx, namespace, &subject.name);
        ctx.push_edge(
            Edge::new(
                ids::role_binding_edge_id(&binding.namespace, &binding.name, &subject.name),
                sa_id,
                role_id.clone(),
                EdgeType::RoleBinding,
                &binding.name,
            )
            .with_namespace(&binding.namespace),
        );
    }
}

fn add_cluster_role_binding(ctx: &mut GraphContext, binding: &ClusterRoleBindingRecord) {
    let role_id = ensure_cluster_role(ctx, &binding.role_ref.name);

    for subject in binding.subjects.iter().filter(|s| s.is_service_account()) {
        let namespace = subject
            .explicit_namespace()
            .unwrap_or(CLUSTER_BINDING_DEFAULT_NAMESPACE);
        let sa_id = ensure_subject(ctx, namespace, &subject.name);
        ctx.push_edge(Edge::new(
            ids::cluster_role_binding_edge_id(&binding.name, namespace, &subject.name),
            sa_id,
            role_id.clone(),
            EdgeType::ClusterRoleBinding,
            &binding.name,
        ));
    }
}

/// Cluster role node id, synthesizing a rule-less placeholder when unlisted
fn ensure_cluster_role(ctx: &mut GraphContext, name: &str) -> String {
    let id = ids::cluster_role_id(name);
    if !ctx.has_node(&id) {
        tracing::trace!("Synthesizing unlisted cluster role {}", id);
        ctx.add_node(
            Node::new(id.clone(), name, NodeType::ClusterRole)
                .with_details(NodeDetails::Rules { rule_count: 0 }),
        );
    }
    id
}

/// Subject service account node id, synthesizing it and its namespace when unlisted
fn ensure_subject(ctx: &mut GraphContext, namespace: &str, name: &str) -> String {
    let id = ids::service_account_id(namespace, name);
    if !ctx.has_node(&id) {
        if !namespace.is_empty() {
            ctx.ensure_namespace(namespace);
        }
        ctx.add_node(
            Node::new(id.clone(), name, NodeType::ServiceAccount).in_namespace(namespace),
        );
    }
    id
}
