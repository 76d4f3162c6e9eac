//! Workload graph tests
//!
//! Tests for compound nesting, relationship edges and external zone synthesis

use kubegraph::graph::{EdgeType, Elements, NodeType, build_workload_graph};
use kubegraph::models::WorkloadInput;
use serde_json::json;
use std::collections::HashSet;

fn workload_input(value: serde_json::Value) -> WorkloadInput {
    serde_json::from_value(value).expect("valid workload input")
}

/// A deployment → replica set → pod chain with a selecting service
fn web_stack() -> WorkloadInput {
    workload_input(json!({
        "deployments": [{
            "name": "web", "namespace": "shop", "uid": "d1",
            "labels": {"app": "web"}, "selector": {"app": "web"},
            "replicas": 2, "ready_replicas": 1
        }],
        "replicasets": [{
            "name": "web-7f9c", "namespace": "shop", "uid": "r1",
            "owner_references": [{"kind": "Deployment", "name": "web", "uid": "d1"}],
            "replicas": 2, "ready_replicas": 1
        }],
        "pods": [
            {
                "name": "web-7f9c-a", "namespace": "shop", "uid": "p1",
                "labels": {"app": "web", "pod-template-hash": "7f9c"},
                "owner_references": [{"kind": "ReplicaSet", "name": "web-7f9c", "uid": "r1"}],
                "phase": "Running"
            },
            {
                "name": "web-7f9c-b", "namespace": "shop", "uid": "p2",
                "labels": {"app": "web", "pod-template-hash": "7f9c"},
                "owner_references": [{"kind": "ReplicaSet", "name": "web-7f9c", "uid": "r1"}],
                "phase": "Pending"
            }
        ],
        "services": [{
            "name": "web", "namespace": "shop", "uid": "s1",
            "selector": {"app": "web"}, "type": "ClusterIP",
            "ports": [{"port": 80}], "cluster_ip": "10.0.0.10"
        }]
    }))
}

fn assert_unique_ids(elements: &Elements) {
    let mut seen = HashSet::new();
    for id in elements.node_ids() {
        assert!(seen.insert(id), "duplicate node {}", id);
    }
    let mut seen = HashSet::new();
    for id in elements.edge_ids() {
        assert!(seen.insert(id), "duplicate edge {}", id);
    }
}

fn assert_edges_resolve(elements: &Elements) {
    for edge in elements.edges.iter().map(|e| &e.data) {
        assert!(elements.node(&edge.source).is_some(), "{}", edge.id);
        assert!(elements.node(&edge.target).is_some(), "{}", edge.id);
    }
}

#[test]
fn test_two_level_compound_nesting() {
    let elements = build_workload_graph(&web_stack());

    assert_eq!(
        elements.node_ids(),
        vec![
            "ns:shop",
            "deploy:shop/web",
            "rs:shop/web-7f9c",
            "pod:shop/web-7f9c-a",
            "pod:shop/web-7f9c-b",
            "svc:shop/web"
        ]
    );
    let parent = |id: &str| elements.node(id).unwrap().parent.clone();
    assert_eq!(parent("deploy:shop/web").as_deref(), Some("ns:shop"));
    assert_eq!(parent("rs:shop/web-7f9c").as_deref(), Some("deploy:shop/web"));
    assert_eq!(parent("pod:shop/web-7f9c-a").as_deref(), Some("rs:shop/web-7f9c"));
    assert_eq!(parent("svc:shop/web").as_deref(), Some("ns:shop"));
}

#[test]
fn test_node_labels() {
    let elements = build_workload_graph(&web_stack());

    let label = |id: &str| elements.node(id).unwrap().label.clone();
    assert_eq!(label("deploy:shop/web"), "web\n(deployment)");
    assert_eq!(label("rs:shop/web-7f9c"), "web-7f9c\n(replicaset) 1/2");
    assert_eq!(label("pod:shop/web-7f9c-b"), "web-7f9c-b\n(pod) Pending");
    assert_eq!(label("svc:shop/web"), "web\n(service)\nInternal: 10.0.0.10");
}

#[test]
fn test_compound_owners_do_not_get_owns_edges() {
    let elements = build_workload_graph(&web_stack());

    assert_eq!(elements.edges_of_type(EdgeType::Owns).count(), 0);
}

#[test]
fn test_owns_edge_for_non_controller_owner() {
    // A pod owned by a service-like resource the builder knows about but does not nest
    let input = workload_input(json!({
        "services": [{"name": "odd-owner", "namespace": "a", "uid": "s1"}],
        "pods": [{
            "name": "p", "namespace": "a", "uid": "p1",
            "owner_references": [{"kind": "Service", "name": "odd-owner", "uid": "s1"}]
        }]
    }));

    let elements = build_workload_graph(&input);

    assert_eq!(elements.node("pod:a/p").unwrap().parent.as_deref(), Some("ns:a"));
    let owns: Vec<_> = elements.edges_of_type(EdgeType::Owns).collect();
    assert_eq!(owns.len(), 1);
    assert_eq!(owns[0].id, "owns:svc:a/odd-owner->pod:a/p");
    assert_eq!(owns[0].label, "owns");
}

#[test]
fn test_unknown_owner_falls_back_to_namespace() {
    let input = workload_input(json!({
        "pods": [{
            "name": "job-pod", "namespace": "batch", "uid": "p1",
            "owner_references": [{"kind": "Job", "name": "nightly", "uid": "j1"}]
        }]
    }));

    let elements = build_workload_graph(&input);

    assert_eq!(
        elements.node("pod:batch/job-pod").unwrap().parent.as_deref(),
        Some("ns:batch")
    );
    assert!(elements.edges.is_empty());
}

#[test]
fn test_statefulset_pods_nest_directly() {
    let input = workload_input(json!({
        "statefulsets": [{"name": "db", "namespace": "data", "uid": "st1", "replicas": 1}],
        "pods": [{
            "name": "db-0", "namespace": "data", "uid": "p1",
            "owner_references": [{"kind": "StatefulSet", "name": "db", "uid": "st1"}]
        }]
    }));

    let elements = build_workload_graph(&input);

    assert_eq!(
        elements.node("pod:data/db-0").unwrap().parent.as_deref(),
        Some("sts:data/db")
    );
    assert_eq!(elements.node("sts:data/db").unwrap().label, "db\n(statefulset)");
    assert_eq!(
        elements.node("pod:data/db-0").unwrap().label,
        "db-0\n(pod) Unknown"
    );
}

#[test]
fn test_selector_matching() {
    let elements = build_workload_graph(&web_stack());

    let selects: Vec<_> = elements
        .edges_of_type(EdgeType::Selects)
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(
        selects,
        vec![
            "selects:svc:shop/web->pod:shop/web-7f9c-a",
            "selects:svc:shop/web->pod:shop/web-7f9c-b"
        ]
    );
}

#[test]
fn test_selector_requires_same_namespace_and_all_pairs() {
    let input = workload_input(json!({
        "services": [
            {"name": "api", "namespace": "a", "selector": {"app": "api", "tier": "back"}},
            {"name": "empty", "namespace": "a", "selector": {}}
        ],
        "pods": [
            {"name": "partial", "namespace": "a", "labels": {"app": "api"}},
            {"name": "full", "namespace": "a", "labels": {"app": "api", "tier": "back"}},
            {"name": "elsewhere", "namespace": "b", "labels": {"app": "api", "tier": "back"}}
        ]
    }));

    let elements = build_workload_graph(&input);

    assert_eq!(
        elements.edge_ids(),
        vec!["selects:svc:a/api->pod:a/full"]
    );
}

#[test]
fn test_ingress_routes_and_external_zone() {
    let input = workload_input(json!({
        "services": [{"name": "web", "namespace": "shop", "ports": [{"port": 80}]}],
        "ingresses": [{
            "name": "public", "namespace": "shop",
            "backends": [
                {"host": "*", "path": "/", "service_name": "web", "service_port": 80},
                {"host": "shop.example.com", "path": "/api", "service_name": "web", "service_port": "http"},
                {"host": "shop.example.com", "service_name": "missing"}
            ]
        }]
    }));

    let elements = build_workload_graph(&input);

    let routes: Vec<_> = elements.edges_of_type(EdgeType::Routes).collect();
    assert_eq!(routes.len(), 1, "same ingress/service pair is one edge");
    assert_eq!(routes[0].id, "routes:ing:shop/public->svc:shop/web");
    assert_eq!(routes[0].label, "*/");

    let zone = elements.node("zone:external").unwrap();
    assert_eq!(zone.node_type, NodeType::Zone);
    assert_eq!(zone.label, "External");
    let internet = elements.node("internet").unwrap();
    assert_eq!(internet.parent.as_deref(), Some("zone:external"));

    let external = elements.edge("inet->:ing:shop/public").unwrap();
    assert_eq!(external.source, "internet");
    assert_eq!(external.label, "shop.example.com");
    assert_eq!(external.edge_type, EdgeType::External);
    // ClusterIP services stay internal
    assert!(elements.edge("inet->:svc:shop/web").is_none());
}

#[test]
fn test_wildcard_only_ingress_gets_generic_label() {
    let input = workload_input(json!({
        "ingresses": [{"name": "catch-all", "namespace": "a", "backends": [{"host": null}]}]
    }));

    let elements = build_workload_graph(&input);

    assert_eq!(elements.edge("inet->:ing:a/catch-all").unwrap().label, "HTTPS");
}

#[test]
fn test_external_zone_gating() {
    let mut input = workload_input(json!({
        "services": [{"name": "internal", "namespace": "a", "type": "ClusterIP"}]
    }));
    let elements = build_workload_graph(&input);
    assert!(elements.node("zone:external").is_none());
    assert!(elements.node("internet").is_none());

    input.services.push(
        serde_json::from_value(json!({
            "name": "lb", "namespace": "a", "type": "LoadBalancer",
            "ports": [{"port": 443}], "external_ips": ["203.0.113.7"]
        }))
        .unwrap(),
    );
    let elements = build_workload_graph(&input);
    assert!(elements.node("zone:external").is_some());
    let edge = elements.edge("inet->:svc:a/lb").unwrap();
    assert_eq!(edge.label, "LoadBalancer :443");
    assert_eq!(
        elements.node("svc:a/lb").unwrap().label,
        "lb\n(service)\nExternal: 203.0.113.7"
    );
}

#[test]
fn test_mounts_are_deduplicated_per_pod() {
    let input = workload_input(json!({
        "configmaps": [{"name": "settings", "namespace": "a", "data_keys": ["app.yaml"]}],
        "secrets": [{"name": "creds", "namespace": "a", "type": "Opaque"}],
        "pvcs": [{"name": "data", "namespace": "a", "phase": "Bound"}],
        "pods": [{
            "name": "p", "namespace": "a",
            "volumes": [
                {"type": "configmap", "name": "settings"},
                {"type": "pvc", "name": "data"},
                {"type": "configmap", "name": "settings"},
                {"type": "secret", "name": "not-listed"}
            ],
            "env_refs": [
                {"type": "configmap", "name": "settings"},
                {"type": "secret", "name": "creds"}
            ]
        }]
    }));

    let elements = build_workload_graph(&input);

    assert_eq!(
        elements.edge_ids(),
        vec![
            "mounts:pod:a/p->cm:a/settings",
            "mounts:pod:a/p->pvc:a/data",
            "envfrom:pod:a/p->sec:a/creds"
        ]
    );
    let env = elements.edge("envfrom:pod:a/p->sec:a/creds").unwrap();
    assert_eq!(env.label, "envFrom");
    assert_eq!(env.edge_type, EdgeType::Mounts);
}

#[test]
fn test_service_account_edges() {
    let input = workload_input(json!({
        "pods": [
            {"name": "a", "namespace": "ns1", "service_account_name": "builder"},
            {"name": "b", "namespace": "ns1", "service_account_name": "builder"},
            {"name": "c", "namespace": "ns1", "service_account_name": "default"},
            {"name": "d", "namespace": "ns1"}
        ]
    }));

    let elements = build_workload_graph(&input);

    let sa = elements.node("sa:ns1/builder").unwrap();
    assert_eq!(sa.label, "builder\n(serviceaccount)");
    assert_eq!(sa.parent.as_deref(), Some("ns:ns1"));
    assert_eq!(
        elements.edge_ids(),
        vec!["usessa:pod:ns1/a->sa:ns1/builder", "usessa:pod:ns1/b->sa:ns1/builder"]
    );
    assert_eq!(
        elements.edge("usessa:pod:ns1/a->sa:ns1/builder").unwrap().label,
        "uses SA"
    );
}

#[test]
fn test_daemonset_details() {
    let input = workload_input(json!({
        "daemonsets": [{"name": "agent", "namespace": "ops", "desired": 3, "ready": 2}]
    }));

    let value = serde_json::to_value(build_workload_graph(&input)).unwrap();

    let node = &value["nodes"][1]["data"];
    assert_eq!(node["id"], "ds:ops/agent");
    assert_eq!(node["label"], "agent\n(daemonset)");
    assert_eq!(node["desired"], 3);
    assert_eq!(node["ready"], 2);
}

#[test]
fn test_referential_integrity_and_uniqueness() {
    let mut input = web_stack();
    input.ingresses.push(
        serde_json::from_value(json!({
            "name": "web", "namespace": "shop",
            "backends": [{"host": "shop.example.com", "service_name": "web"}]
        }))
        .unwrap(),
    );
    // Dangling references everywhere
    input.pods.push(
        serde_json::from_value(json!({
            "name": "orphan", "namespace": "shop", "uid": "p9",
            "owner_references": [{"kind": "ReplicaSet", "name": "gone", "uid": "r-gone"}],
            "volumes": [{"type": "pvc", "name": "gone"}],
            "env_refs": [{"type": "secret", "name": "gone"}]
        }))
        .unwrap(),
    );

    let elements = build_workload_graph(&input);

    assert_unique_ids(&elements);
    assert_edges_resolve(&elements);
    assert_eq!(
        elements.node("pod:shop/orphan").unwrap().parent.as_deref(),
        Some("ns:shop")
    );
}

#[test]
fn test_workload_graph_is_idempotent() {
    let input = web_stack();
    let first = build_workload_graph(&input);
    let second = build_workload_graph(&input);
    assert_eq!(first, second);
    assert_eq!(
        first.to_json(true).unwrap(),
        second.to_json(true).unwrap()
    );
}

#[test]
fn test_empty_input() {
    let elements = build_workload_graph(&WorkloadInput::default());
    assert!(elements.nodes.is_empty());
    assert!(elements.edges.is_empty());
}

#[test]
fn test_namespaces_list_alone_creates_no_nodes() {
    let input = workload_input(json!({"namespaces": ["a", "b"]}));
    let elements = build_workload_graph(&input);
    assert!(elements.nodes.is_empty());
}
