//! Manifest extraction tests
//!
//! Raw API object snapshots (List, bare array, YAML) into builder input.

use kubegraph::config::Config;
use kubegraph::error::Error;
use kubegraph::graph::{build_access_graph, build_workload_graph};
use kubegraph::kube::Snapshot;
use kubegraph::models::{PortRef, ServiceType, VolumeSourceKind};
use serde_json::json;

fn cluster_list() -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "List",
        "items": [
            {"apiVersion": "v1", "kind": "Namespace", "metadata": {"name": "shop"}},
            {
                "apiVersion": "v1", "kind": "ServiceAccount",
                "metadata": {"name": "web", "namespace": "shop", "uid": "sa-1"}
            },
            {
                "apiVersion": "rbac.authorization.k8s.io/v1", "kind": "RoleBinding",
                "metadata": {"name": "web-read", "namespace": "shop"},
                "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": "ClusterRole", "name": "view"},
                "subjects": [{"kind": "ServiceAccount", "name": "web"}]
            },
            {
                "apiVersion": "apps/v1", "kind": "Deployment",
                "metadata": {"name": "web", "namespace": "shop", "uid": "d-1", "labels": {"app": "web"}},
                "spec": {"replicas": 2, "selector": {"matchLabels": {"app": "web"}}},
                "status": {"readyReplicas": 2}
            },
            {
                "apiVersion": "apps/v1", "kind": "ReplicaSet",
                "metadata": {
                    "name": "web-5d", "namespace": "shop", "uid": "r-1",
                    "ownerReferences": [{"kind": "Deployment", "name": "web", "uid": "d-1"}]
                },
                "spec": {"replicas": 2},
                "status": {"readyReplicas": 2}
            },
            {
                "apiVersion": "v1", "kind": "Pod",
                "metadata": {
                    "name": "web-5d-x", "namespace": "shop", "uid": "p-1",
                    "labels": {"app": "web"},
                    "ownerReferences": [{"kind": "ReplicaSet", "name": "web-5d", "uid": "r-1"}]
                },
                "spec": {
                    "serviceAccountName": "web",
                    "volumes": [
                        {"name": "config", "configMap": {"name": "web-config"}},
                        {"name": "tmp", "emptyDir": {}}
                    ],
                    "containers": [{
                        "name": "app",
                        "envFrom": [{"secretRef": {"name": "web-creds"}}]
                    }]
                },
                "status": {"phase": "Running"}
            },
            {
                "apiVersion": "v1", "kind": "Service",
                "metadata": {"name": "web", "namespace": "shop"},
                "spec": {
                    "type": "LoadBalancer",
                    "clusterIP": "10.96.0.5",
                    "selector": {"app": "web"},
                    "ports": [{"port": 443, "targetPort": 8443}]
                },
                "status": {"loadBalancer": {"ingress": [{"hostname": "lb.example.com"}]}}
            },
            {
                "apiVersion": "networking.k8s.io/v1", "kind": "Ingress",
                "metadata": {"name": "web", "namespace": "shop"},
                "spec": {"rules": [{
                    "host": "shop.example.com",
                    "http": {"paths": [{
                        "path": "/",
                        "backend": {"service": {"name": "web", "port": {"name": "https"}}}
                    }]}
                }]}
            },
            {
                "apiVersion": "v1", "kind": "ConfigMap",
                "metadata": {"name": "web-config", "namespace": "shop"},
                "data": {"b.yaml": "", "a.yaml": ""}
            },
            {
                "apiVersion": "v1", "kind": "Secret",
                "metadata": {"name": "web-creds", "namespace": "shop"},
                "data": {"password": "c2VjcmV0"}
            },
            {
                "apiVersion": "example.com/v1", "kind": "Widget",
                "metadata": {"name": "ignored", "namespace": "shop"}
            }
        ]
    })
}

#[test]
fn test_list_snapshot_into_workload_input() {
    let input = Snapshot::from_value(cluster_list())
        .unwrap()
        .into_workload_input()
        .unwrap();

    assert_eq!(input.namespaces, vec!["shop"]);
    assert_eq!(input.deployments[0].selector.get("app").unwrap(), "web");
    assert_eq!(input.deployments[0].ready_replicas, 2);
    assert_eq!(input.replicasets[0].owner_references[0].uid, "d-1");

    let pod = &input.pods[0];
    assert_eq!(pod.phase.as_deref(), Some("Running"));
    assert_eq!(pod.volumes.len(), 1, "emptyDir volumes are not kept");
    assert_eq!(pod.volumes[0].kind, VolumeSourceKind::ConfigMap);
    assert_eq!(pod.env_refs[0].name, "web-creds");

    let svc = &input.services[0];
    assert_eq!(svc.service_type, ServiceType::LoadBalancer);
    assert_eq!(svc.cluster_ip.as_deref(), Some("10.96.0.5"));
    assert_eq!(svc.external_ips, vec!["lb.example.com"]);
    assert_eq!(svc.ports[0].target_port.as_deref(), Some("8443"));
    assert_eq!(svc.ports[0].protocol.as_deref(), Some("TCP"));

    let backend = &input.ingresses[0].backends[0];
    assert_eq!(backend.host, "shop.example.com");
    assert_eq!(backend.service_port, Some(PortRef::Name("https".to_string())));

    assert_eq!(input.configmaps[0].data_keys, vec!["a.yaml", "b.yaml"]);
    assert_eq!(input.secrets[0].secret_type.as_deref(), Some("Opaque"));
    assert_eq!(input.secrets[0].data_keys, vec!["password"]);
}

#[test]
fn test_list_snapshot_builds_full_workload_graph() {
    let input = Snapshot::from_value(cluster_list())
        .unwrap()
        .into_workload_input()
        .unwrap();

    let elements = build_workload_graph(&input);

    assert_eq!(
        elements.node("pod:shop/web-5d-x").unwrap().parent.as_deref(),
        Some("rs:shop/web-5d")
    );
    for id in [
        "selects:svc:shop/web->pod:shop/web-5d-x",
        "routes:ing:shop/web->svc:shop/web",
        "mounts:pod:shop/web-5d-x->cm:shop/web-config",
        "envfrom:pod:shop/web-5d-x->sec:shop/web-creds",
        "usessa:pod:shop/web-5d-x->sa:shop/web",
        "inet->:ing:shop/web",
        "inet->:svc:shop/web",
    ] {
        assert!(elements.edge(id).is_some(), "missing edge {}", id);
    }
}

#[test]
fn test_list_snapshot_into_access_input() {
    let input = Snapshot::from_value(cluster_list())
        .unwrap()
        .into_access_input()
        .unwrap();

    assert_eq!(input.service_accounts.len(), 1);
    assert!(!input.service_accounts[0].is_system);
    assert_eq!(input.role_bindings[0].role_ref.name, "view");
    assert!(input.roles.is_empty());

    let elements = build_access_graph(&input);
    let edge = elements.edge("rb:shop/web-read:web").unwrap();
    assert_eq!(edge.source, "sa:shop/web");
    assert_eq!(edge.target, "clusterrole:view");
}

#[test]
fn test_default_service_account_is_marked_system() {
    let input = Snapshot::from_value(json!([
        {"kind": "ServiceAccount", "metadata": {"name": "default", "namespace": "shop"}}
    ]))
    .unwrap()
    .into_access_input()
    .unwrap();

    assert!(input.service_accounts[0].is_system);
}

#[test]
fn test_single_object_snapshot() {
    let snapshot = Snapshot::from_value(json!({
        "kind": "ConfigMap",
        "metadata": {"name": "solo", "namespace": "a"}
    }))
    .unwrap();
    assert!(matches!(snapshot, Snapshot::Items(ref items) if items.len() == 1));

    let input = snapshot.into_workload_input().unwrap();
    assert_eq!(input.configmaps[0].name, "solo");
    assert!(input.configmaps[0].data_keys.is_empty());
}

#[test]
fn test_record_snapshot_passes_through() {
    let snapshot = Snapshot::from_value(json!({
        "pods": [{"name": "p", "namespace": "a"}]
    }))
    .unwrap();
    assert!(matches!(snapshot, Snapshot::Records(_)));

    let input = snapshot.into_workload_input().unwrap();
    assert_eq!(input.pods[0].name, "p");
}

#[test]
fn test_null_items_is_empty() {
    let input = Snapshot::from_value(json!({"kind": "List", "items": null}))
        .unwrap()
        .into_workload_input()
        .unwrap();
    assert!(input.is_empty());
}

#[test]
fn test_unsupported_snapshots() {
    assert!(matches!(
        Snapshot::from_value(json!("text")),
        Err(Error::UnsupportedSnapshot(_))
    ));
    assert!(matches!(
        Snapshot::from_value(json!({"items": {"kind": "Pod"}})),
        Err(Error::UnsupportedSnapshot(_))
    ));
}

#[test]
fn test_missing_name_fails_extraction() {
    let err = Snapshot::from_value(json!([{"kind": "Pod", "metadata": {"namespace": "a"}}]))
        .unwrap()
        .into_workload_input()
        .unwrap_err();

    match err {
        Error::MissingField { kind, field } => {
            assert_eq!(kind, "Pod");
            assert_eq!(field, "metadata.name");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_yaml_snapshot() {
    let yaml = r#"
apiVersion: v1
kind: List
items:
  - apiVersion: v1
    kind: Service
    metadata:
      name: api
      namespace: backend
    spec:
      clusterIP: None
      selector:
        app: api
      ports:
        - port: 8080
          protocol: UDP
  - apiVersion: v1
    kind: PersistentVolumeClaim
    metadata:
      name: data
      namespace: backend
    spec:
      storageClassName: fast
      accessModes: [ReadWriteOnce]
"#;

    let input = Snapshot::parse(yaml).unwrap().into_workload_input().unwrap();

    let svc = &input.services[0];
    assert_eq!(svc.service_type, ServiceType::ClusterIP);
    assert_eq!(svc.cluster_ip, None, "headless services have no cluster IP");
    assert_eq!(svc.ports[0].protocol.as_deref(), Some("UDP"));

    let pvc = &input.pvcs[0];
    assert_eq!(pvc.storage_class.as_deref(), Some("fast"));
    assert_eq!(pvc.access_modes, vec!["ReadWriteOnce"]);
    assert_eq!(pvc.phase.as_deref(), Some("Unknown"));
}

#[test]
fn test_json_text_snapshot() {
    let text = serde_json::to_string(&cluster_list()).unwrap();
    let input = Snapshot::parse(&text).unwrap().into_access_input().unwrap();
    assert_eq!(input.role_bindings.len(), 1);
}

#[test]
fn test_configured_prefixes_decide_service_account_visibility() {
    let mut input = Snapshot::from_value(json!({
        "kind": "List",
        "items": [
            {"kind": "ServiceAccount", "metadata": {"name": "system:builder", "namespace": "ci"}},
            {"kind": "Role", "metadata": {"name": "system:reader", "namespace": "ci"}}
        ]
    }))
    .unwrap()
    .into_access_input()
    .unwrap();
    assert!(input.service_accounts[0].is_system);

    let config = Config {
        hidden_prefixes: vec!["istio-".to_string()],
        ..Config::default()
    };
    config.filter_options().apply_access(&mut input);

    assert_eq!(input.roles.len(), 1);
    assert_eq!(input.service_accounts.len(), 1);
    assert_eq!(input.service_accounts[0].name, "system:builder");
}
