// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for `NodeRegistry`

use std::sync::{Arc, Mutex};

use api_client::HealthStatus;
use node_client::{FileNodeStore, HttpTransport, MemoryNodeStore, NodeRegistry, NodeStore, STORAGE_KEY};
use shared_types::{DEFAULT_NODES, NodeDescriptor};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

mod fixtures;
use fixtures::*;

fn default_registry() -> NodeRegistry {
    NodeRegistry::new(MemoryNodeStore::new(), HttpTransport::new().unwrap())
}

fn active_count(registry: &NodeRegistry) -> usize {
    registry.list().iter().filter(|node| node.is_active).count()
}

/// Record every notification
fn recorder(registry: &NodeRegistry) -> Arc<Mutex<Vec<NodeDescriptor>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    registry.subscribe(move |node| sink.lock().unwrap().push(node.clone()));
    seen
}

#[test]
fn activate_notifies_once_with_new_active() {
    let registry = default_registry();
    let seen = recorder(&registry);

    assert!(registry.activate(2));

    assert_eq!(registry.active().name, DEFAULT_NODES[2].0);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].name, "Local Node 3");
    assert_eq!(seen[0].url, "http://localhost:8085/api");
    assert!(seen[0].is_active);
}

#[test]
fn exactly_one_active_after_any_sequence() {
    let registry = default_registry();

    let steps: Vec<Box<dyn Fn(&NodeRegistry) -> bool>> = vec![
        Box::new(|r| r.activate(3)),
        Box::new(|r| r.add("Remote", "http://10.0.0.5:8080/api")),
        Box::new(|r| r.activate(4)),
        Box::new(|r| r.edit(4, "Remote Renamed", "http://10.0.0.6:8080/api")),
        Box::new(|r| r.remove(4)),
        Box::new(|r| r.remove(0)),
        Box::new(|r| r.activate(10)),
        Box::new(|r| r.add("Again", "http://10.0.0.7:8080/api")),
        Box::new(|r| {
            r.reset_to_defaults();
            true
        }),
        Box::new(|r| r.remove(1)),
        Box::new(|r| r.activate(2)),
        Box::new(|r| r.remove(2)),
    ];

    for (i, step) in steps.iter().enumerate() {
        step(&registry);
        assert_eq!(active_count(&registry), 1, "after step {i}");
        assert!(!registry.is_empty(), "after step {i}");
    }
}

#[test]
fn removing_active_promotes_first_and_notifies_once() {
    let registry = default_registry();
    assert!(registry.activate(2));
    let seen = recorder(&registry);

    assert!(registry.remove(2));

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.active().name, "Local Node 1");
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].name, "Local Node 1");
}

#[test]
fn last_node_cannot_be_removed() {
    let registry = default_registry();
    for _ in 0..3 {
        assert!(registry.remove(0));
    }
    assert_eq!(registry.len(), 1);

    assert!(!registry.remove(0));
    assert_eq!(registry.len(), 1);
    assert_eq!(active_count(&registry), 1);
}

#[test]
fn duplicate_url_leaves_registry_unchanged() {
    let registry = default_registry();
    let before = registry.list();

    assert!(!registry.add("Copy", DEFAULT_NODES[1].1));

    assert_eq!(registry.list(), before);
}

#[test]
fn reset_restores_defaults_and_notifies() {
    let store = MemoryNodeStore::new();
    let registry = NodeRegistry::new(store, HttpTransport::new().unwrap());
    assert!(registry.add("Extra", "http://10.0.0.9:8080/api"));
    assert!(registry.activate(4));
    let seen = recorder(&registry);

    registry.reset_to_defaults();

    assert_eq!(registry.len(), 4);
    assert_eq!(registry.active().name, "Local Node 1");
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn first_use_persists_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileNodeStore::new(dir.path());

    let registry = NodeRegistry::new(store.clone(), HttpTransport::new().unwrap());
    assert_eq!(registry.len(), 4);

    let stored = store.load(STORAGE_KEY).unwrap().unwrap();
    let nodes: Vec<NodeDescriptor> = serde_json::from_str(&stored).unwrap();
    assert_eq!(nodes.len(), 4);
    assert!(stored.contains("\"isActive\":true"));
}

#[test]
fn file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let registry =
            NodeRegistry::new(FileNodeStore::new(dir.path()), HttpTransport::new().unwrap());
        assert!(registry.add("Remote", "http://10.0.0.5:8080/api"));
        assert!(registry.activate(4));
    }

    let registry = NodeRegistry::new(FileNodeStore::new(dir.path()), HttpTransport::new().unwrap());
    assert_eq!(registry.len(), 5);
    assert_eq!(registry.active().name, "Remote");
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{STORAGE_KEY}.json")), "{not json").unwrap();

    let registry = NodeRegistry::new(FileNodeStore::new(dir.path()), HttpTransport::new().unwrap());
    assert_eq!(registry.len(), 4);
    assert_eq!(registry.active().name, "Local Node 1");
}

#[tokio::test]
async fn probe_requires_success_status() {
    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(LedgerFixture::statistics(1, 0)))
        .expect(1)
        .mount(&healthy)
        .await;

    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&failing)
        .await;

    let registry = default_registry().with_probe_timeout(TEST_TIMEOUT);
    let before = registry.list();

    assert!(registry.probe(&api_url(&healthy)).await);
    assert!(!registry.probe(&api_url(&failing)).await);
    assert!(!registry.probe(REFUSED_NODE).await);
    assert!(!registry.probe("not a url").await);

    // probing never touches the registry
    assert_eq!(registry.list(), before);
}

#[tokio::test]
async fn probe_detailed_reports_status() {
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&failing)
        .await;

    let registry = default_registry().with_probe_timeout(TEST_TIMEOUT);

    let degraded = registry.probe_detailed(&api_url(&failing)).await;
    assert!(matches!(degraded.status, HealthStatus::Degraded { .. }));
    assert_eq!(degraded.url, api_url(&failing));

    let down = registry.probe_detailed(REFUSED_NODE).await;
    assert!(matches!(down.status, HealthStatus::Down { .. }));
}
