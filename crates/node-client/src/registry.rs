// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Registry of known ledger nodes
//!
//! The registry is the single source of truth for which backend endpoints
//! exist and which one receives requests. It is constructed once and shared
//! as `Arc<NodeRegistry>`; every mutation goes through its own methods, which
//! persist the full list and notify subscribers when the active node changes.

use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use api_client::{
    DEFAULT_PROBE_TIMEOUT, HealthStatus, ProbeResult, Transport, TransportRequest,
};
use parking_lot::{Mutex, RwLock};
use shared_types::{NodeDescriptor, default_nodes};
use tracing::{debug, error, info, warn};

use crate::{
    HttpTransport, NonEmptyString,
    operations::{STATISTICS, endpoint_url},
    store::NodeStore,
};

/// Storage key holding the serialized descriptor list
pub const STORAGE_KEY: &str = "blockchain_nodes";

/// Callback invoked with the new active descriptor
pub type Observer = Arc<dyn Fn(&NodeDescriptor) + Send + Sync>;

/// Handle returned by [`NodeRegistry::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Known backend nodes, the active one, and their persistence
pub struct NodeRegistry {
    nodes: RwLock<Vec<NodeDescriptor>>,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
    store: Box<dyn NodeStore>,
    prober: HttpTransport,
    probe_timeout: Duration,
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("nodes", &self.list())
            .field("store", &self.store)
            .field("probe_timeout", &self.probe_timeout)
            .finish_non_exhaustive()
    }
}

impl NodeRegistry {
    /// Load the registry from `store`, seeding it with the built-in nodes
    /// when nothing usable is stored
    pub fn new(store: impl NodeStore + 'static, prober: HttpTransport) -> Self {
        let nodes = match load_nodes(&store) {
            Some(nodes) => {
                info!(count = nodes.len(), "loaded nodes from storage");
                nodes
            }
            None => {
                info!("using built-in default nodes");
                let nodes = default_nodes();
                save_nodes(&store, &nodes);
                nodes
            }
        };

        Self {
            nodes: RwLock::new(nodes),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            store: Box::new(store),
            prober,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Replace the probe timeout
    #[must_use]
    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Snapshot of all descriptors
    pub fn list(&self) -> Vec<NodeDescriptor> {
        self.nodes.read().clone()
    }

    /// Number of known nodes
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Always `false`: the registry never drops its last node
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The active descriptor
    ///
    /// If stored state left no node (or several nodes) active, the first
    /// active one, or else the first node, becomes the only active node.
    pub fn active(&self) -> NodeDescriptor {
        {
            let nodes = self.nodes.read();
            if nodes.iter().filter(|node| node.is_active).count() == 1 {
                if let Some(active) = nodes.iter().find(|node| node.is_active) {
                    return active.clone();
                }
            }
        }

        let mut nodes = self.nodes.write();
        if nodes.is_empty() {
            warn!("registry was empty, restoring built-in nodes");
            *nodes = default_nodes();
        }
        let index = nodes.iter().position(|node| node.is_active).unwrap_or(0);
        warn!(index, "repairing active node invariant");
        for (i, node) in nodes.iter_mut().enumerate() {
            node.is_active = i == index;
        }
        save_nodes(self.store.as_ref(), &nodes);
        nodes[index].clone()
    }

    /// Make the node at `index` the only active node
    ///
    /// Returns `false` without changing anything if `index` is out of range.
    pub fn activate(&self, index: usize) -> bool {
        let activated = {
            let mut nodes = self.nodes.write();
            if index >= nodes.len() {
                debug!(index, len = nodes.len(), "activate index out of range");
                return false;
            }
            for (i, node) in nodes.iter_mut().enumerate() {
                node.is_active = i == index;
            }
            save_nodes(self.store.as_ref(), &nodes);
            nodes[index].clone()
        };

        info!(name = %activated.name, url = %activated.url, "active node changed");
        self.notify(&activated);
        true
    }

    /// Append a new inactive node
    ///
    /// Returns `false` if either argument is blank or `url` is already known.
    pub fn add(&self, name: &str, url: &str) -> bool {
        let (Ok(name), Ok(url)) = (NonEmptyString::new(name), NonEmptyString::new(url)) else {
            debug!("rejecting node with empty name or url");
            return false;
        };

        let mut nodes = self.nodes.write();
        if nodes.iter().any(|node| node.url == url.as_str()) {
            debug!(url = %url, "rejecting duplicate node url");
            return false;
        }

        nodes.push(NodeDescriptor::new(name.into_string(), url.into_string()));
        save_nodes(self.store.as_ref(), &nodes);
        true
    }

    /// Rename and re-point the node at `index`
    ///
    /// Returns `false` if `index` is out of range, either argument is blank,
    /// or `url` belongs to another node. Editing the active node notifies
    /// subscribers so cached base urls are re-resolved.
    pub fn edit(&self, index: usize, name: &str, url: &str) -> bool {
        let (Ok(name), Ok(url)) = (NonEmptyString::new(name), NonEmptyString::new(url)) else {
            return false;
        };

        let edited_active = {
            let mut nodes = self.nodes.write();
            if index >= nodes.len() {
                return false;
            }
            if nodes
                .iter()
                .enumerate()
                .any(|(i, node)| i != index && node.url == url.as_str())
            {
                debug!(url = %url, "rejecting edit to a duplicate url");
                return false;
            }

            let node = &mut nodes[index];
            node.name = name.into_string();
            node.url = url.into_string();
            let edited = node.is_active.then(|| node.clone());
            save_nodes(self.store.as_ref(), &nodes);
            edited
        };

        if let Some(active) = edited_active {
            info!(name = %active.name, url = %active.url, "active node edited");
            self.notify(&active);
        }
        true
    }

    /// Remove the node at `index`
    ///
    /// Returns `false` if `index` is out of range or it is the last node.
    /// Removing the active node promotes the new first node and notifies.
    pub fn remove(&self, index: usize) -> bool {
        let promoted = {
            let mut nodes = self.nodes.write();
            if index >= nodes.len() || nodes.len() == 1 {
                return false;
            }

            let removed = nodes.remove(index);
            let promoted = removed.is_active.then(|| {
                nodes[0].is_active = true;
                nodes[0].clone()
            });
            save_nodes(self.store.as_ref(), &nodes);
            info!(name = %removed.name, "node removed");
            promoted
        };

        if let Some(active) = promoted {
            info!(name = %active.name, "promoted first node after removing the active one");
            self.notify(&active);
        }
        true
    }

    /// Discard all state and restore the built-in nodes
    pub fn reset_to_defaults(&self) {
        if let Err(e) = self.store.clear(STORAGE_KEY) {
            error!(error = %e, "failed to clear stored nodes");
        }

        let active = {
            let mut nodes = self.nodes.write();
            *nodes = default_nodes();
            save_nodes(self.store.as_ref(), &nodes);
            nodes[0].clone()
        };

        info!("reset to default nodes");
        self.notify(&active);
    }

    /// Whether `url` answers `GET {url}/statistics` with a 2xx status
    pub async fn probe(&self, url: &str) -> bool {
        self.probe_detailed(url).await.status.is_up()
    }

    /// Probe `url` and report status and timing
    pub async fn probe_detailed(&self, url: &str) -> ProbeResult {
        let start_time = Instant::now();

        let status = match endpoint_url(url, STATISTICS.candidates[0], None) {
            Ok(target) => {
                debug!(url = %target, "probing node");
                let request = TransportRequest::get(target).with_timeout(self.probe_timeout);
                match self.prober.execute(request).await {
                    Ok(response) => HealthStatus::from_status_code(response.status),
                    Err(e) => HealthStatus::Down {
                        reason: e.to_string(),
                    },
                }
            }
            Err(e) => HealthStatus::Down {
                reason: e.to_string(),
            },
        };

        let response_time = start_time.elapsed();
        if status.is_up() {
            info!(url, ?response_time, "node probe passed");
        } else {
            warn!(url, reason = status.description(), "node probe failed");
        }
        ProbeResult::new(url, status, response_time)
    }

    /// Register `observer` for active-node changes
    pub fn subscribe(&self, observer: impl Fn(&NodeDescriptor) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().push((id, Arc::new(observer)));
        id
    }

    /// Remove a previously registered observer
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Invoke every observer outside the state lock; a panicking observer is
    /// logged and the rest still run
    fn notify(&self, active: &NodeDescriptor) {
        let observers: Vec<Observer> = self
            .observers
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            if catch_unwind(AssertUnwindSafe(|| observer(active))).is_err() {
                error!(name = %active.name, "node change observer panicked");
            }
        }
    }
}

/// Read the stored list; malformed or empty data counts as absent
fn load_nodes(store: &dyn NodeStore) -> Option<Vec<NodeDescriptor>> {
    let raw = match store.load(STORAGE_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            error!(error = %e, "error loading nodes from storage");
            return None;
        }
    };

    match serde_json::from_str::<Vec<NodeDescriptor>>(&raw) {
        Ok(nodes) if !nodes.is_empty() => Some(nodes),
        Ok(_) => {
            warn!("stored node list is empty");
            None
        }
        Err(e) => {
            warn!(error = %e, "stored node list is malformed");
            None
        }
    }
}

fn save_nodes(store: &dyn NodeStore, nodes: &[NodeDescriptor]) {
    let serialized = match serde_json::to_string(nodes) {
        Ok(serialized) => serialized,
        Err(e) => {
            error!(error = %e, "error serializing nodes");
            return;
        }
    };
    if let Err(e) = store.save(STORAGE_KEY, &serialized) {
        error!(error = %e, "error saving nodes to storage");
    }
}
