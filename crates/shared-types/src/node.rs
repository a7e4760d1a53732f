// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Backend node descriptors

use serde::{Deserialize, Serialize};

/// Built-in nodes used to seed an empty registry and on reset, as `(name, url)`
///
/// The first entry is the one marked active.
pub const DEFAULT_NODES: [(&str, &str); 4] = [
    ("Local Node 1", "http://localhost:8080/api"),
    ("Local Node 2", "http://localhost:8081/api"),
    ("Local Node 3", "http://localhost:8085/api"),
    ("Local Wallet", "http://localhost:8090/api"),
];

/// A candidate backend endpoint the client can direct requests to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    /// Display name
    pub name: String,
    /// Base address including scheme, host, port and path prefix (e.g. `/api`)
    pub url: String,
    /// Whether this node currently receives requests
    #[serde(default)]
    pub is_active: bool,
}

impl NodeDescriptor {
    /// Create an inactive descriptor
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            is_active: false,
        }
    }

    /// Mark this descriptor as active
    #[must_use]
    pub fn activated(mut self) -> Self {
        self.is_active = true;
        self
    }
}

/// Build the built-in descriptor set, first node active
pub fn default_nodes() -> Vec<NodeDescriptor> {
    DEFAULT_NODES
        .iter()
        .enumerate()
        .map(|(index, (name, url))| {
            let node = NodeDescriptor::new(*name, *url);
            if index == 0 { node.activated() } else { node }
        })
        .collect()
}
