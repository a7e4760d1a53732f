// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Application context
//!
//! The node registry and the client are built once at startup and shared by
//! every command, together with the cancellation token used for shutdown.

use std::sync::Arc;

use node_client::{
    ClientConfig, FileNodeStore, HttpTransport, NodeRegistry, NodeStore, ResilientClient,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{config::DashConfig, error::DashResult};

/// Shared application context with cancellation token support
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Console configuration
    config: DashConfig,
    /// Known nodes and the active one
    registry: Arc<NodeRegistry>,
    /// Client following the active node
    client: Arc<ResilientClient>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl AppContext {
    /// Create the context, persisting nodes under the configured storage directory
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: DashConfig, cancellation_token: CancellationToken) -> DashResult<Self> {
        let store = FileNodeStore::new(&config.storage_dir);
        info!(storage_dir = %store.dir().display(), "using file node store");
        Self::with_store(config, store, cancellation_token)
    }

    /// Create the context over an explicit node store
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn with_store(
        config: DashConfig,
        store: impl NodeStore + 'static,
        cancellation_token: CancellationToken,
    ) -> DashResult<Self> {
        let registry = Arc::new(
            NodeRegistry::new(store, HttpTransport::new()?)
                .with_probe_timeout(config.probe_timeout_seconds.value()),
        );
        let client = ResilientClient::new(Arc::clone(&registry))?.with_config(ClientConfig {
            request_timeout: config.request_timeout_seconds.value(),
        });

        Ok(Self {
            config,
            registry,
            client: Arc::new(client),
            cancellation_token,
        })
    }

    /// Console configuration
    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    /// The node registry
    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// The resilient client
    pub fn client(&self) -> &Arc<ResilientClient> {
        &self.client
    }
}
