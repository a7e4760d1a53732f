// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Ledger node test fixtures
//!
//! Provides registries pointed at mock servers, canned node responses and a
//! scripted transport for behaviour a real HTTP stack cannot produce, such as
//! cross-origin failures and opaque requests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use api_client::{ApiError, Transport, TransportRequest, TransportResponse};
use node_client::{
    ClientConfig, HttpTransport, MemoryNodeStore, NodeRegistry, ResilientClient, STORAGE_KEY,
};
use serde_json::{Value, json};
use shared_types::NodeDescriptor;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Base url of a node that refuses connections
pub const REFUSED_NODE: &str = "http://127.0.0.1:9/api";

/// Short timeout so failure paths finish quickly
pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Registry holding one node per url, the first one active
pub fn registry_for(urls: &[&str]) -> Arc<NodeRegistry> {
    let nodes: Vec<NodeDescriptor> = urls
        .iter()
        .enumerate()
        .map(|(index, url)| {
            let node = NodeDescriptor::new(format!("Test Node {}", index + 1), *url);
            if index == 0 { node.activated() } else { node }
        })
        .collect();
    let store = MemoryNodeStore::with_entry(STORAGE_KEY, serde_json::to_string(&nodes).unwrap());
    Arc::new(NodeRegistry::new(store, HttpTransport::new().unwrap()))
}

/// Base url of the mock server, with the `/api` prefix
pub fn api_url(mock_server: &MockServer) -> String {
    format!("{}/api", mock_server.uri())
}

/// Client over HTTP talking to `mock_server`
pub fn http_client(mock_server: &MockServer) -> ResilientClient {
    http_client_for(&api_url(mock_server))
}

/// Client over HTTP talking to `url`
pub fn http_client_for(url: &str) -> ResilientClient {
    ResilientClient::new(registry_for(&[url]))
        .unwrap()
        .with_config(ClientConfig {
            request_timeout: TEST_TIMEOUT,
        })
}

/// Client over a scripted transport
pub fn scripted_client(transport: ScriptedTransport) -> ResilientClient<ScriptedTransport> {
    ResilientClient::with_transport(transport, registry_for(&["http://node.test/api"]))
}

/// Canned node responses
#[derive(Debug)]
pub struct LedgerFixture;

impl LedgerFixture {
    pub fn statistics(block_count: u64, peers: u64) -> Value {
        json!({
            "blockCount": block_count,
            "transactionCount": 8,
            "uniqueAddresses": 4,
            "totalSupply": 400.0,
            "currentReward": 50.0,
            "halving": {"halvingsOccurred": 0, "daysUntilNextHalving": 17},
            "difficulty": 4,
            "peers": peers
        })
    }

    pub fn block(height: u64) -> Value {
        json!({
            "blockNumber": height,
            "hash": format!("{height:064x}"),
            "previousHash": format!("{:064x}", height.saturating_sub(1)),
            "timestamp": 1_700_000_000 + height,
            "nonce": 42,
            "difficulty": 4,
            "transactionCount": 1
        })
    }

    pub fn transaction(hash: &str) -> Value {
        json!({
            "hash": hash,
            "sender": "wallet_addr_sender",
            "receiver": "wallet_addr_receiver",
            "amount": 10.0,
            "status": "Pending"
        })
    }

    /// Answer `GET <route>` with `status` and `body`
    pub async fn mount_get(mock_server: &MockServer, route: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(mock_server)
            .await;
    }

    /// Answer `GET <route>` with a 404
    pub async fn mount_missing(mock_server: &MockServer, route: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(mock_server)
            .await;
    }
}

#[derive(Debug, Default)]
struct Script {
    responses: VecDeque<Result<TransportResponse, ApiError>>,
    opaque_results: VecDeque<Result<(), ApiError>>,
    requests: Vec<TransportRequest>,
    opaque_requests: Vec<TransportRequest>,
}

/// Transport replaying queued results and recording every request
///
/// When the queue runs dry every further request fails with a transport
/// error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
    opaque: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that behaves like a browser: it supports opaque requests
    pub fn browser() -> Self {
        Self {
            opaque: true,
            ..Self::default()
        }
    }

    pub fn respond(self, status: u16, body: Value) -> Self {
        self.script
            .lock()
            .unwrap()
            .responses
            .push_back(Ok(TransportResponse::new(status, body.to_string())));
        self
    }

    pub fn fail(self, error: ApiError) -> Self {
        self.script.lock().unwrap().responses.push_back(Err(error));
        self
    }

    pub fn fail_times(mut self, error: &ApiError, times: usize) -> Self {
        for _ in 0..times {
            self = self.fail(error.clone());
        }
        self
    }

    pub fn opaque_result(self, result: Result<(), ApiError>) -> Self {
        self.script.lock().unwrap().opaque_results.push_back(result);
        self
    }

    /// Urls of every regular request so far
    pub fn requested_urls(&self) -> Vec<String> {
        self.script
            .lock()
            .unwrap()
            .requests
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn opaque_requests(&self) -> Vec<TransportRequest> {
        self.script.lock().unwrap().opaque_requests.clone()
    }
}

impl Transport for ScriptedTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ApiError> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request);
        script
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::transport("connection refused")))
    }

    async fn execute_opaque(&self, request: TransportRequest) -> Result<(), ApiError> {
        let mut script = self.script.lock().unwrap();
        script.opaque_requests.push(request);
        script
            .opaque_results
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::transport("Failed to fetch")))
    }

    fn supports_opaque(&self) -> bool {
        self.opaque
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
