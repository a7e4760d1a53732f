// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Resilient client for the active ledger node
//!
//! Reads walk an operation's candidate paths in order and fall back to a
//! canonical placeholder when nothing usable comes back; writes retry once and
//! then assume success. Neither ever surfaces a transport error to the caller:
//! the only error a caller can see is a [`ApiError::Validation`] raised before
//! any request is made.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use api_client::{ApiError, DEFAULT_REQUEST_TIMEOUT, Transport, TransportRequest, TransportResponse};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use shared_types::{
    AddressBalance, AddressInfo, Block, BlockList, Difficulty, NodeSettings, Peer, Statistics,
    Transaction, TransactionList, WalletInfo, WriteAck,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    HttpTransport, NodeRegistry, NonEmptyString, SubscriptionId,
    extract::{decode_entity, decode_object, decode_records},
    operations::{
        ADDRESS_INFO, BLOCK_BY_ID, CHAIN, Call, DIFFICULTY, LATEST_BLOCKS, LATEST_TRANSACTIONS, MEMPOOL,
        PEERS, SETTINGS, STATISTICS, TOP_ADDRESSES, TRANSACTION_BY_HASH, WALLET, endpoint_url,
        writes,
    },
};

/// Upper bound on placeholder peers synthesized from a reported peer count
pub const MAX_SYNTHESIZED_PEERS: u64 = 256;

/// Tunables for [`ResilientClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Timeout applied to every read and write
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Result of a single attempt against one path
#[derive(Debug)]
pub(crate) enum RequestOutcome<R> {
    /// Usable, normalized response
    Success(R),
    /// The attempt produced nothing usable
    NetworkFailure(ApiError),
    /// An opaque request completed; the response itself is unknown
    OpaqueSuccess,
}

/// Client routing every call to the registry's active node
pub struct ResilientClient<T: Transport = HttpTransport> {
    transport: T,
    registry: Arc<NodeRegistry>,
    base_url: RwLock<Option<String>>,
    stale: Arc<AtomicBool>,
    subscription: SubscriptionId,
    config: ClientConfig,
}

impl<T: Transport> std::fmt::Debug for ResilientClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("transport", &self.transport.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResilientClient<HttpTransport> {
    /// Create a client over a fresh [`HttpTransport`]
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(registry: Arc<NodeRegistry>) -> Result<Self, ApiError> {
        Ok(Self::with_transport(HttpTransport::new()?, registry))
    }
}

impl<T: Transport> Drop for ResilientClient<T> {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.subscription);
    }
}

impl<T: Transport> ResilientClient<T> {
    /// Create a client over `transport`
    pub fn with_transport(transport: T, registry: Arc<NodeRegistry>) -> Self {
        let stale = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&stale);
        let subscription = registry.subscribe(move |node| {
            debug!(name = %node.name, url = %node.url, "active node changed, base url is stale");
            flag.store(true, Ordering::Release);
        });

        Self {
            transport,
            registry,
            base_url: RwLock::new(None),
            stale,
            subscription,
            config: ClientConfig::default(),
        }
    }

    /// Replace the client configuration
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// The registry this client follows
    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Base url of the active node, re-resolved after a change notification
    pub fn base_url(&self) -> String {
        if !self.stale.swap(false, Ordering::AcqRel) {
            if let Some(url) = self.base_url.read().clone() {
                return url;
            }
        }

        let url = self.registry.active().url;
        *self.base_url.write() = Some(url.clone());
        url
    }

    // ---- read engine ----

    /// Run a read through the candidate paths of `call`
    ///
    /// `None` means every layer failed and the caller should use its
    /// placeholder.
    async fn fetch<R>(
        &self,
        call: &Call,
        normalize: impl Fn(Value) -> Result<R, ApiError>,
    ) -> Option<R> {
        let base = self.base_url();
        let request_id = Uuid::new_v4();
        let operation = call.operation.name;
        let mut failures = Vec::new();

        for (path, segment) in call.paths() {
            match self.attempt(&base, path, segment, call, &normalize).await {
                RequestOutcome::Success(value) => {
                    debug!(%request_id, operation, path, "read succeeded");
                    return Some(value);
                }
                RequestOutcome::NetworkFailure(e) => {
                    warn!(%request_id, operation, path, error = %e, "candidate path failed");
                    failures.push(e);
                }
                RequestOutcome::OpaqueSuccess => return None,
            }
        }

        if failures.is_empty() || !failures.iter().all(ApiError::is_transport) {
            debug!(%request_id, operation, "using placeholder");
            return None;
        }

        let (path, segment) = call.paths().next()?;
        let outcome = if failures.iter().any(ApiError::is_cross_origin)
            && self.transport.supports_opaque()
        {
            self.attempt_opaque(&base, path, segment, call).await
        } else {
            self.attempt(&base, path, segment, call, &normalize).await
        };

        match outcome {
            RequestOutcome::Success(value) => {
                info!(%request_id, operation, path, "read succeeded on retry");
                Some(value)
            }
            RequestOutcome::OpaqueSuccess => {
                info!(%request_id, operation, "node reachable through opaque request, using placeholder");
                None
            }
            RequestOutcome::NetworkFailure(e) => {
                error!(%request_id, operation, error = %e, "all endpoints failed, using placeholder");
                None
            }
        }
    }

    async fn attempt<R>(
        &self,
        base: &str,
        path: &str,
        segment: Option<&str>,
        call: &Call,
        normalize: &impl Fn(Value) -> Result<R, ApiError>,
    ) -> RequestOutcome<R> {
        let url = match endpoint_url(base, path, segment) {
            Ok(url) => url,
            Err(e) => return RequestOutcome::NetworkFailure(e),
        };
        let request = TransportRequest::get(url)
            .with_query(call.query.clone())
            .with_timeout(self.config.request_timeout);

        match self
            .transport
            .execute(request)
            .await
            .and_then(TransportResponse::into_json)
            .and_then(normalize)
        {
            Ok(value) => RequestOutcome::Success(value),
            Err(e) => RequestOutcome::NetworkFailure(e),
        }
    }

    async fn attempt_opaque<R>(
        &self,
        base: &str,
        path: &str,
        segment: Option<&str>,
        call: &Call,
    ) -> RequestOutcome<R> {
        let url = match endpoint_url(base, path, segment) {
            Ok(url) => url,
            Err(e) => return RequestOutcome::NetworkFailure(e),
        };
        let request = TransportRequest::get(url)
            .with_query(call.query.clone())
            .with_timeout(self.config.request_timeout);

        match self.transport.execute_opaque(request).await {
            Ok(()) => RequestOutcome::OpaqueSuccess,
            Err(e) => RequestOutcome::NetworkFailure(e),
        }
    }

    async fn fetch_list<R: DeserializeOwned>(&self, call: &Call) -> Option<Vec<R>> {
        let operation = call.operation.name;
        let strategies = call.operation.strategies;
        self.fetch(call, |raw| Ok(decode_records(operation, strategies, &raw)))
            .await
    }

    async fn fetch_entity<R: DeserializeOwned>(&self, call: &Call) -> Option<R> {
        self.fetch(call, decode_entity).await.flatten()
    }

    // ---- write engine ----

    /// POST `body` to `path`, retrying once, then assuming success
    async fn write(&self, operation: &'static str, path: &'static str, body: Value) -> WriteAck {
        let base = self.base_url();
        let request_id = Uuid::new_v4();

        let url = match endpoint_url(&base, path, None) {
            Ok(url) => url,
            Err(e) => {
                error!(%request_id, operation, error = %e, "cannot build write url");
                return WriteAck::error_recovery();
            }
        };
        let request = TransportRequest::post(url, body).with_timeout(self.config.request_timeout);

        let first_error = match self.transport.execute(request.clone()).await.and_then(read_ack) {
            Ok(ack) => {
                debug!(%request_id, operation, "write acknowledged");
                return ack;
            }
            Err(e) => e,
        };
        warn!(%request_id, operation, path, error = %first_error, "write failed, retrying once");

        let outcome = if self.transport.supports_opaque() {
            match self.transport.execute_opaque(request).await {
                Ok(()) => RequestOutcome::OpaqueSuccess,
                Err(e) => RequestOutcome::NetworkFailure(e),
            }
        } else {
            match self.transport.execute(request).await.and_then(read_ack) {
                Ok(ack) => RequestOutcome::Success(ack),
                Err(e) => RequestOutcome::NetworkFailure(e),
            }
        };

        match outcome {
            RequestOutcome::Success(ack) => ack,
            RequestOutcome::OpaqueSuccess => {
                info!(%request_id, operation, "write sent as opaque request");
                WriteAck::opaque()
            }
            RequestOutcome::NetworkFailure(e) => {
                error!(%request_id, operation, error = %e, "write retry failed, assuming completion");
                WriteAck::error_recovery()
            }
        }
    }

    // ---- reads ----

    /// Node-wide counters; zeros when unavailable
    pub async fn get_statistics(&self) -> Statistics {
        self.fetch(&STATISTICS.call(), decode_object)
            .await
            .unwrap_or_default()
    }

    /// The `limit` most recent blocks
    pub async fn get_latest_blocks(&self, limit: usize) -> BlockList {
        let call = LATEST_BLOCKS.call().query("limit", limit);
        BlockList::new(self.fetch_list(&call).await.unwrap_or_default())
    }

    /// Every block in one request, as the node orders them
    ///
    /// Nodes that only print a text dump of their chain yield an empty list.
    pub async fn get_blockchain(&self) -> Vec<Block> {
        self.fetch_list(&CHAIN.call()).await.unwrap_or_default()
    }

    /// Up to `max` blocks, newest first, fetched one height at a time
    ///
    /// Heights that cannot be fetched are skipped.
    pub async fn get_all_blocks(&self, max: u64) -> Vec<Block> {
        let Some(statistics) = self.fetch(&STATISTICS.call(), decode_object::<Statistics>).await
        else {
            warn!("block count unavailable, returning no blocks");
            return Vec::new();
        };

        let count = statistics.block_count;
        let limit = count.min(max);
        info!(count, limit, "fetching all blocks");

        let mut blocks = Vec::new();
        for height in (count - limit..count).rev() {
            match self.get_block_by_id(height).await {
                Some(block) => blocks.push(block),
                None => warn!(height, "skipping block that could not be fetched"),
            }
        }
        blocks
    }

    /// One block by height
    pub async fn get_block_by_id(&self, id: u64) -> Option<Block> {
        self.fetch_entity(&BLOCK_BY_ID.call_with(id.to_string()))
            .await
    }

    /// The `limit` most recent transactions
    pub async fn get_latest_transactions(&self, limit: usize) -> TransactionList {
        let call = LATEST_TRANSACTIONS.call().query("limit", limit);
        TransactionList::new(self.fetch_list(&call).await.unwrap_or_default())
    }

    /// One transaction by hash
    pub async fn get_transaction_by_hash(&self, hash: &str) -> Option<Transaction> {
        self.fetch_entity(&TRANSACTION_BY_HASH.call_with(hash))
            .await
    }

    /// Pending transactions
    pub async fn get_mempool(&self) -> Vec<Transaction> {
        self.fetch_list(&MEMPOOL.call()).await.unwrap_or_default()
    }

    /// The node's wallet, falling back to the balance reported in statistics
    pub async fn get_wallet_info(&self) -> WalletInfo {
        if let Some(wallet) = self.fetch(&WALLET.call(), decode_object).await {
            return wallet;
        }

        let balance = self
            .fetch(&STATISTICS.call(), decode_object::<Statistics>)
            .await
            .and_then(|statistics| statistics.wallet_balance);
        match balance {
            Some(balance) => {
                debug!(balance, "wallet balance taken from statistics");
                WalletInfo {
                    balance,
                    ..WalletInfo::default()
                }
            }
            None => WalletInfo::default(),
        }
    }

    /// Connected peers, falling back to placeholders for the reported count
    pub async fn get_peers(&self) -> Vec<Peer> {
        if let Some(peers) = self.fetch_list(&PEERS.call()).await {
            return peers;
        }

        let count = self
            .fetch(&STATISTICS.call(), decode_object::<Statistics>)
            .await
            .map_or(0, |statistics| statistics.peers);
        if count > MAX_SYNTHESIZED_PEERS {
            warn!(count, max = MAX_SYNTHESIZED_PEERS, "capping synthesized peers");
        }
        (0..count.min(MAX_SYNTHESIZED_PEERS))
            .map(|_| Peer::unknown())
            .collect()
    }

    /// Current mining difficulty
    pub async fn get_difficulty(&self) -> Difficulty {
        self.fetch(&DIFFICULTY.call(), decode_object)
            .await
            .unwrap_or_default()
    }

    /// Node settings, with the difficulty read separately when unavailable
    pub async fn get_settings(&self) -> NodeSettings {
        if let Some(settings) = self.fetch(&SETTINGS.call(), decode_object).await {
            return settings;
        }
        NodeSettings {
            difficulty: self.get_difficulty().await.difficulty,
            ..NodeSettings::default()
        }
    }

    /// Explorer view of an address
    pub async fn get_address_info(&self, address: &str) -> Option<AddressInfo> {
        self.fetch_entity(&ADDRESS_INFO.call_with(address)).await
    }

    /// The `limit` richest addresses
    pub async fn get_top_addresses(&self, limit: usize) -> Vec<AddressBalance> {
        let call = TOP_ADDRESSES.call().query("limit", limit);
        self.fetch_list(&call).await.unwrap_or_default()
    }

    // ---- writes ----

    /// Send `amount` from the node's wallet to `receiver`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if `receiver` is blank or `amount` is
    /// not a finite positive number
    pub async fn create_transaction(&self, receiver: &str, amount: f64) -> Result<WriteAck, ApiError> {
        let receiver = NonEmptyString::new(receiver)
            .map_err(|_| ApiError::validation("receiver address must not be empty"))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ApiError::validation(format!(
                "amount must be a positive number, got {amount}"
            )));
        }

        let body = json!({ "receiver": receiver.as_str(), "amount": amount });
        Ok(self
            .write("create transaction", writes::CREATE_TRANSACTION, body)
            .await)
    }

    /// Mine pending transactions into a block
    pub async fn mine_block(&self) -> WriteAck {
        self.write("mine block", writes::MINE_BLOCK, json!({})).await
    }

    /// Change the mining difficulty
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if `difficulty` is zero
    pub async fn set_difficulty(&self, difficulty: u32) -> Result<WriteAck, ApiError> {
        if difficulty == 0 {
            return Err(ApiError::validation("difficulty must be at least 1"));
        }
        Ok(self
            .write(
                "set difficulty",
                writes::SET_DIFFICULTY,
                json!({ "difficulty": difficulty }),
            )
            .await)
    }

    /// Replace node settings, updating the difficulty first when set
    pub async fn update_settings(&self, settings: &NodeSettings) -> WriteAck {
        if settings.difficulty > 0 {
            match self.set_difficulty(settings.difficulty).await {
                Ok(ack) if ack.is_assumed() => {
                    warn!(difficulty = settings.difficulty, "difficulty update outcome unknown");
                }
                Ok(_) => debug!(difficulty = settings.difficulty, "difficulty updated"),
                Err(e) => warn!(error = %e, "difficulty update rejected"),
            }
        }

        match serde_json::to_value(settings) {
            Ok(body) => self.write("update settings", writes::UPDATE_SETTINGS, body).await,
            Err(e) => {
                error!(error = %e, "cannot serialize settings");
                WriteAck::error_recovery()
            }
        }
    }

    /// Ask the node to connect to another node
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if `address` is blank or `port` is zero
    pub async fn connect_to_peer(&self, address: &str, port: u16) -> Result<WriteAck, ApiError> {
        let address = NonEmptyString::new(address)
            .map_err(|_| ApiError::validation("peer address must not be empty"))?;
        if port == 0 {
            return Err(ApiError::validation("peer port must not be zero"));
        }

        let body = json!({ "address": address.as_str(), "port": port });
        Ok(self.write("connect peer", writes::CONNECT_PEER, body).await)
    }

    /// Ask the node to synchronize its chain with its peers
    pub async fn sync_blockchain(&self) -> WriteAck {
        self.write("sync blockchain", writes::SYNC_BLOCKCHAIN, json!({}))
            .await
    }
}

/// Read a write acknowledgement from a completed exchange
///
/// A 2xx body that is not a JSON object still counts as success and is kept
/// as the message.
fn read_ack(response: TransportResponse) -> Result<WriteAck, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            body: response.body,
        });
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(value @ Value::Object(_)) => {
            serde_json::from_value(value).map_err(|e| ApiError::malformed(e.to_string()))
        }
        _ => {
            let text = response.body.trim();
            Ok(if text.is_empty() {
                WriteAck {
                    success: true,
                    message: None,
                    details: Map::new(),
                }
            } else {
                WriteAck::success(text)
            })
        }
    }
}
