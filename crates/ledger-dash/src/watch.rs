// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Dashboard watch loop
//!
//! Every tick starts a new poll without waiting for the previous one, the way
//! a dashboard refreshes on a timer. Polls may therefore finish out of order;
//! a [`SequencedSlot`] keeps only results newer, by start order, than the one
//! already shown.

use std::{sync::Arc, time::Duration};

use api_client::Transport;
use node_client::{ResilientClient, SequencedSlot};
use serde::Serialize;
use shared_types::{BlockList, Statistics, TransactionList};
use tokio::{
    sync::mpsc,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Blocks and transactions shown per refresh
pub const WATCH_LIST_LIMIT: usize = 5;

/// One refresh of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// Name of the node the poll started against
    pub node: String,
    /// Node-wide counters
    pub statistics: Statistics,
    /// Most recent blocks
    pub latest_blocks: BlockList,
    /// Most recent transactions
    pub latest_transactions: TransactionList,
    /// Number of pending transactions
    pub mempool_size: usize,
}

impl DashboardSnapshot {
    /// Poll every dataset of the dashboard concurrently
    pub async fn collect<T: Transport>(client: &ResilientClient<T>) -> Self {
        let node = client.registry().active().name;
        let (statistics, latest_blocks, latest_transactions, mempool) = tokio::join!(
            client.get_statistics(),
            client.get_latest_blocks(WATCH_LIST_LIMIT),
            client.get_latest_transactions(WATCH_LIST_LIMIT),
            client.get_mempool(),
        );

        Self {
            node,
            statistics,
            latest_blocks,
            latest_transactions,
            mempool_size: mempool.len(),
        }
    }
}

/// Refresh every `period` until `cancellation_token` is cancelled
///
/// `on_update` sees each snapshot that superseded the previous one. Returns
/// the number of snapshots applied.
pub async fn watch<T>(
    client: Arc<ResilientClient<T>>,
    period: Duration,
    cancellation_token: CancellationToken,
    mut on_update: impl FnMut(&DashboardSnapshot),
) -> u64
where
    T: Transport + 'static,
{
    let slot = SequencedSlot::new();
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut applied = 0;

    info!(?period, "watching dashboard");
    loop {
        tokio::select! {
            biased;
            () = cancellation_token.cancelled() => {
                info!(applied, "watch stopped");
                break;
            }
            _ = ticker.tick() => {
                let ticket = slot.begin();
                let client = Arc::clone(&client);
                let sender = sender.clone();
                tokio::spawn(async move {
                    let snapshot = DashboardSnapshot::collect(&client).await;
                    if sender.send((ticket, snapshot)).is_err() {
                        debug!(ticket = ticket.sequence(), "watch ended before poll finished");
                    }
                });
            }
            Some((ticket, snapshot)) = receiver.recv() => {
                if slot.apply(ticket, snapshot) {
                    applied += 1;
                    if let Some(snapshot) = slot.latest() {
                        on_update(&snapshot);
                    }
                }
            }
        }
    }
    applied
}
