// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Canonical ledger shapes
//!
//! These are the caller-facing structures read operations always resolve to,
//! whatever envelope the backend actually returned. Decoding is tolerant:
//! missing fields take their defaults and unknown fields on entity records are
//! kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Difficulty reported when the backend cannot be asked
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Node-wide counters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StatisticsRecord")]
pub struct Statistics {
    /// Number of blocks in the chain
    pub block_count: u64,
    /// Number of confirmed transactions
    pub transaction_count: u64,
    /// Number of addresses holding a balance
    pub unique_addresses: u64,
    /// Coins in circulation
    pub total_supply: f64,
    /// Current block reward
    pub current_reward: f64,
    /// Reward halving schedule
    pub halving: Halving,
    /// Current mining difficulty
    pub difficulty: u32,
    /// Number of connected peers
    pub peers: u64,
    /// Balance of the node's own wallet, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_balance: Option<f64>,
}

/// Statistics as nodes report them: some send `blockHeight` instead of, or
/// next to, `blockCount`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StatisticsRecord {
    block_count: Option<u64>,
    block_height: Option<u64>,
    transaction_count: u64,
    unique_addresses: u64,
    total_supply: f64,
    current_reward: f64,
    halving: Halving,
    difficulty: u32,
    peers: u64,
    wallet_balance: Option<f64>,
}

impl From<StatisticsRecord> for Statistics {
    fn from(record: StatisticsRecord) -> Self {
        // a zero count defers to the height
        let block_count = record
            .block_count
            .filter(|count| *count != 0)
            .or(record.block_height)
            .unwrap_or_default();

        Self {
            block_count,
            transaction_count: record.transaction_count,
            unique_addresses: record.unique_addresses,
            total_supply: record.total_supply,
            current_reward: record.current_reward,
            halving: record.halving,
            difficulty: record.difficulty,
            peers: record.peers,
            wallet_balance: record.wallet_balance,
        }
    }
}

/// Reward halving schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Halving {
    /// Halvings so far
    pub halvings_occurred: u32,
    /// Days left until the next halving
    pub days_until_next_halving: u32,
}

/// A ledger transaction record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    /// Transaction hash
    pub hash: String,
    /// Sending address
    pub sender: String,
    /// Receiving address
    pub receiver: String,
    /// Amount transferred
    pub amount: f64,
    /// `Pending` or `Confirmed`, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Containing block, when confirmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A ledger block record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Block {
    /// Height of the block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Block hash
    pub hash: String,
    /// Hash of the parent block
    pub previous_hash: String,
    /// Unix timestamp in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Proof-of-work nonce
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// Difficulty the block was mined at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,
    /// Number of transactions; listings omit the transactions themselves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_count: Option<u64>,
    /// Contained transactions, when the backend includes them
    pub transactions: Vec<Transaction>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Latest blocks listing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockList {
    /// Number of blocks in `blocks`
    pub count: usize,
    /// Blocks, newest first
    pub blocks: Vec<Block>,
}

impl BlockList {
    /// Wrap a block sequence, deriving `count` from it
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            count: blocks.len(),
            blocks,
        }
    }
}

/// Latest transactions listing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionList {
    /// Number of transactions in `transactions`
    pub count: usize,
    /// Transactions, newest first
    pub transactions: Vec<Transaction>,
}

impl TransactionList {
    /// Wrap a transaction sequence, deriving `count` from it
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            count: transactions.len(),
            transactions,
        }
    }
}

/// The node's own wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletInfo {
    /// Wallet address
    pub address: String,
    /// Spendable balance
    pub balance: f64,
}

impl Default for WalletInfo {
    fn default() -> Self {
        Self {
            address: "Your Wallet".to_string(),
            balance: 0.0,
        }
    }
}

/// A connected peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Peer {
    /// Peer identifier
    pub id: String,
    /// Host address
    pub address: String,
    /// Port, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// `full` or `wallet`, when reported
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
}

impl Peer {
    /// Placeholder for a peer known only by count
    pub fn unknown() -> Self {
        Self::default()
    }
}

impl Default for Peer {
    fn default() -> Self {
        Self {
            id: "Unknown".to_string(),
            address: "Unknown".to_string(),
            port: None,
            node_type: None,
        }
    }
}

/// Mining difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    /// Leading-zero target
    pub difficulty: u32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

/// Node settings as shown and edited by the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeSettings {
    /// Mining difficulty
    pub difficulty: u32,
    /// `full` or `wallet`
    pub node_type: String,
    /// Whether the node mines on its own
    pub auto_mine: bool,
    /// Seconds between automatic mining rounds
    pub mining_interval: u64,
    /// Port the node's API listens on
    pub api_port: u16,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            node_type: "full".to_string(),
            auto_mine: false,
            mining_interval: 60,
            api_port: 8080,
        }
    }
}

/// Explorer view of an address
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressInfo {
    /// The address
    pub address: String,
    /// Its balance
    pub balance: f64,
    /// Transactions touching the address, when the backend includes them
    pub transactions: Vec<Transaction>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of the top addresses ranking
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressBalance {
    /// The address
    pub address: String,
    /// Its balance
    pub balance: f64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn statistics_accepts_block_height_alias() {
        let stats: Statistics =
            serde_json::from_value(json!({"blockHeight": 12, "peers": 2})).unwrap();
        assert_eq!(stats.block_count, 12);
        assert_eq!(stats.peers, 2);
        assert_eq!(stats.halving, Halving::default());
        assert!(stats.wallet_balance.is_none());
    }

    #[test]
    fn statistics_with_count_and_height() {
        let stats: Statistics =
            serde_json::from_value(json!({"blockCount": 9, "blockHeight": 8})).unwrap();
        assert_eq!(stats.block_count, 9);

        let stats: Statistics =
            serde_json::from_value(json!({"blockCount": 0, "blockHeight": 8})).unwrap();
        assert_eq!(stats.block_count, 8);

        let stats: Statistics = serde_json::from_value(json!({})).unwrap();
        assert_eq!(stats, Statistics::default());
    }

    #[test]
    fn block_keeps_unknown_fields() {
        let block: Block = serde_json::from_value(json!({
            "blockNumber": 3,
            "hash": "abc",
            "miner": "wallet_addr_1",
            "transactions": [{"hash": "t1", "amount": 1.5}]
        }))
        .unwrap();

        assert_eq!(block.block_number, Some(3));
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.extra.get("miner"), Some(&json!("wallet_addr_1")));
    }

    #[test]
    fn placeholders() {
        assert_eq!(Difficulty::default().difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(WalletInfo::default().address, "Your Wallet");
        assert_eq!(NodeSettings::default().node_type, "full");
        assert_eq!(Peer::unknown().id, "Unknown");

        let empty = serde_json::to_value(BlockList::default()).unwrap();
        assert_eq!(empty, json!({"count": 0, "blocks": []}));
    }

    #[test]
    fn peer_type_field() {
        let peer: Peer =
            serde_json::from_value(json!({"id": "p1", "address": "10.0.0.2", "port": 9000, "type": "full"}))
                .unwrap();
        assert_eq!(peer.node_type.as_deref(), Some("full"));
        assert_eq!(peer.port, Some(9000));
    }
}
