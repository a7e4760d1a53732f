// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the ledger dashboard
//!
//! This crate provides the types that are shared across the crates in the
//! workspace, avoiding circular dependencies: node descriptors, the canonical
//! ledger shapes every read operation resolves to, the write acknowledgement
//! envelope and search results.

pub mod ack;
pub mod ledger;
pub mod node;
pub mod search;

pub use ack::{ERROR_RECOVERY_QUALIFIER, OPAQUE_QUALIFIER, WriteAck};
pub use ledger::{
    AddressBalance, AddressInfo, Block, BlockList, DEFAULT_DIFFICULTY, Difficulty, Halving,
    NodeSettings, Peer, Statistics, Transaction, TransactionList, WalletInfo,
};
pub use node::{DEFAULT_NODES, NodeDescriptor, default_nodes};
pub use search::SearchResult;
