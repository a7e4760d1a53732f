// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Resilient access to ledger nodes
//!
//! This crate tracks the ledger nodes an operator can talk to and routes
//! every dashboard request to the active one, absorbing the differences and
//! failures of individual backends.
//!
//! # Architecture
//!
//! - **Node Registry**: [`registry::NodeRegistry`] - known nodes, the active one,
//!   persistence through a [`store::NodeStore`] and change notifications
//! - **Transport**: [`http::HttpTransport`] - reqwest implementation of the
//!   `api_client::Transport` seam
//! - **Operation Table**: [`operations`] - candidate paths per logical operation
//! - **Normalization**: [`extract`] - declarative extraction strategies
//! - **Resilient Client**: [`client::ResilientClient`] - fallback chains,
//!   placeholders and write acknowledgements
//! - **Search**: [`search`] - query classification for the explorer
//! - **Polling**: [`poll::SequencedSlot`] - start-ordered results for overlapping polls
//! - **Validation Utilities**: [`non_empty_string::NonEmptyString`] - ensures non-empty string constraints
//!
//! # Features
//!
//! - **Candidate Fallback**: each read tries its paths in order before giving up
//! - **Never Hard-Fails**: reads resolve to canonical placeholders, writes to an
//!   acknowledgement
//! - **Lazy Re-resolution**: the client re-reads the active node only after the
//!   registry reports a change
//! - **Testing Support**: wiremock-backed integration tests and in-memory storage

pub mod client;
pub mod extract;
pub mod http;
pub mod non_empty_string;
pub mod operations;
pub mod poll;
pub mod registry;
pub mod search;
pub mod store;

pub use client::{ClientConfig, MAX_SYNTHESIZED_PEERS, ResilientClient};
pub use extract::Extraction;
pub use http::HttpTransport;
pub use non_empty_string::NonEmptyString;
pub use operations::{Call, LogicalOperation};
pub use poll::{PollTicket, SequencedSlot};
pub use registry::{NodeRegistry, Observer, STORAGE_KEY, SubscriptionId};
pub use search::{SearchTarget, plan as plan_search};
pub use store::{FileNodeStore, MemoryNodeStore, NodeStore, StoreError};
