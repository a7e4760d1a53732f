// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Ledger Dashboard Console
//!
//! This crate provides the operator console for a set of ledger nodes. It
//! stands where a dashboard's presentation layer would: it manages the node
//! registry, prints datasets fetched through the resilient client and keeps a
//! refreshing view of the active node.
//!
//! # Module Structure
//!
//! - [`config`]: Console configuration with hierarchical loading
//! - [`error`]: Error types for configuration, input and registry failures
//! - [`context`]: Shared registry, client and cancellation token
//! - [`commands`]: Command line definition and dispatch
//! - [`watch`]: Polling loop with start-ordered results
//! - [`shutdown`]: Signal handling for coordinated shutdown

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod shutdown;
pub mod watch;

pub use commands::{Cli, Command, NodeCommand, run};
pub use config::{DashConfig, Environment, TimeoutSeconds};
pub use context::AppContext;
pub use error::{DashError, DashResult};
pub use watch::{DashboardSnapshot, watch};
