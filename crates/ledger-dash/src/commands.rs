// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Command line surface of the console
//!
//! Every command resolves to a JSON document printed by `main`; the watch
//! command prints as it goes and resolves to `null`.

use std::{sync::Arc, time::Duration};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use shared_types::NodeSettings;
use tracing::{error, info};
use url::Url;

use crate::{
    context::AppContext,
    error::{DashError, DashResult},
    watch::watch,
};

/// Operator console for ledger nodes
#[derive(Debug, Parser)]
#[command(name = "ledger-dash", version, about, long_about = None)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Console commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage known nodes
    #[command(subcommand)]
    Nodes(NodeCommand),
    /// Show node-wide statistics
    Stats,
    /// Show the most recent blocks
    Blocks {
        /// Number of blocks
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// Show the whole chain in one request
    Chain,
    /// Fetch every block, newest first
    AllBlocks {
        /// Upper bound on the number of blocks
        #[arg(short, long, default_value_t = 100)]
        max: u64,
    },
    /// Show one block
    Block {
        /// Block height
        id: u64,
    },
    /// Show the most recent transactions
    Txs {
        /// Number of transactions
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Show one transaction
    Tx {
        /// Transaction hash
        hash: String,
    },
    /// Show pending transactions
    Mempool,
    /// Show the node's wallet
    Wallet,
    /// Show connected peers
    Peers,
    /// Connect the node to another node
    Connect {
        /// Peer host
        address: String,
        /// Peer port
        port: u16,
    },
    /// Show or change the mining difficulty
    Difficulty {
        /// New difficulty
        #[arg(long)]
        set: Option<u32>,
    },
    /// Send coins from the node's wallet
    Send {
        /// Receiving address
        receiver: String,
        /// Amount to send
        amount: f64,
    },
    /// Mine pending transactions
    Mine,
    /// Synchronize the chain with peers
    Sync,
    /// Show or change node settings
    Settings(SettingsArgs),
    /// Show an address
    Address {
        /// The address
        address: String,
    },
    /// Show the richest addresses
    TopAddresses {
        /// Number of addresses
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// Search blocks, transactions and addresses
    Search {
        /// Block height, transaction hash or address
        query: String,
    },
    /// Refresh the dashboard until interrupted
    Watch {
        /// Seconds between refreshes, defaults to the configured interval
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
}

/// Node management commands
#[derive(Debug, Subcommand)]
pub enum NodeCommand {
    /// List known nodes
    List,
    /// Add a node
    Add {
        /// Display name
        name: String,
        /// Base url including the api prefix
        url: String,
    },
    /// Change a node's name and url
    Edit {
        /// Position in the list
        index: usize,
        /// Display name
        name: String,
        /// Base url including the api prefix
        url: String,
    },
    /// Remove a node
    Remove {
        /// Position in the list
        index: usize,
    },
    /// Make a node the active one
    Activate {
        /// Position in the list
        index: usize,
    },
    /// Restore the built-in nodes
    Reset,
    /// Check whether a node answers
    Probe {
        /// Url to probe, defaults to every known node
        url: Option<String>,
    },
}

/// Settings changes; without any flag the current settings are shown
#[derive(Debug, Default, Args)]
pub struct SettingsArgs {
    /// Mining difficulty
    #[arg(long)]
    pub difficulty: Option<u32>,
    /// `full` or `wallet`
    #[arg(long)]
    pub node_type: Option<String>,
    /// Mine automatically
    #[arg(long)]
    pub auto_mine: Option<bool>,
    /// Seconds between automatic mining rounds
    #[arg(long)]
    pub mining_interval: Option<u64>,
    /// Port the node's api listens on
    #[arg(long)]
    pub api_port: Option<u16>,
}

impl SettingsArgs {
    fn is_empty(&self) -> bool {
        self.difficulty.is_none()
            && self.node_type.is_none()
            && self.auto_mine.is_none()
            && self.mining_interval.is_none()
            && self.api_port.is_none()
    }

    fn apply(self, mut settings: NodeSettings) -> NodeSettings {
        if let Some(difficulty) = self.difficulty {
            settings.difficulty = difficulty;
        }
        if let Some(node_type) = self.node_type {
            settings.node_type = node_type;
        }
        if let Some(auto_mine) = self.auto_mine {
            settings.auto_mine = auto_mine;
        }
        if let Some(mining_interval) = self.mining_interval {
            settings.mining_interval = mining_interval;
        }
        if let Some(api_port) = self.api_port {
            settings.api_port = api_port;
        }
        settings
    }
}

/// Run `command` and return the document to print
///
/// # Errors
///
/// Returns an error for invalid input or a refused registry change; node
/// reads and writes themselves never fail
pub async fn run(command: Command, context: &AppContext) -> DashResult<Value> {
    let client = context.client();

    match command {
        Command::Nodes(command) => run_nodes(command, context).await,
        Command::Stats => render(client.get_statistics().await),
        Command::Blocks { limit } => render(client.get_latest_blocks(limit).await),
        Command::Chain => render(client.get_blockchain().await),
        Command::AllBlocks { max } => render(client.get_all_blocks(max).await),
        Command::Block { id } => render(client.get_block_by_id(id).await),
        Command::Txs { limit } => render(client.get_latest_transactions(limit).await),
        Command::Tx { hash } => render(client.get_transaction_by_hash(&hash).await),
        Command::Mempool => render(client.get_mempool().await),
        Command::Wallet => render(client.get_wallet_info().await),
        Command::Peers => render(client.get_peers().await),
        Command::Connect { address, port } => {
            render(client.connect_to_peer(&address, port).await?)
        }
        Command::Difficulty { set: Some(value) } => render(client.set_difficulty(value).await?),
        Command::Difficulty { set: None } => render(client.get_difficulty().await),
        Command::Send { receiver, amount } => {
            render(client.create_transaction(&receiver, amount).await?)
        }
        Command::Mine => render(client.mine_block().await),
        Command::Sync => render(client.sync_blockchain().await),
        Command::Settings(args) if args.is_empty() => render(client.get_settings().await),
        Command::Settings(args) => {
            let settings = args.apply(client.get_settings().await);
            render(client.update_settings(&settings).await)
        }
        Command::Address { address } => render(client.get_address_info(&address).await),
        Command::TopAddresses { limit } => render(client.get_top_addresses(limit).await),
        Command::Search { query } => render(client.search(&query).await),
        Command::Watch { interval: Some(0) } => Err(DashError::Config {
            message: "watch interval must be greater than 0".to_string(),
        }),
        Command::Watch { interval } => {
            let period = interval.map_or_else(|| context.config().poll_interval(), Duration::from_secs);
            let applied = watch(
                Arc::clone(client),
                period,
                context.cancellation_token.clone(),
                |snapshot| match serde_json::to_string(snapshot) {
                    Ok(line) => println!("{line}"),
                    Err(e) => error!(error = %e, "cannot render snapshot"),
                },
            )
            .await;
            info!(applied, "watch finished");
            Ok(Value::Null)
        }
    }
}

async fn run_nodes(command: NodeCommand, context: &AppContext) -> DashResult<Value> {
    let registry = context.registry();

    match command {
        NodeCommand::List => {
            let nodes = registry
                .list()
                .into_iter()
                .enumerate()
                .map(|(index, node)| {
                    json!({
                        "index": index,
                        "name": node.name,
                        "url": node.url,
                        "isActive": node.is_active
                    })
                })
                .collect();
            Ok(Value::Array(nodes))
        }
        NodeCommand::Add { name, url } => {
            let url = validate_node_url(&url)?;
            if !registry.add(&name, &url) {
                return Err(DashError::Rejected {
                    message: format!("a node with url {url} already exists or the name is empty"),
                });
            }
            render(registry.list())
        }
        NodeCommand::Edit { index, name, url } => {
            check_index(context, index)?;
            let url = validate_node_url(&url)?;
            if !registry.edit(index, &name, &url) {
                return Err(DashError::Rejected {
                    message: format!("another node already uses {url} or the name is empty"),
                });
            }
            render(registry.list())
        }
        NodeCommand::Remove { index } => {
            check_index(context, index)?;
            if !registry.remove(index) {
                return Err(DashError::Rejected {
                    message: "the last node cannot be removed".to_string(),
                });
            }
            render(registry.list())
        }
        NodeCommand::Activate { index } => {
            check_index(context, index)?;
            registry.activate(index);
            render(registry.active())
        }
        NodeCommand::Reset => {
            registry.reset_to_defaults();
            render(registry.list())
        }
        NodeCommand::Probe { url: Some(url) } => render(registry.probe_detailed(&url).await),
        NodeCommand::Probe { url: None } => {
            let mut results = Vec::new();
            for node in registry.list() {
                results.push(registry.probe_detailed(&node.url).await);
            }
            render(results)
        }
    }
}

fn check_index(context: &AppContext, index: usize) -> DashResult<()> {
    let len = context.registry().len();
    if index >= len {
        return Err(DashError::NodeIndex { index, len });
    }
    Ok(())
}

/// Accept only absolute http(s) urls, without a trailing slash
fn validate_node_url(raw: &str) -> DashResult<String> {
    let invalid = |reason: String| DashError::InvalidNodeUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

fn render(value: impl Serialize) -> DashResult<Value> {
    Ok(serde_json::to_value(value)?)
}
