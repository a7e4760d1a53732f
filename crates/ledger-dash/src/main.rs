// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Ledger Dashboard Console
//!
//! Operator console for a set of ledger nodes.

use anyhow::Result;
use clap::Parser;
use ledger_dash::{AppContext, Cli, DashConfig, run, shutdown::shutdown_signal_handler};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = DashConfig::from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // stdout carries the command output
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(environment = %config.environment, "starting ledger-dash");

    let cancellation_token = CancellationToken::new();
    let context = AppContext::new(config, cancellation_token.clone())?;
    tokio::spawn(shutdown_signal_handler(cancellation_token.clone()));

    let output = run(cli.command, &context).await;
    cancellation_token.cancel();

    let output = output?;
    if !output.is_null() {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
