// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Signal handling for coordinated shutdown

use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Handle shutdown signals and trigger coordinated cancellation
///
/// This function listens for SIGINT (Ctrl+C) and SIGTERM signals,
/// and cancels the provided cancellation token when received.
pub async fn shutdown_signal_handler(cancellation_token: CancellationToken) {
    let signal_received = async {
        #[cfg(unix)]
        #[allow(clippy::expect_used)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

            tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            }
        }

        #[cfg(not(unix))]
        #[allow(clippy::expect_used)]
        {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");
            "CTRL+C"
        }
    };

    // Wait for either a signal or existing cancellation
    tokio::select! {
        signal_name = signal_received => {
            warn!(signal = signal_name, "shutdown signal received, stopping");
            cancellation_token.cancel();
        },
        () = cancellation_token.cancelled() => {}
    }
}
