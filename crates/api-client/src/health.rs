// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Reachability probe types for ledger nodes

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default timeout for node probes
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Health status of a ledger node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum HealthStatus {
    /// Node answered the probe with a 2xx status
    Up,
    /// Node answered, but not with a 2xx status
    Degraded { reason: String },
    /// Node did not answer
    Down { reason: String },
}

/// Detailed probe result with timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Probed base url
    pub url: String,
    /// The health status
    pub status: HealthStatus,
    /// Time until the probe resolved
    pub response_time: Duration,
    /// When the probe was performed
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    /// Classify an HTTP status code returned by a probe
    pub fn from_status_code(status: u16) -> Self {
        if (200..300).contains(&status) {
            Self::Up
        } else {
            Self::Degraded {
                reason: format!("node returned status {status}"),
            }
        }
    }

    /// Check if this health status indicates the node can serve requests
    pub fn is_up(&self) -> bool {
        matches!(self, HealthStatus::Up)
    }

    /// Get a human-readable description of the status
    pub fn description(&self) -> &str {
        match self {
            HealthStatus::Up => "Node is reachable",
            HealthStatus::Degraded { reason } | HealthStatus::Down { reason } => reason,
        }
    }
}

impl ProbeResult {
    /// Create a probe result stamped with the current time
    pub fn new(url: impl Into<String>, status: HealthStatus, response_time: Duration) -> Self {
        Self {
            url: url.into(),
            status,
            response_time,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_classification() {
        assert!(HealthStatus::from_status_code(200).is_up());
        assert!(HealthStatus::from_status_code(204).is_up());

        let degraded = HealthStatus::from_status_code(503);
        assert!(!degraded.is_up());
        assert_eq!(degraded.description(), "node returned status 503");
    }

    #[test]
    fn probe_result_creation() {
        let duration = Duration::from_millis(40);
        let result = ProbeResult::new(
            "http://localhost:8080/api",
            HealthStatus::Down {
                reason: "connection refused".to_string(),
            },
            duration,
        );

        assert_eq!(result.response_time, duration);
        assert!(!result.status.is_up());
        assert_eq!(result.status.description(), "connection refused");
    }
}
