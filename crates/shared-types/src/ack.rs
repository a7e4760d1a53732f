// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Acknowledgement envelope returned by every write operation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message attached when the write went out as an opaque request
pub const OPAQUE_QUALIFIER: &str = "Operation likely completed successfully (opaque response)";

/// Message attached when every transport attempt for a write failed
pub const ERROR_RECOVERY_QUALIFIER: &str = "Operation assumed to have completed (error recovery)";

/// Result of a write operation
///
/// The shape is the same whether the backend answered or the client
/// synthesized the acknowledgement; the only difference is the qualifier in
/// `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteAck {
    /// Whether the operation is reported as successful
    #[serde(default = "default_success")]
    pub success: bool,
    /// Human-readable outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Any other fields the backend returned (hash, block number, ...)
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

fn default_success() -> bool {
    true
}

impl WriteAck {
    /// A successful acknowledgement carrying `message`
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            details: Map::new(),
        }
    }

    /// Acknowledgement synthesized after an opaque request completed
    pub fn opaque() -> Self {
        Self::success(OPAQUE_QUALIFIER)
    }

    /// Acknowledgement synthesized after every attempt failed
    pub fn error_recovery() -> Self {
        Self::success(ERROR_RECOVERY_QUALIFIER)
    }

    /// Whether the backend's real answer is unknown
    pub fn is_assumed(&self) -> bool {
        matches!(
            self.message.as_deref(),
            Some(OPAQUE_QUALIFIER | ERROR_RECOVERY_QUALIFIER)
        )
    }
}
