// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! Reads and writes against a node never fail, so the errors here are the
//! ones the operator can act on: bad configuration, bad input, and registry
//! changes that were refused.

use api_client::ApiError;
use thiserror::Error;

/// Error types for console operations
#[derive(Error, Debug)]
pub enum DashError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Node url that is not an absolute http(s) url
    #[error("Invalid node url {url}: {reason}")]
    InvalidNodeUrl {
        /// The rejected url
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Node index outside the registry
    #[error("No node at index {index} (registry holds {len} nodes)")]
    NodeIndex {
        /// Requested index
        index: usize,
        /// Number of known nodes
        len: usize,
    },

    /// Registry refused a change
    #[error("Registry change rejected: {message}")]
    Rejected {
        /// Error message
        message: String,
    },

    /// Client construction or input validation errors
    #[error(transparent)]
    Client(#[from] ApiError),

    /// Output serialization errors
    #[error("Failed to render output: {source}")]
    Render {
        /// Underlying serde error
        #[from]
        source: serde_json::Error,
    },
}

/// Result type for console operations
pub type DashResult<T> = Result<T, DashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_pass_through() {
        let error: DashError = ApiError::validation("difficulty must be at least 1").into();
        assert_eq!(
            error.to_string(),
            "Validation failed: difficulty must be at least 1"
        );
    }

    #[test]
    fn index_error_names_bounds() {
        let error = DashError::NodeIndex { index: 7, len: 4 };
        assert_eq!(
            error.to_string(),
            "No node at index 7 (registry holds 4 nodes)"
        );
    }
}
