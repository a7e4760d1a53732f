// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Transport traits and utilities for ledger node clients
//!
//! This crate provides the seam between the resilient client and whatever
//! actually moves bytes to a ledger node.
//!
//! # Core Abstractions
//!
//! - **`Transport` Trait**: Executes one HTTP exchange, optionally in an opaque mode
//!   whose response cannot be read
//! - **Error Handling**: `ApiError` classifies transport, cross-origin, status,
//!   malformed-body and validation failures
//! - **Request Types**: [`TransportRequest`] and [`TransportResponse`]
//! - **Probe Results**: [`HealthStatus`] and [`ProbeResult`] for node reachability checks

use thiserror::Error;

pub mod health;
pub mod types;

pub use health::*;
pub use types::*;

/// Message fragments that identify a transport failure caused by a
/// cross-origin restriction rather than an unreachable host
const CROSS_ORIGIN_PATTERNS: [&str; 3] = ["Network Error", "CORS", "cross-origin"];

/// Something that can carry a request to a ledger node
///
/// Implementations never interpret status codes: a completed exchange is
/// `Ok` whatever its status, and `Err` is reserved for the request not
/// completing at all.
pub trait Transport: Send + Sync {
    /// Execute a request and return the full response
    ///
    /// # Errors
    ///
    /// Returns a transport-level [`ApiError`] (`Transport`, `Timeout` or
    /// `CrossOrigin`) when no response was received
    fn execute(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, ApiError>> + Send;

    /// Execute a request whose response body and status are unreadable
    ///
    /// Completing without error only proves the request reached the network.
    ///
    /// # Errors
    ///
    /// Returns a transport-level [`ApiError`] when the request did not complete,
    /// or when this transport has no opaque mode
    fn execute_opaque(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        let url = request.url;
        async move {
            Err(ApiError::Transport {
                message: format!("opaque requests are not supported (url: {url})"),
            })
        }
    }

    /// Whether [`Transport::execute_opaque`] is meaningful for this transport
    fn supports_opaque(&self) -> bool {
        false
    }

    /// Get the name/identifier of this transport
    fn name(&self) -> &'static str;
}

/// Errors that can occur when talking to a ledger node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    /// Connection refused, DNS failure or any other failure to exchange
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Request did not complete in time
    #[error("Request timeout after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// Transport failure caused by a cross-origin restriction
    #[error("Cross-origin request blocked: {message}")]
    CrossOrigin { message: String },

    /// Node answered with a non-2xx status
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx status with a body that is not JSON or does not decode
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Caller-supplied arguments failed a local precondition
    #[error("Validation failed: {message}")]
    Validation { message: String },
}

impl ApiError {
    /// Build a transport error, classifying cross-origin failures by message
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_cross_origin_message(&message) {
            Self::CrossOrigin { message }
        } else {
            Self::Transport { message }
        }
    }

    /// Build a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Whether the request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::CrossOrigin { .. }
        )
    }

    /// Whether the failure was a cross-origin restriction
    pub fn is_cross_origin(&self) -> bool {
        matches!(self, Self::CrossOrigin { .. })
    }

    /// Whether the caller's input was rejected locally
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Check a raw transport message for the cross-origin signature
pub fn is_cross_origin_message(message: &str) -> bool {
    CROSS_ORIGIN_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
}
