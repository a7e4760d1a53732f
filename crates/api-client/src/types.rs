// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Request and response types exchanged with a [`crate::Transport`]

use std::{fmt, time::Duration};

use serde_json::Value;

use crate::ApiError;

/// Default timeout for reads and writes
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Read
    Get,
    /// Write
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// One HTTP exchange to perform
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Method
    pub method: HttpMethod,
    /// Absolute url, without query string
    pub url: String,
    /// Query parameters appended to `url`
    pub query: Vec<(String, String)>,
    /// JSON body for writes
    pub body: Option<Value>,
    /// Upper bound for the whole exchange
    pub timeout: Duration,
}

impl TransportRequest {
    /// A GET request with the default timeout
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query: Vec::new(),
            body: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// A POST request carrying a JSON body, with the default timeout
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replace the query parameters
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Replace the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A completed exchange, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body text
    pub body: String,
}

impl TransportResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a completed exchange into its JSON payload
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] for a non-2xx status and
    /// [`ApiError::MalformedResponse`] when the body is not JSON
    pub fn into_json(self) -> Result<Value, ApiError> {
        if !self.is_success() {
            return Err(ApiError::Status {
                status: self.status,
                body: self.body,
            });
        }
        serde_json::from_str(&self.body).map_err(|e| ApiError::malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_builders() {
        let request = TransportRequest::get("http://localhost:8080/api/blocks/latest")
            .with_query(vec![("limit".to_string(), "5".to_string())])
            .with_timeout(Duration::from_secs(3));

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.query.len(), 1);
        assert_eq!(request.timeout, Duration::from_secs(3));
        assert!(request.body.is_none());

        let request = TransportRequest::post("http://localhost:8080/api/mine", json!({}));
        assert_eq!(request.method.to_string(), "POST");
        assert_eq!(request.timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn into_json_classifies_failures() {
        let ok = TransportResponse::new(200, r#"{"difficulty": 5}"#).into_json();
        assert_eq!(ok, Ok(json!({"difficulty": 5})));

        let status = TransportResponse::new(404, "missing").into_json();
        assert!(matches!(status, Err(ApiError::Status { status: 404, .. })));

        let malformed = TransportResponse::new(200, "<html>").into_json();
        assert!(matches!(malformed, Err(ApiError::MalformedResponse { .. })));
    }
}
