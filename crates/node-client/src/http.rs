// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport on top of reqwest
//!
//! A native client is not subject to cross-origin restrictions, so this
//! transport has no opaque mode: the resilient client falls back to a plain
//! retry where a browser transport would probe opaquely.

use api_client::{ApiError, HttpMethod, Transport, TransportRequest, TransportResponse};
use reqwest::{Client, header};
use tokio::time::timeout;
use tracing::debug;

const USER_AGENT: &str = concat!("ledger-dash/", env!("CARGO_PKG_VERSION"));

/// [`Transport`] backed by a shared reqwest connection pool
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport
    ///
    /// Timeouts are applied per request, from [`TransportRequest::timeout`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::transport(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Map a reqwest failure onto the transport taxonomy
fn classify(error: &reqwest::Error, timeout_seconds: u64) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout { timeout_seconds }
    } else {
        ApiError::transport(error.to_string())
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ApiError> {
        let timeout_seconds = request.timeout.as_secs();

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => {
                let builder = self.client.post(&request.url);
                match &request.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };
        let builder = builder
            .query(&request.query)
            .header(header::ACCEPT, "application/json");

        debug!(method = %request.method, url = %request.url, "sending request");

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(TransportResponse::new(status, body))
        };

        timeout(request.timeout, exchange)
            .await
            .map_err(|_| ApiError::Timeout { timeout_seconds })?
            .map_err(|e| classify(&e, timeout_seconds))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
