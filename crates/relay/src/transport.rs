//! Outbound HTTP.
//!
//! The protocol client talks to a [`Transport`] so tests can script server
//! replies. [`HttpTransport`] is the real one, built on `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::RelayConfig;
use crate::endpoints::Endpoint;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    /// Whether sending the same request again may succeed: timeouts, failed
    /// connections and server-side (5xx) or throttling statuses.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            TransportError::Status { status, .. } => {
                (500..=599).contains(status) || matches!(status, 408 | 429)
            }
            TransportError::Unavailable(_) => true,
        }
    }
}

/// A signed request ready to send.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub endpoint: Endpoint,
    /// Header name/value pairs, in send order.
    pub headers: Vec<(&'static str, String)>,
    /// Serialized JSON body; the `sign` header was computed over exactly this.
    pub body: String,
}

impl OutboundRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw reply. Only 2xx responses are returned; others are errors.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Builds a client with the configured timeout and proxy.
    pub fn from_config(config: &RelayConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.server.timeout_secs));
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url().to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.endpoint.path());
        debug!(endpoint = request.endpoint.name(), "POST {url}");

        let mut builder = self.client.post(&url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        let resp = builder.body(request.body.clone()).send().await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> TransportError {
        TransportError::Status {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_transient_errors() {
        assert!(status(502).is_transient());
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(TransportError::Unavailable("reset".into()).is_transient());

        assert!(!status(400).is_transient());
        assert!(!status(401).is_transient());
        assert!(!status(404).is_transient());
    }
}
