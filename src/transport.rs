//! HTTP transport boundary.
//!
//! The executor hands a fully signed request to a [`Transport`] and gets raw
//! status, headers and body back. Connection pooling and TLS live behind
//! this trait; the default implementation wraps `reqwest`.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::trace;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt::Debug;
use std::time::Duration;

/// Outgoing request as seen by the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Raw response as returned by the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Sends one HTTP request.
///
/// Implementations report connection, DNS and TLS failures as
/// [`Error::Transport`]; HTTP error statuses are returned as ordinary
/// responses and classified by the executor.
#[async_trait]
pub trait Transport: Debug + Send + Sync + 'static {
    async fn send(&self, request: HttpRequest, timeout: Duration) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing `reqwest::Client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client honoring timeout, user agent and TLS settings.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(config.effective_user_agent())
            .danger_accept_invalid_certs(!config.ssl_verification)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest, timeout: Duration) -> Result<HttpResponse> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Encoding(format!("invalid header name {name:?}: {e}")))?;
            let mut value = HeaderValue::from_str(value)
                .map_err(|e| Error::Encoding(format!("invalid value for header {name}: {e}")))?;
            if name == reqwest::header::AUTHORIZATION {
                value.set_sensitive(true);
            }
            headers.append(name, value);
        }

        let response = self
            .client
            .request(request.method, &request.url)
            .headers(headers)
            .timeout(timeout)
            .body(request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect::<Vec<_>>();
        trace!("response headers: {headers:?}");
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
