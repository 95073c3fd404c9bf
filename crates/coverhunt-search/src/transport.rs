// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, trace};

use crate::error::TransportError;
use crate::rate_limiter::HostRateLimits;

const USER_AGENT: &str = concat!("coverhunt/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Asynchronous HTTP GET used by every provider run.
///
/// Non-success statuses are errors. Timeouts are the transport's concern and
/// surface as ordinary failures.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, TransportError>;

    async fn fetch_binary(&self, url: &str) -> Result<Bytes, TransportError>;
}

/// `reqwest` backed transport with per-host politeness limits.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    limits: Arc<HostRateLimits>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, TransportError> {
        self.limits.acquire_for(url).await;

        trace!(target: "transport", url, "GET");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        debug!(target: "transport", url, status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn fetch_text(&self, url: &str) -> Result<String, TransportError> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn fetch_binary(&self, url: &str) -> Result<Bytes, TransportError> {
        Ok(self.get(url).await?.bytes().await?)
    }
}

#[derive(Debug, Default)]
pub struct ReqwestTransportBuilder {
    timeout: Option<Duration>,
    contact: Option<String>,
    limits: HostRateLimits,
}

impl ReqwestTransportBuilder {
    /// Per-request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Contact URL or e-mail appended to the user agent.
    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    /// Space requests to `host` at least `min_interval` apart.
    pub fn rate_limit_host(mut self, host: impl Into<String>, min_interval: Duration) -> Self {
        self.limits.insert(host, min_interval);
        self
    }

    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let user_agent = match self.contact.as_deref().map(str::trim) {
            Some(contact) if !contact.is_empty() => format!("{USER_AGENT} ( {contact} )"),
            _ => USER_AGENT.to_string(),
        };

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        if !self.limits.is_empty() {
            debug!(target: "transport", "host rate limits enabled");
        }

        Ok(ReqwestTransport {
            client,
            limits: Arc::new(self.limits),
        })
    }
}
