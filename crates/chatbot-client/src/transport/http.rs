//! reqwest-backed transport.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;

use chatbot_core::error::{ChatError, Result};

use super::{PollQuery, Transport, POLL_PATH};
use crate::config::TransportSection;

/// HTTP client for one chat node.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Build a transport for `poll_base` (e.g. `http://host:port/`).
    ///
    /// The client-wide timeout is the poll read deadline.
    pub fn new(cfg: &TransportSection, poll_base: &str, cookie: Option<&str>) -> Result<Self> {
        let client = build_client(cfg, cookie)?;
        Ok(Self::with_client(client, poll_base))
    }

    /// Creates a transport with a pre-configured HTTP client.
    pub fn with_client(client: Client, poll_base: &str) -> Self {
        Self {
            client,
            url: poll_url(poll_base),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn poll(&self, query: &PollQuery) -> Result<Bytes> {
        let res = self
            .client
            .get(&self.url)
            .query(query)
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = res.status();
        if !status.is_success() {
            return Err(ChatError::Transport(format!("poll returned {status}")));
        }
        res.bytes().await.map_err(map_reqwest)
    }

    async fn post(&self, query: &PollQuery, body: String) -> Result<()> {
        let res = self
            .client
            .post(&self.url)
            .query(query)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = res.status();
        if !status.is_success() {
            return Err(ChatError::Transport(format!("post returned {status}")));
        }
        Ok(())
    }
}

/// Shared client setup: fixed headers and the read deadline.
pub(crate) fn build_client(cfg: &TransportSection, cookie: Option<&str>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain;charset=UTF-8"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    if let Some(cookie) = cookie {
        let v = HeaderValue::from_str(cookie)
            .map_err(|e| ChatError::BadConfig(format!("cookie is not a valid header: {e}")))?;
        headers.insert(header::COOKIE, v);
    }

    Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .default_headers(headers)
        .timeout(cfg.poll_timeout())
        .build()
        .map_err(|e| ChatError::Internal(format!("http client build failed: {e}")))
}

pub(crate) fn map_reqwest(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::TransportTimeout
    } else {
        ChatError::Transport(e.to_string())
    }
}

fn poll_url(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), POLL_PATH)
}
