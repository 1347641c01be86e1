//! One-time handshake: chat metadata, node selection, transport session id.

use async_trait::async_trait;
use reqwest::header::SET_COOKIE;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use chatbot_core::error::{ChatError, Result};

use super::SessionParams;
use crate::config::BotConfig;
use crate::transport::http::{build_client, map_reqwest};
use crate::transport::{unix_ms, POLL_PATH};

/// Chat metadata returned by the wiki.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatInfo {
    #[serde(deserialize_with = "stringish")]
    pub chatkey: String,
    #[serde(rename = "nodeInstance", deserialize_with = "stringish")]
    pub node_instance: String,
    #[serde(rename = "roomId", deserialize_with = "stringish")]
    pub room_id: String,
    #[serde(rename = "isChatMod", default)]
    pub is_chat_mod: bool,
    #[serde(rename = "nodeHostname")]
    pub node_hostname: String,
    #[serde(rename = "nodePort", default, deserialize_with = "opt_stringish")]
    pub node_port: Option<String>,
}

impl ChatInfo {
    /// Poll node base URL; the port is only used against a dev endpoint.
    pub fn poll_base(&self, dev: bool) -> String {
        match (&self.node_port, dev) {
            (Some(port), true) => format!("http://{}:{}/", self.node_hostname, port),
            _ => format!("http://{}/", self.node_hostname),
        }
    }
}

#[async_trait]
pub trait Bootstrapper: Send + Sync {
    async fn bootstrap(&self, cfg: &BotConfig) -> Result<SessionParams>;
}

/// Bootstrapper speaking to the wiki's chat controller over HTTP.
#[derive(Debug, Default)]
pub struct HttpBootstrapper;

impl HttpBootstrapper {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Bootstrapper for HttpBootstrapper {
    async fn bootstrap(&self, cfg: &BotConfig) -> Result<SessionParams> {
        let client = build_client(&cfg.transport, cfg.cookie.as_deref())?;

        // 1) chat metadata
        let info_url = format!("{}/wikia.php", cfg.wiki_base_url());
        let res = client
            .get(&info_url)
            .query(&[("controller", "Chat"), ("format", "json")])
            .send()
            .await
            .map_err(|e| {
                ChatError::Bootstrap(format!("chat info request failed: {}", map_reqwest(e)))
            })?;
        if !res.status().is_success() {
            return Err(ChatError::Bootstrap(format!("chat info returned {}", res.status())));
        }
        let info: ChatInfo = res
            .json()
            .await
            .map_err(|e| ChatError::Bootstrap(format!("invalid chat info: {e}")))?;

        // 2) node selection
        let poll_base = info.poll_base(cfg.dev);
        let mut params = SessionParams {
            poll_base,
            key: info.chatkey,
            room_id: info.room_id,
            server_id: info.node_instance,
            sid: None,
            is_chat_mod: info.is_chat_mod,
            cookie: cfg.cookie.clone(),
        };

        // 3) handshake poll: the node hands out the transport sid as a cookie
        let query = params.query(&cfg.user, format!("{}-0", unix_ms()));
        let url = format!("{}{}", params.poll_base.trim_end_matches('/'), POLL_PATH);
        let res = client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ChatError::Bootstrap(format!("handshake failed: {}", map_reqwest(e))))?;

        let sid = res
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(io_cookie)
            .ok_or_else(|| ChatError::Bootstrap("handshake did not set an io cookie".into()))?;

        params.cookie = Some(match params.cookie.take() {
            Some(c) if !c.trim().is_empty() => format!("{} io={sid};", c.trim_end()),
            _ => format!("io={sid};"),
        });
        params.sid = Some(sid);

        tracing::info!(
            room = %params.room_id,
            server = %params.server_id,
            node = %params.poll_base,
            is_chat_mod = params.is_chat_mod,
            "chat session negotiated"
        );
        Ok(params)
    }
}

/// Extract `<sid>` from a `Set-Cookie: io=<sid>; ...` value.
pub fn io_cookie(set_cookie: &str) -> Option<String> {
    let first = set_cookie.split(';').next()?.trim();
    let sid = first.strip_prefix("io=")?;
    (!sid.is_empty()).then(|| sid.to_string())
}

fn stringish<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn opt_stringish<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
