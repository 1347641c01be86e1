use std::time::Duration;

use serde::Deserialize;
use chatbot_core::error::{ChatError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    pub version: u32,

    /// Wiki subdomain hosting the chat.
    #[serde(default)]
    pub wiki: String,

    /// Local user display name; our own join is recognized by it.
    pub user: String,

    /// Development endpoint (localhost wiki, host:port poll server).
    #[serde(default)]
    pub dev: bool,

    /// Explicit wiki base URL, overriding `wiki` / `dev`.
    #[serde(default)]
    pub wiki_url: Option<String>,

    /// Pre-authenticated session cookie (login happens elsewhere).
    #[serde(default)]
    pub cookie: Option<String>,

    #[serde(default)]
    pub transport: TransportSection,
}

impl BotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ChatError::UnsupportedVersion);
        }
        if self.user.trim().is_empty() {
            return Err(ChatError::BadConfig("user must not be empty".into()));
        }
        if self.wiki.trim().is_empty() && self.wiki_url.is_none() {
            return Err(ChatError::BadConfig("either wiki or wiki_url must be set".into()));
        }

        self.transport.validate()?;

        Ok(())
    }

    /// Base URL of the wiki serving the chat metadata endpoint.
    pub fn wiki_base_url(&self) -> String {
        if let Some(url) = &self.wiki_url {
            return url.trim_end_matches('/').to_string();
        }
        if self.dev {
            "http://localhost:8080".to_string()
        } else {
            format!("http://{}.wikia.com", self.wiki)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportSection {
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_max_inflight_frames")]
    pub max_inflight_frames: usize,

    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            max_inflight_frames: default_max_inflight_frames(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl TransportSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=300000).contains(&self.poll_timeout_ms) {
            return Err(ChatError::BadConfig(
                "transport.poll_timeout_ms must be between 1000 and 300000".into(),
            ));
        }
        if self.retry_delay_ms > 60000 {
            return Err(ChatError::BadConfig(
                "transport.retry_delay_ms must be at most 60000".into(),
            ));
        }
        if !(1..=4096).contains(&self.max_inflight_frames) {
            return Err(ChatError::BadConfig(
                "transport.max_inflight_frames must be between 1 and 4096".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ChatError::BadConfig("transport.user_agent must not be empty".into()));
        }
        Ok(())
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

fn default_poll_timeout_ms() -> u64 {
    60000
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_max_inflight_frames() -> usize {
    64
}
fn default_shutdown_timeout_ms() -> u64 {
    10000
}
fn default_user_agent() -> String {
    concat!("chatbot-rs/", env!("CARGO_PKG_VERSION")).into()
}
