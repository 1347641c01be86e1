//! Transport layer (HTTP long-polling).
//!
//! Polls and commands share one request shape: the fixed session query plus
//! a per-request `t` token. The `Transport` trait is the seam between the
//! polling loop and the network.

pub mod http;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use chatbot_core::error::Result;

pub use http::HttpTransport;

/// Path of the polling endpoint on the chat node.
pub const POLL_PATH: &str = "/socket.io/";

/// Query parameters of every poll / command request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollQuery {
    pub user: String,
    #[serde(rename = "EIO")]
    pub eio: u8,
    pub transport: &'static str,
    pub key: String,
    #[serde(rename = "roomId")]
    pub room_id: String,
    #[serde(rename = "serverId")]
    pub server_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub t: String,
}

/// Network seam: one long-poll GET, one command POST.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one poll; a read deadline miss must surface as `TransportTimeout`.
    async fn poll(&self, query: &PollQuery) -> Result<Bytes>;
    /// Send one encoded command frame.
    async fn post(&self, query: &PollQuery, body: String) -> Result<()>;
}

/// Monotonic `t` token source: `<unix millis>-<sequence>`, sequence from 0.
#[derive(Debug, Default)]
pub struct RequestClock {
    seq: AtomicU64,
}

impl RequestClock {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
        }
    }

    pub fn next_token(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", unix_ms(), seq)
    }
}

pub(crate) fn unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
