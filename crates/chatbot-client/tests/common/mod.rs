//! Shared fixtures: scripted transport and client builders.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use chatbot_client::config::{self, BotConfig};
use chatbot_client::session::SessionParams;
use chatbot_client::transport::{PollQuery, Transport};
use chatbot_client::ChatClient;
use chatbot_core::error::{ChatError, Result};

/// Replays scripted poll results, records every request.
pub struct ScriptedTransport {
    polls: Mutex<VecDeque<Result<Bytes>>>,
    posts: Mutex<Vec<String>>,
    queries: Mutex<Vec<PollQuery>>,
    /// When the script runs out: hang forever instead of timing out.
    hang_when_empty: bool,
    /// Every post fails with a transport error (still recorded).
    fail_posts: bool,
}

impl ScriptedTransport {
    pub fn new(polls: Vec<Result<Bytes>>) -> Arc<Self> {
        Arc::new(Self {
            polls: Mutex::new(polls.into()),
            posts: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            hang_when_empty: false,
            fail_posts: false,
        })
    }

    pub fn hanging(polls: Vec<Result<Bytes>>) -> Arc<Self> {
        Arc::new(Self {
            polls: Mutex::new(polls.into()),
            posts: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            hang_when_empty: true,
            fail_posts: false,
        })
    }

    pub fn failing_posts(polls: Vec<Result<Bytes>>) -> Arc<Self> {
        Arc::new(Self {
            polls: Mutex::new(polls.into()),
            posts: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            hang_when_empty: false,
            fail_posts: true,
        })
    }

    pub fn posts(&self) -> Vec<String> {
        self.posts.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<PollQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn poll(&self, query: &PollQuery) -> Result<Bytes> {
        self.queries.lock().unwrap().push(query.clone());
        let next = self.polls.lock().unwrap().pop_front();
        match next {
            Some(res) => res,
            None if self.hang_when_empty => std::future::pending().await,
            None => Err(ChatError::TransportTimeout),
        }
    }

    async fn post(&self, query: &PollQuery, body: String) -> Result<()> {
        self.queries.lock().unwrap().push(query.clone());
        self.posts.lock().unwrap().push(body);
        if self.fail_posts {
            return Err(ChatError::Transport("reset".into()));
        }
        Ok(())
    }
}

pub fn test_config() -> BotConfig {
    config::load_from_str(
        r#"
version: 1
wiki: "test"
user: "Bot"
transport:
  retry_delay_ms: 0
  shutdown_timeout_ms: 2000
"#,
    )
    .unwrap()
}

pub fn test_session() -> SessionParams {
    SessionParams {
        poll_base: "http://node.test/".into(),
        key: "k3y".into(),
        room_id: "42".into(),
        server_id: "7".into(),
        sid: Some("sid1".into()),
        is_chat_mod: true,
        cookie: None,
    }
}

pub fn client_with(transport: Arc<ScriptedTransport>) -> ChatClient {
    ChatClient::new(test_config(), test_session(), transport)
}

/// `4:::` frame for `event` whose data is `data` JSON-encoded once more.
pub fn message_frame(event: &str, data: serde_json::Value) -> Bytes {
    let envelope = serde_json::json!({ "event": event, "data": data.to_string() });
    Bytes::from(format!("4:::{envelope}"))
}

/// Join a user through the wire path.
pub fn join_frame(name: &str, cid: &str) -> Bytes {
    message_frame(
        "join",
        serde_json::json!({ "cid": cid, "attrs": { "name": name, "isModerator": false } }),
    )
}

/// Poll body made of several frames joined by the transport sentinel.
pub fn body_of(frames: &[Bytes]) -> Bytes {
    let mut body = Vec::new();
    for f in frames {
        let len = f.len().to_string();
        body.extend_from_slice("\u{fffd}".as_bytes());
        body.extend_from_slice(len.as_bytes());
        body.extend_from_slice("\u{fffd}".as_bytes());
        body.extend_from_slice(f);
    }
    Bytes::from(body)
}
