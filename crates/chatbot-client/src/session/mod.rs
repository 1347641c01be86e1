//! Session parameters negotiated once at startup.

pub mod bootstrap;

pub use bootstrap::{Bootstrapper, ChatInfo, HttpBootstrapper};

use crate::transport::PollQuery;

/// Routing/session parameters consumed by the polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Base URL of the chat node, e.g. `http://host:port/`.
    pub poll_base: String,
    pub key: String,
    pub room_id: String,
    pub server_id: String,
    /// Transport session id from the handshake's `io` cookie.
    pub sid: Option<String>,
    pub is_chat_mod: bool,
    /// Cookie header to send with every request, `io=<sid>` included.
    pub cookie: Option<String>,
}

impl SessionParams {
    /// Fixed query for this session, stamped with a request token.
    pub fn query(&self, user: &str, t: String) -> PollQuery {
        PollQuery {
            user: user.to_string(),
            eio: 2,
            transport: "polling",
            key: self.key.clone(),
            room_id: self.room_id.clone(),
            server_id: self.server_id.clone(),
            sid: self.sid.clone(),
            t,
        }
    }
}
