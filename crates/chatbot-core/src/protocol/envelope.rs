//! Message envelope (JSON inside JSON).
//!
//! A message frame carries `{"event": ..., "data": "<json string>"}`. The
//! `data` string is parsed a second time into its final value, and the raw
//! event name is canonicalized before dispatch.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ChatError, Result};

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    event: String,
    /// Double-encoded payload.
    data: String,
    #[serde(default)]
    cid: Option<String>,
}

/// Canonical event name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Roster snapshot sent right after connecting.
    Initial,
    Message,
    Join,
    Part,
    Kick,
    Logout,
    Ban,
    UpdateUser,
    /// Anything else, carried through under its raw wire name.
    Other(String),
}

impl EventKind {
    /// Canonicalize a raw wire event name.
    ///
    /// `chat:add` only becomes `message` when the item carries a non-null id.
    pub fn from_wire(name: &str, data: &Value) -> Self {
        match name {
            "chat:add" if data.get("id").is_some_and(|id| !id.is_null()) => EventKind::Message,
            "message" => EventKind::Message,
            "updateUser" | "update_user" => EventKind::UpdateUser,
            "initial" => EventKind::Initial,
            "join" | "joinedChat" => EventKind::Join,
            "part" => EventKind::Part,
            "kick" => EventKind::Kick,
            "logout" => EventKind::Logout,
            "ban" => EventKind::Ban,
            other => EventKind::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Initial => "initial",
            EventKind::Message => "message",
            EventKind::Join => "join",
            EventKind::Part => "part",
            EventKind::Kick => "kick",
            EventKind::Logout => "logout",
            EventKind::Ban => "ban",
            EventKind::UpdateUser => "update_user",
            EventKind::Other(name) => name,
        }
    }
}

/// Decoded and canonicalized event.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub data: Value,
    /// Envelope-level connection id, if the server put one there.
    pub envelope_cid: Option<String>,
}

impl Event {
    /// `data.attrs`, where every chat event keeps its user-facing fields.
    pub fn attrs(&self) -> Option<&Value> {
        self.data.get("attrs")
    }

    /// `data.attrs.name`.
    pub fn attr_name(&self) -> Option<&str> {
        self.attrs()?.get("name")?.as_str()
    }

    /// Connection id: `data.cid`, falling back to the envelope's own `cid`.
    pub fn cid(&self) -> Option<&str> {
        self.data
            .get("cid")
            .and_then(Value::as_str)
            .or(self.envelope_cid.as_deref())
    }
}

/// Decode a message frame payload into a canonical event.
pub fn decode_envelope(payload: &str) -> Result<Event> {
    let wire: WireEnvelope = serde_json::from_str(payload)
        .map_err(|e| ChatError::EnvelopeDecode(format!("invalid envelope json: {e}")))?;

    let data: Value = serde_json::from_str(&wire.data)
        .map_err(|e| ChatError::EnvelopeDecode(format!("invalid data json: {e}")))?;

    let kind = EventKind::from_wire(&wire.event, &data);

    Ok(Event {
        kind,
        data,
        envelope_cid: wire.cid,
    })
}
