//! Outbound command frames.
//!
//! Every command is built as a typed value and serialized once, so quotes
//! and backslashes in user-supplied text are escaped by the JSON encoder
//! rather than by hand.

use serde::Serialize;

use crate::error::{ChatError, Result};

/// Prefix of a JSON command frame.
pub const JSON_PREFIX: &str = "3:::";
/// Prefix of a named-event frame (used for chat lines).
pub const EVENT_PREFIX: &str = "5:::";
/// Keep-alive echo.
pub const PING_FRAME: &str = "8::";

/// Outbound command intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Sent once, right after our own join reveals the connection id.
    InitQuery { cid: Option<&'a str> },
    SendMessage { text: &'a str },
    Kick { cid: Option<&'a str>, target: &'a str },
    Logout { cid: Option<&'a str> },
    Ping,
}

#[derive(Serialize)]
struct CommandBody<'a> {
    id: Option<u64>,
    cid: Option<&'a str>,
    attrs: CommandAttrs<'a>,
}

#[derive(Serialize)]
struct CommandAttrs<'a> {
    #[serde(rename = "msgType")]
    msg_type: &'static str,
    command: &'static str,
    #[serde(rename = "userToKick", skip_serializing_if = "Option::is_none")]
    user_to_kick: Option<&'a str>,
}

#[derive(Serialize)]
struct ChatLine<'a> {
    attrs: ChatAttrs<'a>,
}

#[derive(Serialize)]
struct ChatAttrs<'a> {
    #[serde(rename = "msgType")]
    msg_type: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
struct EventCall {
    name: &'static str,
    /// The chat line travels as a JSON string inside the JSON frame.
    args: [String; 1],
}

impl Command<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Command::InitQuery { .. } => "initquery",
            Command::SendMessage { .. } => "message",
            Command::Kick { .. } => "kick",
            Command::Logout { .. } => "logout",
            Command::Ping => "ping",
        }
    }

    /// Encode the exact frame string to POST.
    pub fn encode(&self) -> Result<String> {
        match *self {
            Command::InitQuery { cid } => command_frame(cid, "initquery", None),
            Command::Kick { cid, target } => command_frame(cid, "kick", Some(target)),
            Command::Logout { cid } => command_frame(cid, "logout", None),
            Command::SendMessage { text } => {
                let line = to_json(&ChatLine {
                    attrs: ChatAttrs {
                        msg_type: "chat",
                        text,
                    },
                })?;
                let call = to_json(&EventCall {
                    name: "message",
                    args: [line],
                })?;
                Ok(format!("{EVENT_PREFIX}{call}"))
            }
            Command::Ping => Ok(PING_FRAME.to_owned()),
        }
    }
}

fn command_frame(
    cid: Option<&str>,
    command: &'static str,
    user_to_kick: Option<&str>,
) -> Result<String> {
    let body = to_json(&CommandBody {
        id: None,
        cid,
        attrs: CommandAttrs {
            msg_type: "command",
            command,
            user_to_kick,
        },
    })?;
    Ok(format!("{JSON_PREFIX}{body}"))
}

fn to_json<T: Serialize>(v: &T) -> Result<String> {
    serde_json::to_string(v).map_err(|e| ChatError::Internal(format!("json encode failed: {e}")))
}
