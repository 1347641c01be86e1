//! Poll body splitting and frame prefix decoding (panic-free).
//!
//! A poll response is one or more frames glued together by a replacement
//! character (`U+FFFD`, UTF-8 `EF BF BD`). The transport interleaves length
//! markers between the sentinels, so short chunks are noise and get dropped.

use bytes::{Buf, Bytes};

use crate::error::{ChatError, Result};

/// Byte sequence separating concatenated frames in one poll body.
pub const SENTINEL: &[u8] = b"\xef\xbf\xbd";

/// Sentinel-delimited chunks must be longer than this (in chars) to be frames.
pub const MIN_FRAME_CHARS: usize = 10;

/// Connect frame prefix.
pub const CONNECT_PREFIX: &str = "1::";
/// Message frame prefix; the envelope JSON follows immediately.
pub const MESSAGE_PREFIX: &str = "4:::";
/// Ping (keep-alive) frame prefix.
pub const PING_PREFIX: &str = "8::";

/// Decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Connect,
    Ping,
    /// Raw envelope payload, decoded further by `envelope::decode_envelope`.
    Message(String),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Connect => "connect",
            Frame::Ping => "ping",
            Frame::Message(_) => "message",
        }
    }
}

/// Split a poll body into candidate frames.
///
/// Without a sentinel the whole body is a single candidate (no length
/// filter, so a bare `1::` still counts). The returned iterator is lazy and
/// consumed once.
pub fn split_frames(body: Bytes) -> Frames {
    let delimited = find(&body, SENTINEL).is_some();
    Frames {
        rest: body,
        delimited,
        done: false,
    }
}

/// Lazy iterator over the frames of one poll body.
#[derive(Debug)]
pub struct Frames {
    rest: Bytes,
    delimited: bool,
    done: bool,
}

impl Iterator for Frames {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if !self.delimited {
            if self.done {
                return None;
            }
            self.done = true;
            let body = std::mem::take(&mut self.rest);
            return (!body.is_empty()).then_some(body);
        }

        while !self.done {
            let part = match find(&self.rest, SENTINEL) {
                Some(at) => {
                    let part = self.rest.split_to(at);
                    self.rest.advance(SENTINEL.len());
                    part
                }
                None => {
                    self.done = true;
                    std::mem::take(&mut self.rest)
                }
            };
            if char_len(&part) > MIN_FRAME_CHARS {
                return Some(part);
            }
            tracing::trace!(len = part.len(), "discarding short chunk");
        }
        None
    }
}

/// Decode one raw frame by its type prefix.
pub fn decode_frame(raw: &[u8]) -> Result<Frame> {
    let s = std::str::from_utf8(raw)
        .map_err(|e| ChatError::MalformedFrame(format!("frame is not utf-8: {e}")))?;

    if s.is_empty() {
        return Err(ChatError::MalformedFrame("empty frame".into()));
    }
    // Longest prefix first: "4:::" must not be read as a shorter "N::" form.
    if let Some(payload) = s.strip_prefix(MESSAGE_PREFIX) {
        return Ok(Frame::Message(payload.to_owned()));
    }
    if s.starts_with(CONNECT_PREFIX) {
        return Ok(Frame::Connect);
    }
    if s.starts_with(PING_PREFIX) {
        return Ok(Frame::Ping);
    }

    Err(ChatError::MalformedFrame(format!(
        "unrecognized prefix: {:?}",
        preview(s)
    )))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn char_len(b: &[u8]) -> usize {
    match std::str::from_utf8(b) {
        Ok(s) => s.chars().count(),
        Err(_) => b.len(),
    }
}

fn preview(s: &str) -> String {
    s.chars().take(16).collect()
}
