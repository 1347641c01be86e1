//! Protocol modules (inbound frames, event envelopes, outbound commands).
//!
//! This module hosts the long-polling wire formats:
//! - Frames: sentinel-separated chunks of a poll body, typed by a short prefix.
//! - Envelopes: `{event, data}` JSON whose `data` is itself a JSON string.
//! - Commands: outbound frames built from typed values and serialized once.
//!
//! All decoders are panic-free: malformed input is reported as `ChatError`
//! so the caller can drop the frame and keep polling.

pub mod command;
pub mod envelope;
pub mod frame;
