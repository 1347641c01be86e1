//! chatbot core: runtime-free wire contracts for the long-polling chat protocol.
//!
//! This crate defines the frame format, the double-encoded event envelope,
//! the outbound command encoder, and the error surface shared by the client
//! runtime. It intentionally carries no transport or runtime dependencies so
//! the codecs can be exercised in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed traffic surfaces as `ChatError`/`Result` so a single bad frame
//! can never take down the polling loop.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;
pub mod protocol;

/// Shared result type.
pub use error::{ChatError, ErrorCode, Result};
pub use model::Participant;
