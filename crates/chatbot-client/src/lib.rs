//! chatbot client library entry.
//!
//! This crate wires the session bootstrap, HTTP transport, polling loop,
//! roster, and hook dispatcher into a running chat client. It is intended
//! to be consumed by the binary (`main.rs`), by plugins, and by integration
//! tests.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod plugin;
pub mod poller;
pub mod roster;
pub mod session;
pub mod transport;

pub use client::{ChatClient, WeakChatClient};
pub use dispatch::{hook_fn, Hook, HookEvent, HookKind};
pub use plugin::Plugin;
pub use poller::{FrameOutcome, LoopState};
