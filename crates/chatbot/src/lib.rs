//! Top-level facade crate for the chatbot client.
//!
//! Re-exports the wire contracts and the polling client so users can depend on a single crate.

pub mod core {
    pub use chatbot_core::*;
}

pub mod client {
    pub use chatbot_client::*;
}
