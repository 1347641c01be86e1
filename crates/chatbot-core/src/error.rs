//! Shared error type across chatbot crates.

use thiserror::Error;

/// Stable error codes (used in logs and asserted by tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Poll request exceeded its read deadline.
    TransportTimeout,
    /// Any other transport failure.
    Transport,
    /// Frame without a recognized type prefix.
    MalformedFrame,
    /// JSON failure at either envelope level.
    EnvelopeDecode,
    /// A built-in or external handler failed.
    HandlerFailure,
    /// Session handshake failed.
    Bootstrap,
    /// Invalid configuration.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Client is no longer running.
    NotRunning,
    /// Hook registration for an unknown event name.
    UnknownHook,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::TransportTimeout => "TRANSPORT_TIMEOUT",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::MalformedFrame => "MALFORMED_FRAME",
            ErrorCode::EnvelopeDecode => "ENVELOPE_DECODE",
            ErrorCode::HandlerFailure => "HANDLER_FAILURE",
            ErrorCode::Bootstrap => "BOOTSTRAP",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::NotRunning => "NOT_RUNNING",
            ErrorCode::UnknownHook => "UNKNOWN_HOOK",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("transport timeout")]
    TransportTimeout,
    #[error("transport: {0}")]
    Transport(String),
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("envelope decode: {0}")]
    EnvelopeDecode(String),
    #[error("handler failure: {0}")]
    HandlerFailure(String),
    #[error("bootstrap: {0}")]
    Bootstrap(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("client is not running")]
    NotRunning,
    #[error("unknown hook event: {0}")]
    UnknownHook(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ChatError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::TransportTimeout => ErrorCode::TransportTimeout,
            ChatError::Transport(_) => ErrorCode::Transport,
            ChatError::MalformedFrame(_) => ErrorCode::MalformedFrame,
            ChatError::EnvelopeDecode(_) => ErrorCode::EnvelopeDecode,
            ChatError::HandlerFailure(_) => ErrorCode::HandlerFailure,
            ChatError::Bootstrap(_) => ErrorCode::Bootstrap,
            ChatError::BadConfig(_) => ErrorCode::BadConfig,
            ChatError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            ChatError::NotRunning => ErrorCode::NotRunning,
            ChatError::UnknownHook(_) => ErrorCode::UnknownHook,
            ChatError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Only a poll timeout is allowed to stop the polling loop.
    pub fn is_fatal_to_loop(&self) -> bool {
        matches!(self, ChatError::TransportTimeout)
    }
}
