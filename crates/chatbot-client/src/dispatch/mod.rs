//! Event dispatch: built-in handlers plus externally registered hooks.
//!
//! Re-exports the dispatcher and hook types so plugins can depend on this
//! module directly.

mod builtin;
pub mod dispatcher;
pub mod hooks;

pub use dispatcher::Dispatcher;
pub use hooks::{hook_fn, Hook, HookEvent, HookKind, HookRegistry};
