//! Plugin surface.
//!
//! A plugin is built from a factory that receives `&ChatClient`, then asked
//! once to register its hooks. The client owns its plugins: keep a
//! `WeakChatClient` rather than a `ChatClient` inside one.

use std::sync::Arc;

use crate::client::ChatClient;

pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Register hooks. `Arc<Self>` lets a plugin hand itself out as a hook.
    fn register(self: Arc<Self>, client: &ChatClient);
}
