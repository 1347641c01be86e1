use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use chatbot_core::error::{ChatError, Result};
use chatbot_core::protocol::envelope::EventKind;
use chatbot_core::Participant;

use crate::client::ChatClient;

/// Events external hooks can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Message,
    Join,
    Part,
    Kick,
    Logout,
    Ban,
    UpdateUser,
    /// Fired once when the polling loop stops.
    Quitting,
}

impl HookKind {
    pub const ALL: [HookKind; 8] = [
        HookKind::Message,
        HookKind::Join,
        HookKind::Part,
        HookKind::Kick,
        HookKind::Logout,
        HookKind::Ban,
        HookKind::UpdateUser,
        HookKind::Quitting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HookKind::Message => "message",
            HookKind::Join => "join",
            HookKind::Part => "part",
            HookKind::Kick => "kick",
            HookKind::Logout => "logout",
            HookKind::Ban => "ban",
            HookKind::UpdateUser => "update_user",
            HookKind::Quitting => "quitting",
        }
    }

    /// Hook list fed by a wire event, if any.
    pub fn for_event(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Message => Some(HookKind::Message),
            EventKind::Join => Some(HookKind::Join),
            EventKind::Part => Some(HookKind::Part),
            EventKind::Kick => Some(HookKind::Kick),
            EventKind::Logout => Some(HookKind::Logout),
            EventKind::Ban => Some(HookKind::Ban),
            EventKind::UpdateUser => Some(HookKind::UpdateUser),
            EventKind::Initial | EventKind::Other(_) => None,
        }
    }
}

impl FromStr for HookKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self> {
        HookKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ChatError::UnknownHook(s.to_string()))
    }
}

/// What a hook receives.
#[derive(Debug)]
pub enum HookEvent<'a> {
    /// Chat line with its sender already resolved against the roster.
    Message { text: &'a str, sender: &'a Participant },
    /// Any other event, with its decoded data.
    Data { kind: HookKind, data: &'a Value },
    Quitting,
}

impl HookEvent<'_> {
    pub fn kind(&self) -> HookKind {
        match self {
            HookEvent::Message { .. } => HookKind::Message,
            HookEvent::Data { kind, .. } => *kind,
            HookEvent::Quitting => HookKind::Quitting,
        }
    }
}

/// External callback. Errors and panics are contained by the dispatcher.
#[async_trait]
pub trait Hook: Send + Sync {
    async fn call(&self, client: &ChatClient, event: &HookEvent<'_>) -> Result<()>;
}

struct FnHook<F>(F);

#[async_trait]
impl<F> Hook for FnHook<F>
where
    F: Fn(&ChatClient, &HookEvent<'_>) -> Result<()> + Send + Sync,
{
    async fn call(&self, client: &ChatClient, event: &HookEvent<'_>) -> Result<()> {
        (self.0)(client, event)
    }
}

/// Wrap a synchronous closure as a hook.
pub fn hook_fn<F>(f: F) -> Arc<dyn Hook>
where
    F: Fn(&ChatClient, &HookEvent<'_>) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(FnHook(f))
}

/// Append-only hook lists, one per kind, kept in registration order.
#[derive(Default)]
pub struct HookRegistry {
    hooks: DashMap<HookKind, Vec<Arc<dyn Hook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            hooks: DashMap::new(),
        }
    }

    pub fn register(&self, kind: HookKind, hook: Arc<dyn Hook>) {
        self.hooks.entry(kind).or_default().push(hook);
    }

    /// Cloned list so no map guard is held while hooks run.
    pub fn hooks_for(&self, kind: HookKind) -> Vec<Arc<dyn Hook>> {
        self.hooks
            .get(&kind)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: HookKind) -> usize {
        self.hooks.get(&kind).map(|e| e.len()).unwrap_or(0)
    }
}
