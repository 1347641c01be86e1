//! Shared client handle.
//!
//! `ChatClient` is a cheap `Arc` handle. Every per-frame task holds a clone;
//! the roster is the only state those tasks mutate.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use tokio::sync::watch;

use chatbot_core::error::{ChatError, Result};
use chatbot_core::protocol::command::Command;
use chatbot_core::Participant;

use crate::config::BotConfig;
use crate::dispatch::{Dispatcher, Hook, HookKind};
use crate::plugin::Plugin;
use crate::poller::LoopState;
use crate::roster::Roster;
use crate::session::SessionParams;
use crate::transport::{PollQuery, RequestClock, Transport};

#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<ClientInner>,
}

/// Non-owning handle, for plugins and hooks that outlive a single call.
///
/// The client owns its hooks and plugins, so a strong `ChatClient` stored
/// inside one of them is a cycle and the client is never dropped.
#[derive(Clone)]
pub struct WeakChatClient {
    inner: Weak<ClientInner>,
}

impl WeakChatClient {
    /// `None` once every strong handle is gone.
    pub fn upgrade(&self) -> Option<ChatClient> {
        self.inner.upgrade().map(|inner| ChatClient { inner })
    }
}

pub(crate) struct ClientInner {
    pub(crate) cfg: BotConfig,
    pub(crate) session: SessionParams,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) roster: Roster,
    /// Our connection id; set once, by our own first join.
    pub(crate) client_id: OnceLock<String>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) plugins: Mutex<Vec<Arc<dyn Plugin>>>,
    pub(crate) clock: RequestClock,
    pub(crate) state: watch::Sender<LoopState>,
    pub(crate) started: AtomicBool,
}

impl ChatClient {
    pub fn new(cfg: BotConfig, session: SessionParams, transport: Arc<dyn Transport>) -> Self {
        let (state, _) = watch::channel(LoopState::Running);
        Self {
            inner: Arc::new(ClientInner {
                cfg,
                session,
                transport,
                roster: Roster::new(),
                client_id: OnceLock::new(),
                dispatcher: Dispatcher::new(),
                plugins: Mutex::new(Vec::new()),
                clock: RequestClock::new(),
                state,
                started: AtomicBool::new(false),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakChatClient {
        WeakChatClient {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn inner(&self) -> &ClientInner {
        &self.inner
    }

    pub fn cfg(&self) -> &BotConfig {
        &self.inner.cfg
    }

    pub fn session(&self) -> &SessionParams {
        &self.inner.session
    }

    pub fn roster(&self) -> &Roster {
        &self.inner.roster
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn participant(&self, name: &str) -> Option<Participant> {
        self.inner.roster.lookup(name)
    }

    pub fn participants(&self) -> Vec<Participant> {
        self.inner.roster.snapshot()
    }

    /// Connection id, once our own join has been seen.
    pub fn client_id(&self) -> Option<&str> {
        self.inner.client_id.get().map(String::as_str)
    }

    /// Whether the wiki reported us as a chat moderator.
    pub fn is_chat_mod(&self) -> bool {
        self.inner.session.is_chat_mod
    }

    /// Set the connection id if still unset. Only the first caller wins.
    pub(crate) fn claim_identity(&self, cid: &str) -> bool {
        self.inner.client_id.set(cid.to_string()).is_ok()
    }

    // --------------------
    // Hook registration
    // --------------------

    pub fn register(&self, kind: HookKind, hook: Arc<dyn Hook>) {
        tracing::debug!(hook = kind.as_str(), "hook registered");
        self.inner.dispatcher.register(kind, hook);
    }

    /// Register by canonical event name (`"message"`, ..., `"quitting"`).
    pub fn register_named(&self, event: &str, hook: Arc<dyn Hook>) -> Result<()> {
        let kind: HookKind = event.parse()?;
        self.register(kind, hook);
        Ok(())
    }

    /// Construct a plugin with a reference to this client, then let it register its hooks.
    /// Build and register a plugin. Plugins that keep the client around
    /// should store `client.downgrade()`; hooks already get `&ChatClient`
    /// on every call.
    pub fn add_plugin<P, F>(&self, factory: F)
    where
        P: Plugin + 'static,
        F: FnOnce(&ChatClient) -> P,
    {
        let plugin = Arc::new(factory(self));
        Arc::clone(&plugin).register(self);
        tracing::info!(plugin = plugin.name(), "plugin loaded");
        self.inner
            .plugins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(plugin);
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.inner
            .plugins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|p| p.name())
            .collect()
    }

    // --------------------
    // Commands
    // --------------------

    pub async fn send_msg(&self, text: &str) -> Result<()> {
        self.send(Command::SendMessage { text }).await
    }

    pub async fn kick(&self, target: &str) -> Result<()> {
        if self.client_id().is_none() {
            tracing::warn!(user = %target, "kick before own join: cid is null");
        }
        self.send(Command::Kick {
            cid: self.client_id(),
            target,
        })
        .await
    }

    /// Send a logout frame and stop the polling loop.
    pub async fn quit(&self) -> Result<()> {
        if self.state() == LoopState::Stopped {
            return Err(ChatError::NotRunning);
        }
        let sent = self
            .send(Command::Logout {
                cid: self.client_id(),
            })
            .await;
        if let Err(e) = &sent {
            tracing::warn!(error = %e, "logout frame not delivered");
        }
        self.begin_stopping();
        sent
    }

    pub(crate) async fn send(&self, cmd: Command<'_>) -> Result<()> {
        let body = cmd.encode()?;
        let query = self.next_query();
        tracing::debug!(command = cmd.name(), "sending command");
        self.inner.transport.post(&query, body).await
    }

    pub(crate) fn next_query(&self) -> PollQuery {
        self.inner
            .session
            .query(&self.inner.cfg.user, self.inner.clock.next_token())
    }
}
