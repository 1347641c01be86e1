use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use chatbot_core::error::Result;
use chatbot_core::protocol::envelope::{Event, EventKind};

use super::builtin;
use super::hooks::{Hook, HookEvent, HookKind, HookRegistry};
use crate::client::ChatClient;

/// Routes canonical events to the built-in handler and to external hooks.
#[derive(Default)]
pub struct Dispatcher {
    hooks: HookRegistry,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            hooks: HookRegistry::new(),
        }
    }

    pub fn register(&self, kind: HookKind, hook: Arc<dyn Hook>) {
        self.hooks.register(kind, hook);
    }

    pub fn hook_count(&self, kind: HookKind) -> usize {
        self.hooks.count(kind)
    }

    /// Built-in handler first, then the event's hooks in registration order.
    ///
    /// `message` hooks are not fired here: the built-in message handler
    /// fires them once the sender is resolved.
    pub async fn dispatch(&self, client: &ChatClient, event: &Event) {
        let name = event.kind.as_str();
        contain(name, "builtin", builtin::handle(client, event)).await;

        if event.kind == EventKind::Message {
            return;
        }
        let Some(kind) = HookKind::for_event(&event.kind) else {
            return;
        };
        self.fire(client, &HookEvent::Data { kind, data: &event.data })
            .await;
    }

    /// Run every hook registered for `event.kind()`. Returns how many succeeded.
    pub async fn fire(&self, client: &ChatClient, event: &HookEvent<'_>) -> usize {
        let kind = event.kind();
        let mut ok = 0;
        for hook in self.hooks.hooks_for(kind) {
            if contain(kind.as_str(), "hook", hook.call(client, event)).await {
                ok += 1;
            }
        }
        ok
    }
}

/// Await a handler, turning errors and panics into log lines.
async fn contain<F>(event: &str, stage: &'static str, fut: F) -> bool
where
    F: Future<Output = Result<()>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(
                event = %event,
                stage,
                code = e.code().as_str(),
                error = %e,
                "handler failed"
            );
            false
        }
        Err(panic) => {
            tracing::error!(
                event = %event,
                stage,
                panic = %panic_message(&*panic),
                "handler panicked"
            );
            false
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
