//! Polling loop.
//!
//! Running: poll, split the body, spawn one task per frame.
//! Stopping: fire `quitting` hooks once, then wait for spawned tasks.
//! Stopped: terminal.
//!
//! Only a poll timeout (or `quit()`) moves the loop out of Running. Every
//! per-frame failure is logged and contained inside its own task.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use chatbot_core::error::{ChatError, Result};
use chatbot_core::protocol::command::Command;
use chatbot_core::protocol::envelope::{decode_envelope, EventKind};
use chatbot_core::protocol::frame::{decode_frame, split_frames, Frame};

use crate::client::ChatClient;
use crate::dispatch::HookEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopping,
    Stopped,
}

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Connected,
    /// Ping received and echoed.
    Pinged,
    Dispatched(EventKind),
    /// Malformed frame or undecodable envelope.
    Dropped,
}

impl ChatClient {
    pub fn state(&self) -> LoopState {
        *self.inner().state.borrow()
    }

    /// Running -> Stopping. Returns false if the loop was already leaving Running.
    pub(crate) fn begin_stopping(&self) -> bool {
        self.inner().state.send_if_modified(|s| {
            if *s == LoopState::Running {
                *s = LoopState::Stopping;
                true
            } else {
                false
            }
        })
    }

    /// Drive the polling loop until a poll times out or `quit()` is called.
    pub async fn run(&self) -> Result<()> {
        if self.state() == LoopState::Stopped {
            return Err(ChatError::NotRunning);
        }
        if self.inner().started.swap(true, Ordering::SeqCst) {
            return Err(ChatError::Internal("polling loop already started".into()));
        }

        let transport_cfg = &self.cfg().transport;
        let permits = Arc::new(Semaphore::new(transport_cfg.max_inflight_frames));
        let mut state_rx = self.inner().state.subscribe();
        let mut tasks: JoinSet<()> = JoinSet::new();

        tracing::info!(
            user = %self.cfg().user,
            room = %self.session().room_id,
            "polling loop started"
        );

        while self.state() == LoopState::Running {
            while let Some(res) = tasks.try_join_next() {
                log_join(res);
            }

            // Any state change means we left Running.
            let polled = tokio::select! {
                res = self.poll() => res,
                _ = state_rx.changed() => break,
            };

            match polled {
                Ok(body) => {
                    tracing::trace!(bytes = body.len(), "poll response");
                    for raw in split_frames(body) {
                        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                            break;
                        };
                        let client = self.clone();
                        tasks.spawn(async move {
                            let outcome = client.process_frame(raw).await;
                            tracing::trace!(?outcome, "frame processed");
                            drop(permit);
                        });
                    }
                }
                Err(e) if e.is_fatal_to_loop() => {
                    tracing::error!(code = e.code().as_str(), error = %e, "poll failed; stopping");
                    self.begin_stopping();
                }
                Err(e) => {
                    tracing::warn!(code = e.code().as_str(), error = %e, "poll failed; retrying");
                    tokio::time::sleep(transport_cfg.retry_delay()).await;
                }
            }
        }

        self.shutdown(tasks).await;
        Ok(())
    }

    async fn poll(&self) -> Result<Bytes> {
        let query = self.next_query();
        self.inner().transport.poll(&query).await
    }

    /// Decode and dispatch one raw frame. Never fails: problems are logged.
    pub async fn process_frame(&self, raw: Bytes) -> FrameOutcome {
        let frame = match decode_frame(&raw) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(error = %e, "dropping frame");
                return FrameOutcome::Dropped;
            }
        };

        match frame {
            Frame::Connect => {
                tracing::info!("connected to chat");
                FrameOutcome::Connected
            }
            Frame::Ping => {
                if let Err(e) = self.send(Command::Ping).await {
                    tracing::warn!(error = %e, "ping echo failed");
                }
                FrameOutcome::Pinged
            }
            Frame::Message(payload) => {
                let event = match decode_envelope(&payload) {
                    Ok(ev) => ev,
                    Err(e) => {
                        tracing::warn!(code = e.code().as_str(), error = %e, "dropping envelope");
                        return FrameOutcome::Dropped;
                    }
                };
                tracing::debug!(event = event.kind.as_str(), "dispatching");
                self.dispatcher().dispatch(self, &event).await;
                FrameOutcome::Dispatched(event.kind)
            }
        }
    }

    async fn shutdown(&self, mut tasks: JoinSet<()>) {
        self.begin_stopping();

        let fired = self.dispatcher().fire(self, &HookEvent::Quitting).await;
        tracing::info!(hooks = fired, pending = tasks.len(), "stopping");

        let deadline = self.cfg().transport.shutdown_timeout();
        if tokio::time::timeout(deadline, drain(&mut tasks)).await.is_err() {
            tracing::warn!(
                remaining = tasks.len(),
                "shutdown deadline elapsed; detaching frame tasks"
            );
            tasks.detach_all();
        }

        self.inner().state.send_replace(LoopState::Stopped);
        tracing::info!("polling loop stopped");
    }
}

async fn drain(tasks: &mut JoinSet<()>) {
    while let Some(res) = tasks.join_next().await {
        log_join(res);
    }
}

fn log_join(res: std::result::Result<(), JoinError>) {
    if let Err(e) = res {
        tracing::error!(error = %e, "frame task failed");
    }
}
