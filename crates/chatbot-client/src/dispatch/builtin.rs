//! Built-in event handlers (roster upkeep, identity, message fan-out).

use serde::Deserialize;
use serde_json::Value;

use chatbot_core::error::{ChatError, Result};
use chatbot_core::protocol::command::Command;
use chatbot_core::protocol::envelope::{Event, EventKind};
use chatbot_core::Participant;

use super::hooks::HookEvent;
use crate::client::ChatClient;

pub(crate) async fn handle(client: &ChatClient, event: &Event) -> Result<()> {
    match event.kind {
        EventKind::Initial => on_initial(client, event),
        EventKind::Message => on_message(client, event).await,
        EventKind::Join => on_join(client, event).await,
        EventKind::Part | EventKind::Logout => on_leave(client, event),
        _ => {
            tracing::debug!(event = event.kind.as_str(), "no built-in handler");
            Ok(())
        }
    }
}

fn on_initial(client: &ChatClient, event: &Event) -> Result<()> {
    let models = event
        .data
        .pointer("/collections/users/models")
        .and_then(Value::as_array)
        .ok_or_else(|| ChatError::HandlerFailure("initial: missing users collection".into()))?;

    let users = models.iter().filter_map(|m| {
        let attrs = m.get("attrs")?;
        match Participant::deserialize(attrs) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(error = %e, "initial: skipping malformed user");
                None
            }
        }
    });
    let n = client.roster().upsert_all(users);
    tracing::info!(users = n, "roster snapshot received");
    Ok(())
}

async fn on_join(client: &ChatClient, event: &Event) -> Result<()> {
    let participant = participant_of(event)?;
    let own_cid = if participant.name == client.cfg().user {
        event.cid().filter(|cid| client.claim_identity(cid))
    } else {
        None
    };

    // Roster first: a failed init query must not lose our own record.
    tracing::info!(name = %participant.name, "joined the chat");
    client.roster().upsert(participant);

    if let Some(cid) = own_cid {
        tracing::info!(cid = %cid, "own join observed");
        if let Err(e) = client.send(Command::InitQuery { cid: Some(cid) }).await {
            tracing::error!(cid = %cid, code = e.code().as_str(), error = %e, "init query failed");
        }
    }
    Ok(())
}

fn on_leave(client: &ChatClient, event: &Event) -> Result<()> {
    let name = event.attr_name().ok_or_else(|| {
        ChatError::HandlerFailure(format!("{}: missing attrs.name", event.kind.as_str()))
    })?;

    tracing::info!(name = %name, "left the chat");
    client.roster().remove(name);
    Ok(())
}

async fn on_message(client: &ChatClient, event: &Event) -> Result<()> {
    let attrs = event
        .attrs()
        .ok_or_else(|| ChatError::HandlerFailure("message: missing attrs".into()))?;
    let text = attrs
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| ChatError::HandlerFailure("message: missing attrs.text".into()))?;
    let name = attrs.get("name").and_then(Value::as_str).unwrap_or_default();

    let Some(sender) = client.roster().lookup(name) else {
        tracing::debug!(name = %name, text = %text, "message from unknown sender dropped");
        return Ok(());
    };

    tracing::info!("<{}> {}", sender.name, text);
    client
        .dispatcher()
        .fire(client, &HookEvent::Message { text, sender: &sender })
        .await;
    Ok(())
}

fn participant_of(event: &Event) -> Result<Participant> {
    let attrs = event.attrs().ok_or_else(|| {
        ChatError::HandlerFailure(format!("{}: missing attrs", event.kind.as_str()))
    })?;
    Participant::deserialize(attrs)
        .map_err(|e| ChatError::HandlerFailure(format!("{}: bad attrs: {e}", event.kind.as_str())))
}
