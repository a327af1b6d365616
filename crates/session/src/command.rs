// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The outbound command builder: critical section → conditional encryption →
//! addressing wrapper → signature → publish, per spec.md §4.8.

use crate::action::CommandAction;
use crate::error::Result;
use crate::handle::SessionHandle;
use base64::Engine;
use meshsdk_broker::ChannelSet;
use meshsdk_core::{timestamp_now_rfc3339_micros, NodeAddress};
use meshsdk_envelope::fields;
use meshsdk_transaction::ResponseMatcher;
use serde_json::{Map, Value};
use std::time::Duration;
use uuid::Uuid;

/// Where an outbound command is headed. `None` is used for commands that
/// have no specific recipient (rare; most commands target at least one
/// node). Entries may be aliases or raw addresses — resolved via the
/// directory before anything is published.
#[derive(Debug, Clone, Default)]
pub enum CommandDestination {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl CommandDestination {
    fn resolve(&self, handle: &SessionHandle) -> Result<Vec<NodeAddress>> {
        match self {
            Self::None => Ok(Vec::new()),
            Self::One(id) => Ok(vec![handle.resolve_address(id)?]),
            Self::Many(ids) => ids.iter().map(|id| handle.resolve_address(id)).collect(),
        }
    }
}

fn critical_section(action: CommandAction, payload: Value) -> Map<String, Value> {
    let mut critical = Map::new();
    critical.insert(fields::ACTION.to_string(), Value::String(action.as_wire_str().to_string()));
    critical.insert(fields::PAYLOAD.to_string(), payload);
    critical
}

/// Builds and publishes one command envelope. See spec.md §4.8 for the
/// five-step construction order this follows literally.
///
/// # Errors
///
/// Returns [`SessionError::AddressUnresolved`] if `destination` names an
/// alias the directory has never observed, or a broker/identity error if
/// encryption, signing, or publish fails.
pub async fn send_command(
    handle: &SessionHandle,
    action: CommandAction,
    payload: Value,
    destination: &CommandDestination,
    session_id: Option<String>,
) -> Result<()> {
    let resolved = destination.resolve(handle)?;
    let critical = critical_section(action, payload);
    let self_address = handle.address().clone();

    let mut body = if handle.inner.config.encrypt_comms && !resolved.is_empty() {
        let plaintext = serde_json::to_vec(&critical).unwrap_or_default();
        let ciphertext = handle.inner.identity.encrypt(&plaintext, &resolved)?;
        let mut body = Map::new();
        body.insert(fields::EE_IS_ENCRYPTED.to_string(), Value::Bool(true));
        body.insert(
            fields::EE_ENCRYPTED_DATA.to_string(),
            Value::String(base64::engine::general_purpose::STANDARD.encode(ciphertext)),
        );
        body
    } else if handle.inner.config.encrypt_comms {
        let mut body = critical;
        body.insert(fields::EE_IS_ENCRYPTED.to_string(), Value::Bool(false));
        body.insert(
            fields::EE_ENCRYPTED_DATA.to_string(),
            Value::String("ERROR: encryption requested but no destination to encrypt for".to_string()),
        );
        body
    } else {
        let mut body = critical;
        body.insert(fields::EE_IS_ENCRYPTED.to_string(), Value::Bool(false));
        body
    };

    body.insert(
        fields::EE_DESTINATION.to_string(),
        Value::Array(resolved.iter().map(|a| Value::String(a.as_str().to_string())).collect()),
    );
    body.insert(fields::SENDER_ADDR.to_string(), Value::String(self_address.as_str().to_string()));
    body.insert(fields::EE_SENDER.to_string(), Value::String(self_address.as_str().to_string()));
    body.insert(
        fields::SESSION_ID.to_string(),
        Value::String(session_id.unwrap_or_else(|| Uuid::new_v4().to_string())),
    );
    body.insert(
        fields::INITIATOR_ID.to_string(),
        Value::String(handle.inner.config.name.clone().unwrap_or_else(|| self_address.to_string())),
    );
    body.insert(fields::TIME.to_string(), Value::String(timestamp_now_rfc3339_micros()));

    let to_sign = serde_json::to_vec(&body).unwrap_or_default();
    let signature = handle.inner.identity.sign(&to_sign)?;
    body.insert(fields::EE_SIGN.to_string(), Value::String(signature));

    let raw = serde_json::to_vec(&body).unwrap_or_default();

    if resolved.is_empty() {
        handle.inner.broker.publish(&handle.inner.channels.ctrl, raw).await?;
        return Ok(());
    }
    for address in &resolved {
        let topic = ChannelSet::derive(&handle.inner.config.root_topic, address.as_str()).ctrl;
        handle.inner.broker.publish(&topic, raw.clone()).await?;
    }
    Ok(())
}

/// Registers a transaction awaiting `matchers`, then publishes the command
/// that should elicit them. The caller polls the returned handle.
///
/// # Errors
///
/// Same as [`send_command`].
pub async fn send_command_awaiting(
    handle: &SessionHandle,
    action: CommandAction,
    payload: Value,
    destination: &CommandDestination,
    session_id: Option<String>,
    matchers: Vec<Box<dyn ResponseMatcher>>,
    timeout: Duration,
) -> Result<meshsdk_transaction::TransactionHandle> {
    let sid = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let tx_handle = handle.inner.tracker.register(sid.clone(), matchers, timeout);
    send_command(handle, action, payload, destination, Some(sid)).await?;
    Ok(tx_handle)
}
