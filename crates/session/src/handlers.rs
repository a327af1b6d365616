// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Heartbeat, notification, and payload handlers, per spec.md §4.4–§4.6.
//! Each is invoked by its dispatch worker once the envelope codec has
//! parsed and (if addressed to us) decrypted the inbound frame.

use crate::handle::SessionHandle;
use crate::netconfig;
use meshsdk_core::{EthAddress, NodeAddress};
use meshsdk_directory::NetmonEntry;
use meshsdk_envelope::{fields, Envelope};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Instant;

fn address_list(value: Option<&Value>) -> Vec<NodeAddress> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(NodeAddress::new).collect(),
        Some(Value::String(s)) => vec![NodeAddress::new(s.as_str())],
        _ => Vec::new(),
    }
}

/// True when a worker-filter is configured and `node_address` is not on it,
/// per spec.md §4.5 step 1 / §4.6 step 1.
fn is_filtered_out(handle: &SessionHandle, node_address: &NodeAddress) -> bool {
    let filters = &handle.inner.config.filter_workers;
    !filters.is_empty() && !filters.iter().any(|f| f == node_address.as_str())
}

fn pipelines_map_from_list(list: &[Value]) -> Map<String, Value> {
    let mut map = Map::new();
    for item in list {
        if let Some(name) = item.get(fields::NAME).and_then(Value::as_str) {
            map.insert(name.to_string(), item.clone());
        }
    }
    map
}

/// Shared by the heartbeat handler's legacy `CONFIG_STREAMS` path and the
/// payload handler's net-config-reply path: both deliver the same
/// `[{NAME: ..., ...}, ...]` shape into the directory and pipeline registry.
fn ingest_pipeline_list(handle: &SessionHandle, node_address: &NodeAddress, list: &[Value]) {
    let pipelines = pipelines_map_from_list(list);
    if pipelines.is_empty() {
        return;
    }
    {
        let mut directory = handle.inner.directory.lock().expect("directory lock poisoned");
        directory.ingest_pipelines(node_address, pipelines.clone());
    }
    let mut registry = handle.inner.pipelines.lock().expect("pipelines lock poisoned");
    for (name, config) in pipelines {
        registry.attach_or_update(node_address.clone(), name, config);
    }
}

fn netmon_entry_from_value(value: &Value) -> Option<NetmonEntry> {
    let obj = value.as_object()?;
    let alias = obj.get(fields::NETMON_EEID).and_then(Value::as_str).unwrap_or_default().to_string();
    let eth_address =
        obj.get(fields::NETMON_ETH_ADDRESS).and_then(Value::as_str).and_then(|s| EthAddress::parse(s).ok());
    let online = obj.get(fields::NETMON_STATUS_KEY).and_then(Value::as_str) == Some(fields::NETMON_STATUS_ONLINE);
    let is_supervisor = obj.get(fields::NETMON_IS_SUPERVISOR).and_then(Value::as_bool).unwrap_or(false);
    let whitelist = address_list(obj.get(fields::NETMON_WHITELIST));
    let node_version = obj.get(fields::NETMON_NODE_VERSION).and_then(Value::as_str).map(str::to_string);
    let last_remote_time = obj.get(fields::NETMON_LAST_REMOTE_TIME).and_then(Value::as_str).map(str::to_string);
    Some(NetmonEntry { alias, eth_address, online, is_supervisor, whitelist, node_version, last_remote_time })
}

/// Heartbeat handling, per spec.md §4.4. Unlike the notification and payload
/// handlers, no worker-filter check applies here: §4.4 does not list one,
/// unlike the explicit step 1 in §4.5/§4.6.
pub async fn handle_heartbeat(handle: &SessionHandle, envelope: Envelope) {
    let Some(node_address) = envelope.sender.clone() else {
        tracing::debug!("heartbeat has no sender address, dropping");
        return;
    };

    let mut body = envelope.body.clone();
    if let Some(encoded) = body.get(fields::ENCODED_DATA).and_then(Value::as_str) {
        match meshsdk_envelope::decompress_heartbeat_v2(encoded) {
            Some(decompressed) => {
                for (k, v) in decompressed {
                    body.insert(k, v);
                }
            }
            None => tracing::debug!(node = %node_address, "failed to decompress v2 heartbeat body"),
        }
    }

    let alias = body.get(fields::EE_ID).and_then(Value::as_str).unwrap_or_default().to_string();
    let eth_address = body.get(fields::EE_ETH_ADDR).and_then(Value::as_str).and_then(|s| EthAddress::parse(s).ok());
    let secured = body.get(fields::SECURED).and_then(Value::as_bool).unwrap_or(false);
    let whitelist = address_list(body.get(fields::EE_WHITELIST));

    let self_address = handle.address().clone();
    let online_timeout = handle.online_timeout();

    if !meshsdk_directory::compute_authorized(&self_address, &node_address, secured, &whitelist) {
        tracing::info!(
            error = %crate::error::SessionError::Unauthorized,
            node = %node_address,
            "heartbeat sender does not whitelist this node, no enforcement applied"
        );
    }

    let first_peer = {
        let mut directory = handle.inner.directory.lock().expect("directory lock poisoned");
        directory.ingest_heartbeat(
            &node_address,
            &alias,
            eth_address,
            &self_address,
            secured,
            &whitelist,
            body.clone(),
            online_timeout,
            Instant::now(),
        )
    };
    if first_peer {
        handle.inner.first_peer_reached.notify_waiters();
    }

    if handle.inner.config.legacy_heartbeat_pipelines {
        if let Some(streams) = body.get(fields::CONFIG_STREAMS).and_then(Value::as_array) {
            if !streams.is_empty() {
                ingest_pipeline_list(handle, &node_address, streams);
            }
        }
    }

    handle.inner.tracker.offer(&envelope);

    let callback = handle.inner.callbacks.heartbeat.lock().expect("callbacks lock poisoned").clone();
    if let Some(callback) = callback {
        callback(handle, &node_address, &body);
    }
}

/// Notification handling, per spec.md §4.5.
pub async fn handle_notification(handle: &SessionHandle, envelope: Envelope) {
    let Some(node_address) = envelope.sender.clone() else {
        tracing::debug!("notification has no sender address, dropping");
        return;
    };
    if is_filtered_out(handle, &node_address) {
        tracing::trace!(node = %node_address, "notification dropped by worker filter");
        return;
    }

    {
        let registry = handle.inner.pipelines.lock().expect("pipelines lock poisoned");
        registry.dispatch_notification(&envelope);
    }

    handle.inner.tracker.offer(&envelope);

    let callback = handle.inner.callbacks.notification.lock().expect("callbacks lock poisoned").clone();
    if let Some(callback) = callback {
        callback(handle, &node_address, &envelope.body);
    }
}

/// Payload handling, per spec.md §4.6.
pub async fn handle_payload(handle: &SessionHandle, envelope: Envelope) {
    let Some(node_address) = envelope.sender.clone() else {
        tracing::debug!("payload has no sender address, dropping");
        return;
    };
    if is_filtered_out(handle, &node_address) {
        tracing::trace!(node = %node_address, "payload dropped by worker filter");
        return;
    }

    if envelope.path.is_admin_net_monitor() {
        handle_network_snapshot(handle, &node_address, &envelope).await;
    } else if envelope.path.is_admin_net_config() {
        handle_net_config_reply(handle, &node_address, &envelope);
    }

    {
        let registry = handle.inner.pipelines.lock().expect("pipelines lock poisoned");
        registry.dispatch_payload(&envelope);
    }

    handle.inner.tracker.offer(&envelope);

    let callback = handle.inner.callbacks.payload.lock().expect("callbacks lock poisoned").clone();
    if let Some(callback) = callback {
        callback(
            handle,
            &node_address,
            &envelope.path.pipeline,
            &envelope.path.plugin_signature,
            &envelope.path.plugin_instance,
            &envelope.body,
        );
    }
}

async fn handle_network_snapshot(handle: &SessionHandle, supervisor: &NodeAddress, envelope: &Envelope) {
    let Some(current_network) = envelope.current_network() else {
        tracing::debug!(supervisor = %supervisor, "network snapshot payload has no CURRENT_NETWORK body");
        return;
    };
    handle.inner.first_netmon_message.notify_waiters();

    let mut snapshot = HashMap::new();
    for (addr, info) in current_network {
        if let Some(entry) = netmon_entry_from_value(info) {
            snapshot.insert(NodeAddress::new(addr.as_str()), entry);
        }
    }

    let self_address = handle.address().clone();
    let online_timeout = handle.online_timeout();
    let netconfig_request_delay = handle.netconfig_request_delay();

    let (first_peer_any, requests) = {
        let mut directory = handle.inner.directory.lock().expect("directory lock poisoned");
        directory.record_netmon_snapshot(supervisor.clone(), snapshot.clone());

        let mut first_peer_any = false;
        for (addr, entry) in &snapshot {
            let now = Instant::now();
            first_peer_any |= directory.ingest_netmon_entry(addr, entry, &self_address, online_timeout, now);
        }
        let requests = directory.peers_needing_netconfig(Instant::now(), online_timeout, netconfig_request_delay);
        (first_peer_any, requests)
    };

    if first_peer_any {
        handle.inner.first_peer_reached.notify_waiters();
    }

    for peer in requests {
        if let Err(e) = netconfig::request_net_config(handle, &peer).await {
            tracing::debug!(peer = %peer, error = %e, "failed to send net-config request");
            continue;
        }
        let mut directory = handle.inner.directory.lock().expect("directory lock poisoned");
        directory.mark_awaiting_netconfig(&peer, Instant::now());
    }
}

fn handle_net_config_reply(handle: &SessionHandle, sender: &NodeAddress, envelope: &Envelope) {
    let self_address = handle.address().clone();
    if !envelope.destination.iter().any(|d| d == &self_address) {
        tracing::debug!(sender = %sender, "net-config reply not addressed to this session, dropping");
        return;
    }
    if !envelope.encrypted {
        tracing::debug!(sender = %sender, "net-config reply was not encrypted, dropping");
        return;
    }
    let Some(net_config_data) = envelope.net_config_data() else {
        tracing::debug!(sender = %sender, "net-config reply has no NET_CONFIG_DATA body");
        return;
    };
    let operation = net_config_data.get(fields::OPERATION).and_then(Value::as_str).unwrap_or_default();
    if operation == fields::OPERATION_REQUEST {
        tracing::trace!(sender = %sender, "ignoring a net-config request echoed back to us");
        return;
    }
    if let Some(pipelines) = net_config_data.get(fields::PIPELINES).and_then(Value::as_array) {
        ingest_pipeline_list(handle, sender, pipelines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_handle;
    use meshsdk_envelope::PayloadPath;

    fn envelope_from(sender: &str, body: Map<String, Value>) -> Envelope {
        Envelope {
            sender: Some(NodeAddress::new(sender)),
            destination: Vec::new(),
            encrypted: false,
            path: PayloadPath::default(),
            body,
            signature: None,
        }
    }

    fn pipeline_entry(name: &str, extra: &[(&str, &str)]) -> Value {
        let mut entry = Map::new();
        entry.insert(fields::NAME.to_string(), Value::String(name.to_string()));
        for (k, v) in extra {
            entry.insert((*k).to_string(), Value::String((*v).to_string()));
        }
        Value::Object(entry)
    }

    #[tokio::test]
    async fn heartbeat_marks_sender_online_and_invokes_callback() {
        let (handle, _broker) = test_handle();
        let seen = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen_clone = seen.clone();
        *handle.inner.callbacks.heartbeat.lock().expect("callbacks lock poisoned") =
            Some(std::sync::Arc::new(move |_, addr, _| {
                assert_eq!(addr.as_str(), "peer-1");
                seen_clone.store(true, std::sync::atomic::Ordering::SeqCst);
            }));

        let mut body = Map::new();
        body.insert(fields::EE_ID.to_string(), Value::String("peer-1-alias".to_string()));
        body.insert(fields::SECURED.to_string(), Value::Bool(false));
        handle_heartbeat(&handle, envelope_from("peer-1", body)).await;

        assert!(seen.load(std::sync::atomic::Ordering::SeqCst));
        assert!(handle.is_peered(&NodeAddress::new("peer-1")));
    }

    #[tokio::test]
    async fn legacy_config_streams_are_ingested_when_enabled() {
        let (mut handle, _broker) = test_handle();
        std::sync::Arc::get_mut(&mut handle.inner).expect("sole owner").config.legacy_heartbeat_pipelines = true;

        let mut body = Map::new();
        body.insert(fields::EE_ID.to_string(), Value::String("peer-1".to_string()));
        body.insert(fields::SECURED.to_string(), Value::Bool(false));
        body.insert(fields::CONFIG_STREAMS.to_string(), Value::Array(vec![pipeline_entry("P1", &[])]));
        handle_heartbeat(&handle, envelope_from("peer-1", body)).await;

        assert!(handle.active_pipelines(&NodeAddress::new("peer-1")).contains(&"P1".to_string()));
    }

    #[tokio::test]
    async fn payload_to_net_config_monitor_ingests_pipelines() {
        let (handle, _broker) = test_handle();
        let self_address = handle.address().clone();

        // A net-config reply only ever arrives after this session has already
        // observed the peer via a heartbeat or network snapshot, which is what
        // creates its directory record; ingest_pipelines is a no-op otherwise.
        let mut heartbeat_body = Map::new();
        heartbeat_body.insert(fields::EE_ID.to_string(), Value::String("peer-1".to_string()));
        heartbeat_body.insert(fields::SECURED.to_string(), Value::Bool(false));
        handle_heartbeat(&handle, envelope_from("peer-1", heartbeat_body)).await;

        let mut net_config_data = Map::new();
        net_config_data.insert(fields::OPERATION.to_string(), Value::String(fields::OPERATION_REPLY.to_string()));
        net_config_data.insert(
            fields::PIPELINES.to_string(),
            Value::Array(vec![pipeline_entry("P1", &[("TYPE", "Void")])]),
        );

        let mut body = Map::new();
        body.insert(fields::NET_CONFIG_DATA.to_string(), Value::Object(net_config_data));

        let envelope = Envelope {
            sender: Some(NodeAddress::new("peer-1")),
            destination: vec![self_address],
            encrypted: true,
            path: PayloadPath {
                node_alias: "peer-1".to_string(),
                pipeline: fields::ADMIN_PIPELINE.to_string(),
                plugin_signature: fields::NET_CONFIG_MONITOR_SIGNATURE.to_string(),
                plugin_instance: "inst".to_string(),
            },
            body,
            signature: None,
        };

        handle_payload(&handle, envelope).await;

        assert_eq!(
            handle.pipeline_config(&NodeAddress::new("peer-1"), "P1"),
            Some(pipeline_entry("P1", &[("TYPE", "Void")]))
        );
    }
}
