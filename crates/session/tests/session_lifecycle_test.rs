// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

#![allow(clippy::unwrap_used, clippy::expect_used)]

use meshsdk_broker::{BrokerClient, LoopbackBroker};
use meshsdk_config::SessionConfig;
use meshsdk_envelope::fields;
use meshsdk_identity::{Identity, Secp256k1Identity};
use meshsdk_session::{CommandAction, CommandDestination, Session, SessionError};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn plain_config() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.encrypt_comms = false;
    config.host = Some("broker.example.test".to_string());
    config
}

fn heartbeat_frame(sender: &str, alias: &str) -> Vec<u8> {
    json!({
        fields::EE_SENDER: sender,
        fields::EE_ID: alias,
        fields::SECURED: false,
    })
    .to_string()
    .into_bytes()
}

/// A network-monitor snapshot frame, as published on a supervisor's own
/// `payloads` channel: routes through `handle_payload` to
/// `handle_network_snapshot` and unblocks `startup`'s liveness gate.
fn netmon_frame(sender: &str) -> Vec<u8> {
    json!({
        fields::EE_SENDER: sender,
        fields::EE_PAYLOAD_PATH: ["", fields::ADMIN_PIPELINE, fields::NETWORK_MONITOR_SIGNATURE, ""],
        fields::CURRENT_NETWORK: {},
    })
    .to_string()
    .into_bytes()
}

/// A peer observed via heartbeat becomes reachable through `wait_for_node`.
#[tokio::test]
async fn session_discovers_a_peer_from_an_inbound_heartbeat() {
    let identity = Arc::new(Secp256k1Identity::generate());
    let self_address = identity.address().clone();
    let broker = Arc::new(LoopbackBroker::new());
    let session = Session::new(identity, broker.clone(), plain_config());

    let ctrl_topic = format!("lummetry/{}/ctrl", self_address.as_str());
    assert!(!session.wait_for_node("peer-1", Duration::from_millis(50)).await);

    broker.inject(&ctrl_topic, heartbeat_frame("peer-1", "peer-1-alias"));
    let found = session.wait_for_node("peer-1", Duration::from_secs(1)).await;
    assert!(found, "session should observe peer-1 after its heartbeat arrives");

    session.close(false, true).await;
}

/// `create_pipeline` publishes an `UPDATE_CONFIG` command on the target
/// node's own ctrl channel, addressed and signed; `close_pipeline` follows
/// up with `ARCHIVE_CONFIG` on the same channel.
#[tokio::test]
async fn create_and_close_pipeline_publish_the_expected_commands() {
    let identity = Arc::new(Secp256k1Identity::generate());
    let broker = Arc::new(LoopbackBroker::new());
    let session = Session::new(identity, broker.clone(), plain_config());
    // Give the heartbeat worker a chance to subscribe before injecting.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let peer = Arc::new(Secp256k1Identity::generate());
    let peer_address = peer.address().clone();
    broker.inject(
        &format!("lummetry/{}/ctrl", session.handle().address().as_str()),
        heartbeat_frame(peer_address.as_str(), "peer-alias"),
    );
    assert!(session.wait_for_node(peer_address.as_str(), Duration::from_secs(1)).await);

    let peer_ctrl = format!("lummetry/{}/ctrl", peer_address.as_str());
    let mut peer_rx = broker.subscribe(&peer_ctrl).await.expect("subscribes to the peer's own channel");

    session
        .create_pipeline(peer_address.as_str(), "my-pipeline", json!({"TYPE": "Void"}))
        .await
        .expect("publishes UPDATE_CONFIG");
    let raw = peer_rx.try_recv().expect("update_config command arrives");
    let body: Value = serde_json::from_slice(&raw).expect("valid json");
    assert_eq!(body[fields::ACTION], Value::String(CommandAction::UpdateConfig.as_wire_str().to_string()));
    assert_eq!(body[fields::PAYLOAD][fields::NAME], Value::String("my-pipeline".to_string()));

    session.close_pipeline(peer_address.as_str(), "my-pipeline").await.expect("publishes ARCHIVE_CONFIG");
    let raw = peer_rx.try_recv().expect("archive_config command arrives");
    let body: Value = serde_json::from_slice(&raw).expect("valid json");
    assert_eq!(body[fields::ACTION], Value::String(CommandAction::ArchiveConfig.as_wire_str().to_string()));
    assert_eq!(body[fields::PAYLOAD][fields::NAME], Value::String("my-pipeline".to_string()));

    session.close(false, true).await;
}

/// `startup` connects the broker and spawns the supervisor; `close` tears
/// the whole thing down (workers + supervisor) and is safe to call twice.
#[tokio::test]
async fn startup_then_close_is_a_clean_full_cycle() {
    let identity = Arc::new(Secp256k1Identity::generate());
    let self_address = identity.address().clone();
    let broker = Arc::new(LoopbackBroker::new());
    let session = Session::new(identity, broker.clone(), plain_config());
    // Give the payload worker a chance to subscribe before injecting.
    tokio::time::sleep(Duration::from_millis(20)).await;

    // A network-monitor snapshot unblocks startup's first-netmon-message gate
    // immediately, so this test doesn't have to wait out the real (30s)
    // startup timeout.
    broker.inject(
        &format!("lummetry/{}/payloads", self_address.as_str()),
        netmon_frame("supervisor-1"),
    );

    tokio::time::timeout(Duration::from_secs(2), session.startup())
        .await
        .expect("startup does not hang")
        .expect("startup succeeds against a loopback broker");
    assert!(broker.is_connected());

    tokio::time::timeout(Duration::from_secs(2), session.close(true, true))
        .await
        .expect("close joins workers and supervisor promptly");
    tokio::time::timeout(Duration::from_secs(1), session.close(true, true))
        .await
        .expect("second close is a fast no-op");
}

/// A command addressed at a destination this Session has never observed
/// is rejected before anything is published.
#[tokio::test]
async fn send_command_rejects_an_unresolved_destination() {
    let identity = Arc::new(Secp256k1Identity::generate());
    let broker = Arc::new(LoopbackBroker::new());
    let session = Session::new(identity, broker, plain_config());

    let result = session
        .send_command(CommandAction::Stop, Value::Null, &CommandDestination::One("unknown".to_string()))
        .await;
    assert!(result.is_err());
}

/// `startup` fails synchronously, before touching the broker, when no
/// config layer ever resolved a host.
#[tokio::test]
async fn startup_rejects_a_config_with_no_host() {
    let identity = Arc::new(Secp256k1Identity::generate());
    let broker = Arc::new(LoopbackBroker::new());
    let mut config = SessionConfig::default();
    config.encrypt_comms = false;
    config.host = None;
    let session = Session::new(identity, broker, config);

    let result = session.startup().await;
    assert!(matches!(result, Err(SessionError::ConfigMissing(_))), "got {result:?}");
}
