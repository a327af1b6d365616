// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Net-config request protocol, per spec.md §4.7: ask a peer's
//! net-config-monitor plugin instance for its active pipeline
//! configurations. Distinct from [`crate::command`]'s action-code commands —
//! this is its own wire shape, addressed straight at the admin pipeline.

use crate::error::Result;
use crate::handle::SessionHandle;
use base64::Engine;
use meshsdk_broker::ChannelSet;
use meshsdk_core::{timestamp_now_rfc3339_micros, NodeAddress};
use meshsdk_envelope::fields;
use serde_json::{Map, Value};

/// Builds, encrypts, signs, and publishes one net-config request to `peer`,
/// per spec.md §4.7. Fire-and-forget: the caller is not expected to await a
/// reply here, only to have updated the directory's last-request timestamp.
///
/// # Errors
///
/// Returns an error if encryption, signing, or publish fails.
pub async fn request_net_config(handle: &SessionHandle, peer: &NodeAddress) -> Result<()> {
    let mut net_config_data = Map::new();
    net_config_data.insert(fields::OPERATION.to_string(), Value::String(fields::OPERATION_REQUEST.to_string()));
    net_config_data.insert(fields::DESTINATION.to_string(), Value::String(peer.as_str().to_string()));

    let self_address = handle.address().clone();

    let mut inner = Map::new();
    inner.insert(fields::NET_CONFIG_DATA.to_string(), Value::Object(net_config_data));
    inner.insert(
        fields::EE_PAYLOAD_PATH.to_string(),
        Value::Array(vec![
            Value::String(self_address.as_str().to_string()),
            Value::String(fields::ADMIN_PIPELINE.to_string()),
            Value::String(fields::NET_CONFIG_MONITOR_SIGNATURE.to_string()),
            Value::Null,
        ]),
    );

    let plaintext = serde_json::to_vec(&inner).unwrap_or_default();
    let ciphertext = handle.inner.identity.encrypt(&plaintext, std::slice::from_ref(peer))?;

    let mut wrapped = Map::new();
    wrapped.insert(fields::EE_IS_ENCRYPTED.to_string(), Value::Bool(true));
    wrapped.insert(
        fields::EE_ENCRYPTED_DATA.to_string(),
        Value::String(base64::engine::general_purpose::STANDARD.encode(ciphertext)),
    );
    wrapped.insert(
        fields::EE_DESTINATION.to_string(),
        Value::Array(vec![Value::String(peer.as_str().to_string())]),
    );
    wrapped.insert(fields::SENDER_ADDR.to_string(), Value::String(self_address.as_str().to_string()));
    wrapped.insert(fields::EE_SENDER.to_string(), Value::String(self_address.as_str().to_string()));
    wrapped.insert(fields::TIME.to_string(), Value::String(timestamp_now_rfc3339_micros()));

    let to_sign = serde_json::to_vec(&wrapped).unwrap_or_default();
    let signature = handle.inner.identity.sign(&to_sign)?;
    wrapped.insert(fields::EE_SIGN.to_string(), Value::String(signature));

    let raw = serde_json::to_vec(&wrapped).unwrap_or_default();
    let topic = ChannelSet::derive(&handle.inner.config.root_topic, peer.as_str()).ctrl;
    handle.inner.broker.publish(&topic, raw).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_handle;
    use meshsdk_broker::BrokerClient;
    use meshsdk_identity::Identity;

    #[tokio::test]
    async fn request_is_published_on_the_peers_ctrl_channel_encrypted() {
        let (handle, broker) = test_handle();
        // Encryption resolves the recipient's public key from its address, so
        // the peer must be a real generated identity rather than an opaque string.
        let peer_identity = meshsdk_identity::Secp256k1Identity::generate();

        let topic = ChannelSet::derive(&handle.inner.config.root_topic, peer_identity.address().as_str()).ctrl;
        let mut rx = broker.subscribe(&topic).await.expect("subscribes");

        request_net_config(&handle, peer_identity.address()).await.expect("publishes");

        let raw = rx.try_recv().expect("frame delivered on the peer's ctrl channel");
        let body: Value = serde_json::from_slice(&raw).expect("valid json");
        assert_eq!(body[fields::EE_IS_ENCRYPTED], Value::Bool(true));
        assert_eq!(
            body[fields::EE_DESTINATION],
            Value::Array(vec![Value::String(peer_identity.address().as_str().to_string())])
        );
    }
}
