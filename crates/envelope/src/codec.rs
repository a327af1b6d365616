// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use base64::Engine;
use meshsdk_core::NodeAddress;
use meshsdk_identity::Identity;
use serde_json::{Map, Value};
use std::io::Read;

use crate::envelope::{Envelope, PayloadPath};
use crate::error::{EnvelopeError, Result};
use crate::fields;
use crate::formatter::FormatterRegistry;

fn destination_list(value: Option<&Value>) -> Vec<NodeAddress> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(NodeAddress::new)
            .collect(),
        Some(Value::String(s)) => vec![NodeAddress::new(s.as_str())],
        _ => Vec::new(),
    }
}

/// Parses one raw inbound frame into an [`Envelope`], decrypting the inner
/// body when `local_address` is among the recipients.
///
/// # Errors
///
/// Returns [`EnvelopeError::Parse`] if the frame is not decodable JSON or no
/// formatter recognizes it, or [`EnvelopeError::Decrypt`] if a frame
/// addressed to `local_address` claims encryption but fails to decrypt.
/// Callers drop the frame with a diagnostic rather than propagating this
/// further, per spec.md §4.2's "recovered locally" policy. `identity` is only
/// consulted when the frame claims to be encrypted and addressed to us.
pub fn parse(
    raw: &[u8],
    local_address: &NodeAddress,
    identity: &dyn Identity,
    registry: &FormatterRegistry,
) -> Result<Envelope> {
    let outer: Map<String, Value> = match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(EnvelopeError::Parse("inbound frame is not a JSON object".to_string())),
        Err(e) => return Err(EnvelopeError::Parse(e.to_string())),
    };

    let encrypted = outer.get(fields::EE_IS_ENCRYPTED).and_then(Value::as_bool).unwrap_or(false);
    let mut merged = outer.clone();

    if encrypted {
        let destination = destination_list(outer.get(fields::EE_DESTINATION));
        if destination.iter().any(|d| d == local_address) {
            match decrypt_inner(&outer, identity) {
                Some(inner) => {
                    for (k, v) in inner {
                        merged.insert(k, v);
                    }
                    merged.remove(fields::EE_ENCRYPTED_DATA);
                }
                None => {
                    return Err(EnvelopeError::Decrypt(format!(
                        "message addressed to self at path {:?} failed to decrypt",
                        outer.get(fields::EE_PAYLOAD_PATH)
                    )));
                }
            }
        } else {
            tracing::trace!(
                path = ?outer.get(fields::EE_PAYLOAD_PATH),
                "message is encrypted but not addressed to this node, keeping outer fields only"
            );
        }
    }

    let body = registry
        .decode(&merged)
        .ok_or_else(|| EnvelopeError::Parse("no formatter recognized the inbound frame".to_string()))?;

    let sender = body.get(fields::EE_SENDER).and_then(Value::as_str).map(NodeAddress::new);
    let destination = destination_list(body.get(fields::EE_DESTINATION));
    let path = PayloadPath::from_value(body.get(fields::EE_PAYLOAD_PATH));
    let signature = body.get(fields::EE_SIGN).and_then(Value::as_str).map(str::to_string);

    Ok(Envelope { sender, destination, encrypted, path, body, signature })
}

fn decrypt_inner(outer: &Map<String, Value>, identity: &dyn Identity) -> Option<Map<String, Value>> {
    let encoded = outer.get(fields::EE_ENCRYPTED_DATA).and_then(Value::as_str)?;
    let sender_addr = outer.get(fields::SENDER_ADDR).and_then(Value::as_str)?;
    let ciphertext = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
    let plaintext = identity.decrypt(&ciphertext, &NodeAddress::new(sender_addr)).ok()?;
    match serde_json::from_slice::<Value>(&plaintext) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Decompresses a heartbeat's base64+deflate `ENCODED_DATA` field into its
/// inner mapping, per the `HEARTBEAT_VERSION` v2 wire format.
#[must_use]
pub fn decompress_heartbeat_v2(encoded_data: &str) -> Option<Map<String, Value>> {
    let compressed = base64::engine::general_purpose::STANDARD.decode(encoded_data).ok()?;
    let mut decoder = flate2::read::ZlibDecoder::new(compressed.as_slice());
    let mut decompressed = String::new();
    decoder.read_to_string(&mut decompressed).ok()?;
    match serde_json::from_str::<Value>(&decompressed) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
