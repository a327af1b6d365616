// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use crate::callback::InstanceCallbacks;
use meshsdk_core::NodeAddress;
use meshsdk_envelope::Envelope;
use serde_json::Value;
use std::collections::HashMap;

/// Whether a pipeline handle was created locally (and is therefore closable
/// by this Session) or learned about via a remote config/net-config reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    Attached,
}

/// One pipeline deployed on one node, identified by `(node_address, name)`.
/// Per spec.md §3, pipeline names are unique per node address.
pub struct PipelineHandle {
    pub node_address: NodeAddress,
    pub name: String,
    pub ownership: Ownership,
    pub config: Value,
    callbacks: HashMap<(String, String), InstanceCallbacks>,
}

impl PipelineHandle {
    #[must_use]
    pub fn new(node_address: NodeAddress, name: String, ownership: Ownership, config: Value) -> Self {
        Self { node_address, name, ownership, callbacks: HashMap::new(), config }
    }

    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    pub fn register_callbacks(
        &mut self,
        plugin_signature: impl Into<String>,
        plugin_instance: impl Into<String>,
        callbacks: InstanceCallbacks,
    ) {
        self.callbacks.insert((plugin_signature.into(), plugin_instance.into()), callbacks);
    }

    /// Routes an inbound payload envelope to the matching instance's data
    /// callback, if the path names this pipeline and a callback is
    /// registered for that `(signature, instance)` pair.
    pub fn dispatch_payload(&self, envelope: &Envelope) {
        if envelope.path.pipeline != self.name {
            return;
        }
        if let Some(callbacks) = self
            .callbacks
            .get(&(envelope.path.plugin_signature.clone(), envelope.path.plugin_instance.clone()))
        {
            if let Some(on_data) = &callbacks.on_data {
                on_data(envelope);
            }
        }
    }

    /// Routes an inbound notification envelope the same way.
    pub fn dispatch_notification(&self, envelope: &Envelope) {
        if envelope.path.pipeline != self.name {
            return;
        }
        if let Some(callbacks) = self
            .callbacks
            .get(&(envelope.path.plugin_signature.clone(), envelope.path.plugin_instance.clone()))
        {
            if let Some(on_notification) = &callbacks.on_notification {
                on_notification(envelope);
            }
        }
    }

    pub fn update_config(&mut self, config: Value) {
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshsdk_envelope::PayloadPath;
    use serde_json::Map;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn envelope(pipeline: &str, signature: &str, instance: &str) -> Envelope {
        Envelope {
            sender: None,
            destination: Vec::new(),
            encrypted: false,
            path: PayloadPath {
                node_alias: String::new(),
                pipeline: pipeline.to_string(),
                plugin_signature: signature.to_string(),
                plugin_instance: instance.to_string(),
            },
            body: Map::new(),
            signature: None,
        }
    }

    #[test]
    fn dispatch_payload_only_invokes_matching_instance() {
        let mut handle = PipelineHandle::new(
            NodeAddress::new("n1"),
            "P1".to_string(),
            Ownership::Owned,
            Value::Null,
        );
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();
        handle.register_callbacks(
            "SIG",
            "inst-1",
            InstanceCallbacks {
                on_data: Some(Arc::new(move |_| called_clone.store(true, Ordering::SeqCst))),
                on_notification: None,
            },
        );

        handle.dispatch_payload(&envelope("P1", "SIG", "inst-2"));
        assert!(!called.load(Ordering::SeqCst));

        handle.dispatch_payload(&envelope("P1", "SIG", "inst-1"));
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn dispatch_ignores_envelopes_for_other_pipelines() {
        let mut handle = PipelineHandle::new(
            NodeAddress::new("n1"),
            "P1".to_string(),
            Ownership::Owned,
            Value::Null,
        );
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();
        handle.register_callbacks(
            "SIG",
            "inst-1",
            InstanceCallbacks {
                on_data: Some(Arc::new(move |_| called_clone.store(true, Ordering::SeqCst))),
                on_notification: None,
            },
        );

        handle.dispatch_payload(&envelope("OTHER", "SIG", "inst-1"));
        assert!(!called.load(Ordering::SeqCst));
    }
}
