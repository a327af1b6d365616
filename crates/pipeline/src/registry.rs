// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use crate::handle::{Ownership, PipelineHandle};
use meshsdk_core::NodeAddress;
use meshsdk_envelope::Envelope;
use serde_json::Value;
use std::collections::HashMap;

/// All pipeline handles this Session knows about, owned or attached, keyed
/// by `(node_address, pipeline name)`.
#[derive(Default)]
pub struct PipelineRegistry {
    handles: HashMap<(NodeAddress, String), PipelineHandle>,
}

impl PipelineRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_owned(&mut self, node_address: NodeAddress, name: String, config: Value) -> bool {
        let key = (node_address.clone(), name.clone());
        if self.handles.contains_key(&key) {
            return false;
        }
        self.handles.insert(key, PipelineHandle::new(node_address, name, Ownership::Owned, config));
        true
    }

    /// Ingests a remotely-learned pipeline config, attaching a handle if one
    /// doesn't already exist for this `(node, name)` pair.
    pub fn attach_or_update(&mut self, node_address: NodeAddress, name: String, config: Value) {
        let key = (node_address.clone(), name.clone());
        if let Some(existing) = self.handles.get_mut(&key) {
            existing.update_config(config);
        } else {
            self.handles.insert(key, PipelineHandle::new(node_address, name, Ownership::Attached, config));
        }
    }

    #[must_use]
    pub fn get(&self, node_address: &NodeAddress, name: &str) -> Option<&PipelineHandle> {
        self.handles.get(&(node_address.clone(), name.to_string()))
    }

    pub fn get_mut(&mut self, node_address: &NodeAddress, name: &str) -> Option<&mut PipelineHandle> {
        self.handles.get_mut(&(node_address.clone(), name.to_string()))
    }

    pub fn remove(&mut self, node_address: &NodeAddress, name: &str) -> Option<PipelineHandle> {
        self.handles.remove(&(node_address.clone(), name.to_string()))
    }

    #[must_use]
    pub fn owned(&self) -> Vec<&PipelineHandle> {
        self.handles.values().filter(|h| h.is_owned()).collect()
    }

    /// Routes a payload envelope to whichever handle matches both the
    /// sender's node address and the envelope's pipeline name.
    pub fn dispatch_payload(&self, envelope: &Envelope) {
        let Some(sender) = envelope.sender.as_ref() else { return };
        for handle in self.handles.values().filter(|h| &h.node_address == sender) {
            handle.dispatch_payload(envelope);
        }
    }

    pub fn dispatch_notification(&self, envelope: &Envelope) {
        let Some(sender) = envelope.sender.as_ref() else { return };
        for handle in self.handles.values().filter(|h| &h.node_address == sender) {
            handle.dispatch_notification(envelope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_owned_rejects_duplicate_name_on_same_node() {
        let mut registry = PipelineRegistry::new();
        let node = NodeAddress::new("n1");
        assert!(registry.create_owned(node.clone(), "P1".to_string(), Value::Null));
        assert!(!registry.create_owned(node, "P1".to_string(), Value::Null));
    }

    #[test]
    fn same_pipeline_name_allowed_on_different_nodes() {
        let mut registry = PipelineRegistry::new();
        assert!(registry.create_owned(NodeAddress::new("n1"), "P1".to_string(), Value::Null));
        assert!(registry.create_owned(NodeAddress::new("n2"), "P1".to_string(), Value::Null));
    }

    #[test]
    fn attach_or_update_reuses_existing_handle() {
        let mut registry = PipelineRegistry::new();
        let node = NodeAddress::new("n1");
        registry.attach_or_update(node.clone(), "P1".to_string(), Value::Bool(false));
        registry.attach_or_update(node.clone(), "P1".to_string(), Value::Bool(true));

        assert_eq!(registry.get(&node, "P1").map(|h| h.config.clone()), Some(Value::Bool(true)));
    }
}
