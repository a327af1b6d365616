// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use meshsdk_core::NodeAddress;
use serde_json::{Map, Value};

/// The `(node_alias, pipeline, plugin_signature, plugin_instance)` routing
/// tuple. Missing elements default to an empty marker rather than `None`,
/// per spec.md §4.2 step 5.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PayloadPath {
    pub node_alias: String,
    pub pipeline: String,
    pub plugin_signature: String,
    pub plugin_instance: String,
}

impl PayloadPath {
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        let elements: Vec<String> = match value {
            Some(Value::Array(arr)) => arr
                .iter()
                .map(|v| v.as_str().unwrap_or_default().to_string())
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        };
        let mut it = elements.into_iter();
        Self {
            node_alias: it.next().unwrap_or_default(),
            pipeline: it.next().unwrap_or_default(),
            plugin_signature: it.next().unwrap_or_default(),
            plugin_instance: it.next().unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn is_admin_net_monitor(&self) -> bool {
        self.pipeline == crate::fields::ADMIN_PIPELINE
            && self.plugin_signature == crate::fields::NETWORK_MONITOR_SIGNATURE
    }

    #[must_use]
    pub fn is_admin_net_config(&self) -> bool {
        self.pipeline == crate::fields::ADMIN_PIPELINE
            && self.plugin_signature == crate::fields::NET_CONFIG_MONITOR_SIGNATURE
    }
}

/// A decoded inbound message: sender, destination list, encryption state,
/// routing path, and the merged body.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub sender: Option<NodeAddress>,
    pub destination: Vec<NodeAddress>,
    pub encrypted: bool,
    pub path: PayloadPath,
    pub body: Map<String, Value>,
    pub signature: Option<String>,
}

impl Envelope {
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.body.get(crate::fields::SESSION_ID).and_then(Value::as_str)
    }

    #[must_use]
    pub fn net_config_data(&self) -> Option<&Map<String, Value>> {
        self.body.get(crate::fields::NET_CONFIG_DATA).and_then(Value::as_object)
    }

    #[must_use]
    pub fn current_network(&self) -> Option<&Map<String, Value>> {
        self.body.get(crate::fields::CURRENT_NETWORK).and_then(Value::as_object)
    }
}
