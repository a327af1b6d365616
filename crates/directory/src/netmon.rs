// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use meshsdk_core::{EthAddress, NodeAddress};
use std::collections::HashMap;

/// One node's entry inside a supervisor's network-monitor snapshot.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct NetmonEntry {
    pub alias: String,
    pub eth_address: Option<EthAddress>,
    pub online: bool,
    pub is_supervisor: bool,
    pub whitelist: Vec<NodeAddress>,
    pub node_version: Option<String>,
    pub last_remote_time: Option<String>,
}

/// Retains the most recent network-status snapshot per supervisor address,
/// per spec.md §3.
#[derive(Debug, Default)]
pub struct NetworkSnapshots {
    per_supervisor: HashMap<NodeAddress, HashMap<NodeAddress, NetmonEntry>>,
}

impl NetworkSnapshots {
    pub fn record(&mut self, supervisor: NodeAddress, snapshot: HashMap<NodeAddress, NetmonEntry>) {
        self.per_supervisor.insert(supervisor, snapshot);
    }

    /// The snapshot with the greatest cardinality, picked as authoritative
    /// for reports.
    #[must_use]
    pub fn authoritative(&self) -> Option<(&NodeAddress, &HashMap<NodeAddress, NetmonEntry>)> {
        self.per_supervisor.iter().max_by_key(|(_, snapshot)| snapshot.len())
    }

    /// Nodes that have ever sent a netmon snapshot (i.e. every observed
    /// supervisor address), grounded on `__current_network_statuses`.
    #[must_use]
    pub fn active_supervisors(&self) -> Vec<NodeAddress> {
        self.per_supervisor.keys().cloned().collect()
    }
}
