// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The live peer directory: node address ↔ alias ↔ EVM address, last-seen
//! and authorization tracking, and the per-supervisor network snapshot
//! cache. Exclusively owned by the Session and mutated only under its lock
//! (the lock itself lives in `meshsdk-session`; this crate is just the pure
//! data structure).

mod netmon;
mod record;

pub use netmon::{NetmonEntry, NetworkSnapshots};
pub use record::{NodeRecord, PeerState};

use meshsdk_core::{EthAddress, NodeAddress};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Computes the authorized-to-send flag per spec.md §4.4 step 5:
/// `allowed = (not secured) OR (self in whitelist) OR (self == node)`.
#[must_use]
pub fn compute_authorized(
    self_address: &NodeAddress,
    node_address: &NodeAddress,
    secured: bool,
    whitelist: &[NodeAddress],
) -> bool {
    !secured || whitelist.iter().any(|w| w == self_address) || self_address == node_address
}

#[derive(Default)]
pub struct Directory {
    records: HashMap<NodeAddress, NodeRecord>,
    aliases: HashMap<String, NodeAddress>,
    eth_addresses: HashMap<EthAddress, NodeAddress>,
    snapshots: NetworkSnapshots,
    first_peer_reached: bool,
}

impl Directory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, address: &NodeAddress, alias: &str, now: Instant) -> &mut NodeRecord {
        self.records
            .entry(address.clone())
            .or_insert_with(|| NodeRecord::new(alias.to_string(), now))
    }

    /// Ingests a heartbeat observation: refreshes alias (always) and
    /// EVM-address mapping (first-writer-wins), updates last-seen, recomputes
    /// authorization, and recomputes the peer state machine. Returns `true`
    /// the first time this Session becomes authorized by any peer ("first
    /// peer reached" notice).
    #[allow(clippy::too_many_arguments)]
    pub fn ingest_heartbeat(
        &mut self,
        node_address: &NodeAddress,
        alias: &str,
        eth_address: Option<EthAddress>,
        self_address: &NodeAddress,
        secured: bool,
        whitelist: &[NodeAddress],
        heartbeat_body: Map<String, Value>,
        online_timeout: Duration,
        now: Instant,
    ) -> bool {
        if let Some(existing) = self.aliases.get(alias) {
            if existing != node_address {
                self.aliases.remove(alias);
            }
        }
        self.aliases.insert(alias.to_string(), node_address.clone());

        let record = self.entry(node_address, alias, now);
        record.alias = alias.to_string();
        record.last_seen = now;
        record.secured = secured;
        record.last_heartbeat = Some(heartbeat_body);
        if record.eth_address.is_none() {
            record.eth_address = eth_address;
        }
        if let Some(eth) = record.eth_address {
            self.eth_addresses.entry(eth).or_insert_with(|| node_address.clone());
        }

        let authorized = compute_authorized(self_address, node_address, secured, whitelist);
        let record = self.records.get_mut(node_address).expect("just inserted above");
        record.authorized_to_send = authorized;
        record.recompute_state(now, online_timeout);

        self.maybe_mark_first_peer_reached(authorized)
    }

    /// Ingests one node's entry from a netmon snapshot: same alias/EVM/online
    /// tracking as a heartbeat, driven by the snapshot fields instead.
    pub fn ingest_netmon_entry(
        &mut self,
        node_address: &NodeAddress,
        entry: &NetmonEntry,
        self_address: &NodeAddress,
        online_timeout: Duration,
        now: Instant,
    ) -> bool {
        if !entry.online {
            if let Some(record) = self.records.get_mut(node_address) {
                record.state = PeerState::SeenOffline;
            }
            return false;
        }

        self.aliases.insert(entry.alias.clone(), node_address.clone());
        let record = self.entry(node_address, &entry.alias, now);
        record.alias = entry.alias.clone();
        record.last_seen = now;
        if record.eth_address.is_none() {
            record.eth_address = entry.eth_address;
        }
        if let Some(eth) = record.eth_address {
            self.eth_addresses.entry(eth).or_insert_with(|| node_address.clone());
        }

        let authorized = compute_authorized(self_address, node_address, true, &entry.whitelist);
        let record = self.records.get_mut(node_address).expect("just inserted above");
        record.authorized_to_send = authorized;
        record.recompute_state(now, online_timeout);

        self.maybe_mark_first_peer_reached(authorized)
    }

    fn maybe_mark_first_peer_reached(&mut self, authorized: bool) -> bool {
        if authorized && !self.first_peer_reached {
            self.first_peer_reached = true;
            return true;
        }
        false
    }

    pub fn record_netmon_snapshot(
        &mut self,
        supervisor: NodeAddress,
        snapshot: HashMap<NodeAddress, NetmonEntry>,
    ) {
        self.snapshots.record(supervisor, snapshot);
    }

    #[must_use]
    pub fn snapshots(&self) -> &NetworkSnapshots {
        &self.snapshots
    }

    pub fn ingest_pipelines(&mut self, node_address: &NodeAddress, pipelines: Map<String, Value>) {
        if let Some(record) = self.records.get_mut(node_address) {
            for (name, config) in pipelines {
                record.pipelines.insert(name, config);
            }
            if record.state == PeerState::SeenOnlinePeered || record.state == PeerState::AwaitingNetconfig
            {
                record.state = PeerState::Ready;
            }
        }
    }

    pub fn mark_awaiting_netconfig(&mut self, node_address: &NodeAddress, now: Instant) {
        if let Some(record) = self.records.get_mut(node_address) {
            record.last_netconfig_request = Some(now);
            if record.state == PeerState::SeenOnlinePeered {
                record.state = PeerState::AwaitingNetconfig;
            }
        }
    }

    #[must_use]
    pub fn get(&self, address: &NodeAddress) -> Option<&NodeRecord> {
        self.records.get(address)
    }

    #[must_use]
    pub fn active_nodes(&self, now: Instant, online_timeout: Duration) -> Vec<NodeAddress> {
        self.records
            .iter()
            .filter(|(_, r)| r.is_online(now, online_timeout))
            .map(|(addr, _)| addr.clone())
            .collect()
    }

    #[must_use]
    pub fn allowed_nodes(&self, now: Instant, online_timeout: Duration) -> Vec<NodeAddress> {
        self.records
            .iter()
            .filter(|(_, r)| r.is_online(now, online_timeout) && r.authorized_to_send)
            .map(|(addr, _)| addr.clone())
            .collect()
    }

    #[must_use]
    pub fn is_peered(&self, address: &NodeAddress) -> bool {
        self.records.get(address).is_some_and(|r| r.authorized_to_send)
    }

    #[must_use]
    pub fn get_addr_by_name(&self, alias: &str) -> Option<NodeAddress> {
        self.aliases.get(alias).cloned()
    }

    #[must_use]
    pub fn get_node_alias(&self, address: &NodeAddress) -> Option<String> {
        self.records.get(address).map(|r| r.alias.clone())
    }

    #[must_use]
    pub fn get_addr_by_eth_address(&self, eth: &EthAddress) -> Option<NodeAddress> {
        self.eth_addresses.get(eth).cloned()
    }

    #[must_use]
    pub fn get_eth_address_by_addr(&self, address: &NodeAddress) -> Option<EthAddress> {
        self.records.get(address).and_then(|r| r.eth_address)
    }

    #[must_use]
    pub fn get_active_supervisors(&self) -> Vec<NodeAddress> {
        self.snapshots.active_supervisors()
    }

    /// Candidates for a net-config request, per spec.md §4.7's trigger
    /// condition: online, authorized, no pipelines known, and either never
    /// asked or cooldown elapsed. Does not itself mark the request as sent —
    /// callers must call [`Directory::mark_awaiting_netconfig`] once the
    /// request is actually published.
    #[must_use]
    pub fn peers_needing_netconfig(
        &self,
        now: Instant,
        online_timeout: Duration,
        netconfig_request_delay: Duration,
    ) -> Vec<NodeAddress> {
        self.records
            .iter()
            .filter(|(_, r)| {
                r.is_online(now, online_timeout)
                    && r.authorized_to_send
                    && r.pipelines.is_empty()
                    && r.last_netconfig_request
                        .is_none_or(|last| now.saturating_duration_since(last) >= netconfig_request_delay)
            })
            .map(|(addr, _)| addr.clone())
            .collect()
    }
}
