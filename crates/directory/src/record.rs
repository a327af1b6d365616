// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use meshsdk_core::EthAddress;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Instant;

/// Per-peer directory-level state machine, driven by heartbeats and netmon
/// snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    SeenOffline,
    SeenOnlineNotPeered,
    SeenOnlinePeered,
    AwaitingNetconfig,
    Ready,
}

/// Everything the directory tracks about one peer node.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub alias: String,
    pub eth_address: Option<EthAddress>,
    pub last_seen: Instant,
    pub last_heartbeat: Option<Map<String, Value>>,
    pub authorized_to_send: bool,
    pub secured: bool,
    pub pipelines: HashMap<String, Value>,
    pub last_netconfig_request: Option<Instant>,
    pub state: PeerState,
}

impl NodeRecord {
    #[must_use]
    pub fn new(alias: String, now: Instant) -> Self {
        Self {
            alias,
            eth_address: None,
            last_seen: now,
            last_heartbeat: None,
            authorized_to_send: false,
            secured: true,
            pipelines: HashMap::new(),
            last_netconfig_request: None,
            state: PeerState::SeenOffline,
        }
    }

    #[must_use]
    pub fn is_online(&self, now: Instant, online_timeout: std::time::Duration) -> bool {
        now.saturating_duration_since(self.last_seen) < online_timeout
    }

    /// Advances the state machine to reflect the current online/authorized
    /// facts, applied after every heartbeat/netmon update.
    pub fn recompute_state(&mut self, now: Instant, online_timeout: std::time::Duration) {
        if !self.is_online(now, online_timeout) {
            self.state = PeerState::SeenOffline;
            return;
        }
        self.state = match self.state {
            PeerState::SeenOffline => {
                if self.authorized_to_send {
                    PeerState::SeenOnlinePeered
                } else {
                    PeerState::SeenOnlineNotPeered
                }
            }
            PeerState::SeenOnlineNotPeered => {
                if self.authorized_to_send {
                    PeerState::SeenOnlinePeered
                } else {
                    PeerState::SeenOnlineNotPeered
                }
            }
            other => other,
        };
        if self.state == PeerState::SeenOnlinePeered && !self.pipelines.is_empty() {
            self.state = PeerState::Ready;
        }
    }
}
