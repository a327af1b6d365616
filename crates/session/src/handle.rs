// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The shared runtime state and the cheap handle callbacks/workers hold onto.
//! Mirrors the teacher's `DynamicEngineHandle`: a thin `Arc`-wrapped façade in
//! front of the actual state, safe to clone into spawned tasks and user
//! callbacks without exposing lifecycle control (`close`/`run` stay on the
//! outer [`crate::Session`]).

use crate::callback::Callbacks;
use crate::constants::NETCONFIG_REQUEST_DELAY;
use crate::error::{Result, SessionError};
use meshsdk_broker::{BrokerClient, ChannelSet};
use meshsdk_config::SessionConfig;
use meshsdk_core::NodeAddress;
use meshsdk_directory::Directory;
use meshsdk_envelope::FormatterRegistry;
use meshsdk_identity::Identity;
use meshsdk_pipeline::PipelineRegistry;
use meshsdk_transaction::TransactionTracker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Notify;

pub struct Inner {
    pub identity: Arc<dyn Identity>,
    pub broker: Arc<dyn BrokerClient>,
    pub channels: ChannelSet,
    pub config: SessionConfig,
    pub formatters: FormatterRegistry,
    pub directory: Mutex<Directory>,
    pub pipelines: Mutex<PipelineRegistry>,
    pub tracker: TransactionTracker,
    pub callbacks: Callbacks,
    pub started_at: Instant,
    pub stopped: AtomicBool,
    /// Fires the first time any peer is observed to become authorized (via
    /// heartbeat or netmon entry), per spec.md §4.6 step 2. Distinct from
    /// [`Inner::first_netmon_message`]: a network-monitor snapshot can
    /// arrive without containing any authorized peer.
    pub first_peer_reached: Notify,
    /// Fires the first time a network-monitor snapshot (`CURRENT_NETWORK`
    /// payload) is processed at all, regardless of whether it authorizes any
    /// peer. This, not `first_peer_reached`, is what `Session::startup`'s
    /// liveness gate waits on.
    pub first_netmon_message: Notify,
    /// Wakes the three dispatch workers and the supervisor so they can drain
    /// and exit on `close`, since the broker's subscribe channels do not
    /// themselves close when a LoopbackBroker or real client disconnects.
    pub stop_notify: Notify,
}

/// The cheaply-cloneable façade everything but the top-level [`crate::Session`]
/// holds: dispatch workers, the supervisor, user callbacks, and command-builder
/// helpers all operate through this handle.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) inner: Arc<Inner>,
}

impl SessionHandle {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn address(&self) -> &NodeAddress {
        self.inner.identity.address()
    }

    #[must_use]
    pub fn online_timeout(&self) -> Duration {
        Duration::from_secs(self.inner.config.online_timeout.max(1))
    }

    #[must_use]
    pub fn netconfig_request_delay(&self) -> Duration {
        NETCONFIG_REQUEST_DELAY
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }

    /// Resolves an alias or raw address string to a [`NodeAddress`] via the
    /// directory, per spec.md §4.8's addressing fallback.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AddressUnresolved`] if `alias_or_address` is
    /// neither a known alias nor a node this Session has ever observed.
    pub fn resolve_address(&self, alias_or_address: &str) -> Result<NodeAddress> {
        let candidate = NodeAddress::new(alias_or_address);
        let directory = self.inner.directory.lock().expect("directory lock poisoned");
        if directory.get(&candidate).is_some() {
            return Ok(candidate);
        }
        directory
            .get_addr_by_name(alias_or_address)
            .ok_or_else(|| SessionError::AddressUnresolved(alias_or_address.to_string()))
    }

    #[must_use]
    pub fn active_nodes(&self) -> Vec<NodeAddress> {
        let directory = self.inner.directory.lock().expect("directory lock poisoned");
        directory.active_nodes(Instant::now(), self.online_timeout())
    }

    #[must_use]
    pub fn allowed_nodes(&self) -> Vec<NodeAddress> {
        let directory = self.inner.directory.lock().expect("directory lock poisoned");
        directory.allowed_nodes(Instant::now(), self.online_timeout())
    }

    #[must_use]
    pub fn is_peered(&self, address: &NodeAddress) -> bool {
        self.inner.directory.lock().expect("directory lock poisoned").is_peered(address)
    }

    #[must_use]
    pub fn active_pipelines(&self, address: &NodeAddress) -> Vec<String> {
        self.inner
            .directory
            .lock()
            .expect("directory lock poisoned")
            .get(address)
            .map(|record| record.pipelines.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn pipeline_config(&self, address: &NodeAddress, name: &str) -> Option<serde_json::Value> {
        self.inner
            .directory
            .lock()
            .expect("directory lock poisoned")
            .get(address)
            .and_then(|record| record.pipelines.get(name).cloned())
    }
}
