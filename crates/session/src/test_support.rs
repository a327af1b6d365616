// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Shared `#[cfg(test)]` scaffolding so every module's test suite builds an
//! [`Inner`] the same way, against a [`LoopbackBroker`].

#![cfg(test)]

use crate::callback::Callbacks;
use crate::handle::{Inner, SessionHandle};
use meshsdk_broker::{ChannelSet, LoopbackBroker};
use meshsdk_config::SessionConfig;
use meshsdk_directory::Directory;
use meshsdk_identity::Secp256k1Identity;
use meshsdk_pipeline::PipelineRegistry;
use meshsdk_transaction::TransactionTracker;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Notify;

#[must_use]
pub(crate) fn test_handle() -> (SessionHandle, Arc<LoopbackBroker>) {
    let identity = Arc::new(Secp256k1Identity::generate());
    let broker = Arc::new(LoopbackBroker::new());
    let mut config = SessionConfig::default();
    config.encrypt_comms = false;
    let inner = Inner {
        identity,
        broker: broker.clone(),
        channels: ChannelSet::derive(&config.root_topic, "self-node"),
        config,
        formatters: meshsdk_envelope::FormatterRegistry::with_defaults(),
        directory: Mutex::new(Directory::new()),
        pipelines: Mutex::new(PipelineRegistry::new()),
        tracker: TransactionTracker::new(),
        callbacks: Callbacks::default(),
        started_at: Instant::now(),
        stopped: AtomicBool::new(false),
        first_peer_reached: Notify::new(),
        first_netmon_message: Notify::new(),
        stop_notify: Notify::new(),
    };
    (SessionHandle::new(Arc::new(inner)), broker)
}
