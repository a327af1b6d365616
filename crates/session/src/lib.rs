// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The Edge Mesh Session runtime: a client-side handle onto a decentralized
//! edge-node network reached over pub/sub. Construction wires up identity,
//! broker, and configuration and starts the three inbound dispatch workers;
//! [`Session::startup`] brings the broker connection and supervisor up and
//! waits for the first authorized peer.

mod action;
mod callback;
mod command;
mod constants;
mod error;
mod handle;
mod handlers;
mod netconfig;
mod supervisor;
#[cfg(test)]
mod test_support;
mod workers;

pub use action::CommandAction;
pub use callback::{Callbacks, HeartbeatCallback, NotificationCallback, PayloadCallback};
pub use command::CommandDestination;
pub use error::{Result, SessionError};
pub use handle::SessionHandle;

use crate::handle::Inner;
use meshsdk_broker::BrokerClient;
use meshsdk_config::SessionConfig;
use meshsdk_core::NodeAddress;
use meshsdk_directory::Directory;
use meshsdk_envelope::FormatterRegistry;
use meshsdk_identity::Identity;
use meshsdk_pipeline::PipelineRegistry;
use meshsdk_transaction::{wait_for_transactions, ResponseMatcher, TransactionHandle, TransactionTracker};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// How long [`Session::run`] blocks before returning (and, if requested,
/// closing the session), per spec.md §4.9.
pub enum WaitCondition {
    Forever,
    Seconds(u64),
    Until(Box<dyn Fn() -> bool + Send>),
}

const RUN_LOOP_TICK: Duration = Duration::from_millis(100);

/// The top-level runtime handle a user owns. Everything else —
/// [`SessionHandle`], the dispatch workers, the supervisor — is reachable
/// through it, but only `Session` carries lifecycle control (`startup`,
/// `close`, `run`).
pub struct Session {
    handle: SessionHandle,
    workers: Mutex<Option<workers::Workers>>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Builds a Session from an identity, a connected-or-not broker client,
    /// and a resolved configuration, and starts the three dispatch workers.
    ///
    /// Construction is synchronous and side-effect-light beyond that: it
    /// does not connect to the broker or start the supervisor — both happen
    /// in [`Session::startup`]. Workers can start immediately because
    /// subscribing does not require an established connection (see
    /// [`workers::spawn`]'s doc comment).
    #[must_use]
    pub fn new(identity: Arc<dyn Identity>, broker: Arc<dyn BrokerClient>, config: SessionConfig) -> Self {
        let channels = meshsdk_broker::ChannelSet::derive(&config.root_topic, identity.address().as_str());
        let inner = Arc::new(Inner {
            identity,
            broker,
            channels,
            config,
            formatters: FormatterRegistry::with_defaults(),
            directory: Mutex::new(Directory::new()),
            pipelines: Mutex::new(PipelineRegistry::new()),
            tracker: TransactionTracker::new(),
            callbacks: Callbacks::default(),
            started_at: Instant::now(),
            stopped: AtomicBool::new(false),
            first_peer_reached: Notify::new(),
            first_netmon_message: Notify::new(),
            stop_notify: Notify::new(),
        });
        let handle = SessionHandle::new(inner);
        let workers = workers::spawn(handle.clone());

        Self { handle, workers: Mutex::new(Some(workers)), supervisor: Mutex::new(None) }
    }

    /// Registers callbacks. Builder style: each call replaces the previous
    /// registration for that kind. Safe to call at any point in the
    /// Session's lifetime, including after [`Session::startup`] — the
    /// dispatch workers read through the same `Mutex` on every message.
    pub fn on_heartbeat(&mut self, callback: HeartbeatCallback) -> &mut Self {
        *self.handle.inner.callbacks.heartbeat.lock().expect("callbacks lock poisoned") = Some(callback);
        self
    }

    pub fn on_notification(&mut self, callback: NotificationCallback) -> &mut Self {
        *self.handle.inner.callbacks.notification.lock().expect("callbacks lock poisoned") = Some(callback);
        self
    }

    pub fn on_payload(&mut self, callback: PayloadCallback) -> &mut Self {
        *self.handle.inner.callbacks.payload.lock().expect("callbacks lock poisoned") = Some(callback);
        self
    }

    /// A cheap, cloneable reference to this Session's shared state, the kind
    /// callbacks and commands operate through.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Brings the Session fully online, per spec.md §4.1's seven ordered
    /// steps: configuration and identity are already resolved by the time
    /// `Session::new` returns (steps 1–2); an `auto_configuration` handshake
    /// is a documented no-op here, since the original's only observable
    /// behavior for it — pulling extra config from the environment — is
    /// already covered unconditionally by [`SessionConfig::load`] (step 3);
    /// connection parameters are likewise already merged into `config`
    /// (step 4); then the broker connects and the supervisor starts (steps
    /// 5–6); finally this waits up to [`constants::START_TIMEOUT`] for the
    /// first authorized peer, logging but not failing on timeout (step 7).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ConfigMissing`] if a required connection
    /// parameter (currently: `host`) was never resolved by any config layer,
    /// or an error if the broker connection fails.
    pub async fn startup(&self) -> Result<()> {
        self.handle.inner.config.require_host().map_err(|e| SessionError::ConfigMissing(e.to_string()))?;

        tracing::debug!("auto_configuration handshake: no additional steps beyond env/file config already loaded");

        self.handle.inner.broker.connect().await?;

        let supervisor_task = supervisor::spawn(self.handle.clone());
        *self.supervisor.lock().expect("supervisor lock poisoned") = Some(supervisor_task);

        match tokio::time::timeout(constants::START_TIMEOUT, self.handle.inner.first_netmon_message.notified()).await
        {
            Ok(()) => tracing::info!("first network-monitor message received"),
            Err(_) => tracing::warn!(
                timeout = ?constants::START_TIMEOUT,
                "no network-monitor message received within the startup window, continuing anyway"
            ),
        }
        Ok(())
    }

    /// Builds and publishes one outbound command. See [`command::send_command`].
    ///
    /// # Errors
    ///
    /// Returns an error if `destination` cannot be resolved, or if
    /// encryption, signing, or publish fails.
    pub async fn send_command(
        &self,
        action: CommandAction,
        payload: Value,
        destination: &CommandDestination,
    ) -> Result<()> {
        command::send_command(&self.handle, action, payload, destination, None).await
    }

    /// Publishes a command and registers a transaction awaiting `matchers`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::send_command`].
    pub async fn send_command_awaiting(
        &self,
        action: CommandAction,
        payload: Value,
        destination: &CommandDestination,
        matchers: Vec<Box<dyn ResponseMatcher>>,
        timeout: Duration,
    ) -> Result<TransactionHandle> {
        command::send_command_awaiting(&self.handle, action, payload, destination, None, matchers, timeout).await
    }

    /// Creates a pipeline owned by this Session on `node`, publishing the
    /// `UPDATE_CONFIG` command that deploys it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AddressUnresolved`] if `node` is neither a
    /// known alias nor an address this Session has observed, or a
    /// broker/identity error if publishing fails.
    pub async fn create_pipeline(&self, node: &str, name: &str, config: Value) -> Result<()> {
        let node_address = self.handle.resolve_address(node)?;
        {
            let mut registry = self.handle.inner.pipelines.lock().expect("pipelines lock poisoned");
            registry.create_owned(node_address.clone(), name.to_string(), config.clone());
        }

        let mut payload = match config {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        payload.insert(meshsdk_envelope::fields::NAME.to_string(), Value::String(name.to_string()));

        command::send_command(
            &self.handle,
            CommandAction::UpdateConfig,
            Value::Object(payload),
            &CommandDestination::One(node_address.as_str().to_string()),
            None,
        )
        .await
    }

    /// Closes one pipeline. If it is tracked locally (owned or attached),
    /// removes it and issues `ARCHIVE_CONFIG` addressed at its node. If it
    /// isn't tracked — e.g. this Session only knows about it by name — still
    /// issues the same `ARCHIVE_CONFIG`, addressed directly by `node` and
    /// `pipeline_name`, rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AddressUnresolved`] if `node` cannot be
    /// resolved, or a broker/identity error if publishing fails.
    pub async fn close_pipeline(&self, node: &str, pipeline_name: &str) -> Result<()> {
        let node_address = self.handle.resolve_address(node)?;
        {
            let mut registry = self.handle.inner.pipelines.lock().expect("pipelines lock poisoned");
            registry.remove(&node_address, pipeline_name);
        }

        let mut payload = Map::new();
        payload.insert(meshsdk_envelope::fields::NAME.to_string(), Value::String(pipeline_name.to_string()));

        command::send_command(
            &self.handle,
            CommandAction::ArchiveConfig,
            Value::Object(payload),
            &CommandDestination::One(node_address.as_str().to_string()),
            None,
        )
        .await
    }

    /// Closes the Session: idempotent, safe to call more than once.
    ///
    /// If `close_pipelines`, issues `ARCHIVE_CONFIG` for every pipeline this
    /// Session owns before shutting down dispatch. The transactions
    /// registered for those commands use an empty matcher set — no
    /// wire-level "pipeline closed" acknowledgment format exists in the
    /// observed protocol, so each resolves as soon as the supervisor's next
    /// reap tick runs, which still exercises `wait_for_transactions` without
    /// inventing an unfounded ack shape.
    ///
    /// If `wait`, blocks until those transactions finish and the dispatch
    /// workers and supervisor have fully drained and exited.
    pub async fn close(&self, close_pipelines: bool, wait: bool) {
        if self.handle.inner.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut pending = Vec::new();
        if close_pipelines {
            let owned: Vec<(NodeAddress, String)> = {
                let registry = self.handle.inner.pipelines.lock().expect("pipelines lock poisoned");
                registry.owned().into_iter().map(|h| (h.node_address.clone(), h.name.clone())).collect()
            };
            for (node_address, name) in owned {
                let mut payload = Map::new();
                payload.insert(meshsdk_envelope::fields::NAME.to_string(), Value::String(name.clone()));
                let result = command::send_command_awaiting(
                    &self.handle,
                    CommandAction::ArchiveConfig,
                    Value::Object(payload),
                    &CommandDestination::One(node_address.as_str().to_string()),
                    None,
                    Vec::new(),
                    Duration::from_secs(10),
                )
                .await;
                match result {
                    Ok(tx) => pending.push(tx),
                    Err(e) => tracing::warn!(node = %node_address, pipeline = %name, error = %e, "failed to send close command"),
                }
            }
            let mut registry = self.handle.inner.pipelines.lock().expect("pipelines lock poisoned");
            for h in registry.owned().into_iter().map(|h| (h.node_address.clone(), h.name.clone())).collect::<Vec<_>>() {
                registry.remove(&h.0, &h.1);
            }
        }

        self.handle.inner.stop_notify.notify_waiters();

        if !wait {
            return;
        }

        wait_for_transactions(&pending).await;

        let workers = self.workers.lock().expect("workers lock poisoned").take();
        if let Some(workers) = workers {
            let _ = workers.heartbeat.await;
            let _ = workers.notification.await;
            let _ = workers.payload.await;
        }
        let supervisor_task = self.supervisor.lock().expect("supervisor lock poisoned").take();
        if let Some(supervisor_task) = supervisor_task {
            let _ = supervisor_task.await;
        }
    }

    /// Blocks the caller per `wait`, then optionally closes the Session.
    /// `close_pipelines` is ignored unless `close_session` is set.
    pub async fn run(&self, wait: WaitCondition, close_session: bool, close_pipelines: bool) {
        let start = Instant::now();
        loop {
            if self.handle.is_stopped() {
                break;
            }
            let keep_going = match &wait {
                WaitCondition::Forever => true,
                WaitCondition::Seconds(secs) => start.elapsed() < Duration::from_secs(*secs),
                WaitCondition::Until(f) => f(),
            };
            if !keep_going {
                break;
            }
            tokio::select! {
                () = tokio::time::sleep(RUN_LOOP_TICK) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("received interrupt signal, exiting run loop");
                    break;
                }
            }
        }
        if close_session {
            self.close(close_pipelines, true).await;
        }
    }

    /// Polls the directory for `node` to become active, bounded by
    /// `timeout`. Returns `true` if the node was seen online before the
    /// deadline.
    pub async fn wait_for_node(&self, node: &str, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            let found =
                self.handle.resolve_address(node).is_ok_and(|addr| self.handle.active_nodes().contains(&addr));
            if found {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            tokio::time::sleep(constants::DIRECTORY_POLL_INTERVAL).await;
        }
    }

    /// Polls the directory for any node to become active, bounded by
    /// `timeout`.
    pub async fn wait_for_any_node(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if !self.handle.active_nodes().is_empty() {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            tokio::time::sleep(constants::DIRECTORY_POLL_INTERVAL).await;
        }
    }
}
