// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! User-facing callback contracts. Fixed shape per spec.md §9: callbacks
//! never see a locked Session, only the cheaply-cloneable [`crate::SessionHandle`].

use crate::handle::SessionHandle;
use meshsdk_core::NodeAddress;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

pub type HeartbeatCallback =
    Arc<dyn Fn(&SessionHandle, &NodeAddress, &Map<String, Value>) + Send + Sync>;
pub type NotificationCallback =
    Arc<dyn Fn(&SessionHandle, &NodeAddress, &Map<String, Value>) + Send + Sync>;
pub type PayloadCallback =
    Arc<dyn Fn(&SessionHandle, &NodeAddress, &str, &str, &str, &Map<String, Value>) + Send + Sync>;

/// Holds each callback behind a `Mutex` rather than a plain `Option` so that
/// [`crate::Session::on_heartbeat`] and friends can still replace it after
/// the dispatch workers have cloned their `SessionHandle` — registration is
/// not required to happen before [`crate::Session::startup`].
#[derive(Default)]
pub struct Callbacks {
    pub heartbeat: Mutex<Option<HeartbeatCallback>>,
    pub notification: Mutex<Option<NotificationCallback>>,
    pub payload: Mutex<Option<PayloadCallback>>,
}
