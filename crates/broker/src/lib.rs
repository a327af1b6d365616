// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The pub/sub broker contract the Session consumes, plus an in-memory
//! double for tests. Concrete real-world transports (MQTT, etc.) implement
//! [`BrokerClient`] outside this crate.

mod client;
mod error;
mod loopback;
mod topics;

pub use client::BrokerClient;
pub use error::{BrokerError, Result};
pub use loopback::LoopbackBroker;
pub use topics::ChannelSet;
