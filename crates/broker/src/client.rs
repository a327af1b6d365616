// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// The only surface the Session consumes from a pub/sub broker library:
/// connect, subscribe, publish, and a connectivity check. TLS is configured
/// at construction time by whatever concrete client implements this trait;
/// the Session only needs to know whether it is up.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Establishes the underlying connection. Idempotent: calling again
    /// while already connected is a no-op.
    async fn connect(&self) -> Result<()>;

    /// Subscribes to `topic`, returning a channel of raw inbound frames.
    async fn subscribe(&self, topic: &str) -> Result<mpsc::Receiver<Vec<u8>>>;

    /// Publishes `payload` to `topic`.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;

    fn is_connected(&self) -> bool;
}
