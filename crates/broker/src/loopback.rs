// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! An in-memory [`BrokerClient`] used by integration tests to exercise the
//! Session without a real broker.

use crate::client::BrokerClient;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

const QUEUE_CAPACITY: usize = 256;

#[derive(Default)]
pub struct LoopbackBroker {
    connected: AtomicBool,
    subscribers: Mutex<HashMap<String, Vec<mpsc::Sender<Vec<u8>>>>>,
}

impl LoopbackBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a frame directly onto `topic`, as if a peer had published it.
    /// Used by tests to simulate inbound network traffic.
    ///
    /// # Panics
    ///
    /// Panics if the internal subscriber registry lock is poisoned.
    pub fn inject(&self, topic: &str, payload: Vec<u8>) {
        let subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        if let Some(senders) = subscribers.get(topic) {
            for sender in senders {
                let _ = sender.try_send(payload.clone());
            }
        }
    }
}

#[async_trait]
impl BrokerClient for LoopbackBroker {
    async fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<mpsc::Receiver<Vec<u8>>> {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .entry(topic.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.inject(topic, payload);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_delivers_to_subscribers_of_the_same_topic() {
        let broker = LoopbackBroker::new();
        broker.connect().await.expect("connects");
        let mut rx = broker.subscribe("root/n1/ctrl").await.expect("subscribes");

        broker.publish("root/n1/ctrl", b"hello".to_vec()).await.expect("publishes");

        let received = rx.recv().await.expect("frame arrives");
        assert_eq!(received, b"hello");
    }

    #[tokio::test]
    async fn publish_does_not_cross_topics() {
        let broker = LoopbackBroker::new();
        let mut rx = broker.subscribe("root/n1/ctrl").await.expect("subscribes");

        broker.publish("root/n1/notif", b"other".to_vec()).await.expect("publishes");

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn is_connected_reflects_connect_call() {
        let broker = LoopbackBroker::new();
        assert!(!broker.is_connected());
        broker.connect().await.expect("connects");
        assert!(broker.is_connected());
    }
}
