// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The supervisor loop, per spec.md §4.10: a single long-lived task that
//! reconnects the broker with bounded exponential backoff and reaps the
//! transaction tracker every tick. The startup liveness gate (§4.1 step 7)
//! is handled once, directly in [`crate::Session::startup`], rather than
//! duplicated here.

use crate::constants::{RECONNECT_INITIAL_BACKOFF, RECONNECT_MAX_BACKOFF, SUPERVISOR_TICK};
use crate::error::SessionError;
use crate::handle::SessionHandle;
use tokio::task::JoinHandle;
use tokio::time::Instant as TokioInstant;

pub fn spawn(handle: SessionHandle) -> JoinHandle<()> {
    tokio::spawn(run(handle))
}

async fn run(handle: SessionHandle) {
    let mut backoff = RECONNECT_INITIAL_BACKOFF;
    let mut ticker = tokio::time::interval(SUPERVISOR_TICK);

    loop {
        tokio::select! {
            biased;
            () = handle.inner.stop_notify.notified() => break,
            _ = ticker.tick() => {
                // `stop_notify.notify_waiters()` only wakes tasks already
                // parked on `.notified()`; re-checking the flag here on
                // every tick gives close() a bounded-latency guarantee even
                // if this task wasn't waiting yet when it fired.
                if handle.is_stopped() {
                    break;
                }
                if !handle.inner.broker.is_connected() {
                    tracing::debug!(error = %SessionError::BrokerDisconnected, "attempting reconnect");
                    match handle.inner.broker.connect().await {
                        Ok(()) => {
                            tracing::info!("broker reconnected");
                            backoff = RECONNECT_INITIAL_BACKOFF;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, delay = ?backoff, "broker reconnect failed, backing off");
                            tokio::time::sleep_until(TokioInstant::now() + backoff).await;
                            backoff = (backoff * 2).min(RECONNECT_MAX_BACKOFF);
                        }
                    }
                }

                let reaped = handle.inner.tracker.reap(
                    std::time::Instant::now(),
                    |t| tracing::trace!(session_id = %t.session_id, "transaction solved"),
                    |t| tracing::debug!(
                        session_id = %t.session_id,
                        error = %SessionError::TransactionTimeout,
                        "transaction expired"
                    ),
                );
                if reaped > 0 {
                    tracing::trace!(reaped, "supervisor reaped transactions");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_handle;
    use meshsdk_core::NodeAddress;
    use meshsdk_transaction::{FromSender, ResponseMatcher};
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn stop_notify_ends_the_loop_promptly() {
        let (handle, _broker) = test_handle();
        let task = spawn(handle.clone());

        // Mirrors Session::close: flip the stop flag before notifying, so the
        // ticker's fallback recheck catches it even if notify_waiters() races
        // ahead of the loop parking on notified().
        handle.inner.stopped.store(true, std::sync::atomic::Ordering::Release);
        handle.inner.stop_notify.notify_waiters();
        let result = tokio::time::timeout(StdDuration::from_secs(1), task).await;
        assert!(result.is_ok(), "supervisor exits promptly on stop_notify");
    }

    #[tokio::test]
    async fn reaps_a_solved_transaction_within_one_tick() {
        let (handle, _broker) = test_handle();
        let matcher: Box<dyn ResponseMatcher> = Box::new(FromSender::new(NodeAddress::new("n1")));
        let tx_handle =
            handle.inner.tracker.register("s1".to_string(), vec![matcher], StdDuration::from_secs(10));

        let envelope = meshsdk_envelope::Envelope {
            sender: Some(NodeAddress::new("n1")),
            destination: Vec::new(),
            encrypted: false,
            path: meshsdk_envelope::PayloadPath::default(),
            body: serde_json::Map::new(),
            signature: None,
        };
        handle.inner.tracker.offer(&envelope);

        let task = spawn(handle.clone());
        tokio::time::sleep(StdDuration::from_millis(250)).await;
        handle.inner.stop_notify.notify_waiters();
        let _ = tokio::time::timeout(StdDuration::from_secs(1), task).await;

        assert!(tx_handle.is_finished());
        assert!(tx_handle.succeeded());
    }
}
