// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The three inbound dispatch workers, per spec.md §4.3: one per queue
//! (heartbeat, notification, payload), each subscribed to the Session's own
//! channel and running the envelope codec ahead of its handler.
//!
//! The heartbeat queue is lossy by design (spec.md §5's backpressure
//! policy): each iteration collapses any further already-queued frames down
//! to only the newest before handling it, rather than processing every one.
//! Notification and payload queues process every frame in arrival order.

use crate::constants::STOP_CHECK_TICK;
use crate::error::SessionError;
use crate::handle::SessionHandle;
use crate::handlers;
use meshsdk_envelope::EnvelopeError;
use tokio::task::JoinHandle;

/// Maps a codec failure onto the closed [`SessionError`] taxonomy purely for
/// the diagnostic below; per spec.md §7 these are dropped locally, never
/// propagated to a caller.
fn log_dropped_frame(err: &EnvelopeError) {
    match err {
        EnvelopeError::Parse(detail) => {
            tracing::debug!(error = %SessionError::ParseError, detail, "dropping inbound frame");
        }
        EnvelopeError::Decrypt(detail) => {
            tracing::debug!(
                error = %SessionError::DecryptError(detail.clone()),
                "dropping inbound frame"
            );
        }
    }
}

pub struct Workers {
    pub heartbeat: JoinHandle<()>,
    pub notification: JoinHandle<()>,
    pub payload: JoinHandle<()>,
}

/// Spawns the three dispatch worker tasks, per spec.md §4.1: construction
/// starts them immediately, each subscribing to its own channel as the
/// first thing it does once scheduled. Subscribing does not require the
/// broker to be connected yet (`LoopbackBroker::subscribe` and the
/// `BrokerClient` contract both allow it before `connect`), so this can
/// run synchronously from `Session::new` rather than waiting on
/// `Session::startup`'s later connect step.
pub fn spawn(handle: SessionHandle) -> Workers {
    let heartbeat = tokio::spawn(heartbeat_loop(handle.clone()));
    let notification = tokio::spawn(notification_loop(handle.clone()));
    let payload = tokio::spawn(payload_loop(handle));

    Workers { heartbeat, notification, payload }
}

async fn parse_and_handle_heartbeat(handle: &SessionHandle, raw: Vec<u8>) {
    let envelope = meshsdk_envelope::parse(
        &raw,
        handle.address(),
        handle.inner.identity.as_ref(),
        &handle.inner.formatters,
    );
    match envelope {
        Ok(envelope) => handlers::handle_heartbeat(handle, envelope).await,
        Err(e) => log_dropped_frame(&e),
    }
}

async fn heartbeat_loop(handle: SessionHandle) {
    let mut rx = match handle.inner.broker.subscribe(&handle.inner.channels.ctrl).await {
        Ok(rx) => rx,
        Err(e) => {
            tracing::error!(error = %e, "failed to subscribe to heartbeat channel");
            return;
        }
    };
    let mut stop_check = tokio::time::interval(STOP_CHECK_TICK);
    loop {
        tokio::select! {
            biased;
            () = handle.inner.stop_notify.notified() => {
                while let Ok(mut raw) = rx.try_recv() {
                    while let Ok(newer) = rx.try_recv() {
                        raw = newer;
                    }
                    parse_and_handle_heartbeat(&handle, raw).await;
                }
                break;
            }
            _ = stop_check.tick() => {
                if handle.is_stopped() {
                    while let Ok(mut raw) = rx.try_recv() {
                        while let Ok(newer) = rx.try_recv() {
                            raw = newer;
                        }
                        parse_and_handle_heartbeat(&handle, raw).await;
                    }
                    break;
                }
            }
            received = rx.recv() => {
                match received {
                    Some(mut raw) => {
                        while let Ok(newer) = rx.try_recv() {
                            raw = newer;
                        }
                        parse_and_handle_heartbeat(&handle, raw).await;
                    }
                    None => break,
                }
            }
        }
    }
}

async fn parse_and_handle_notification(handle: &SessionHandle, raw: Vec<u8>) {
    let envelope = meshsdk_envelope::parse(
        &raw,
        handle.address(),
        handle.inner.identity.as_ref(),
        &handle.inner.formatters,
    );
    match envelope {
        Ok(envelope) => handlers::handle_notification(handle, envelope).await,
        Err(e) => log_dropped_frame(&e),
    }
}

async fn notification_loop(handle: SessionHandle) {
    let mut rx = match handle.inner.broker.subscribe(&handle.inner.channels.notif).await {
        Ok(rx) => rx,
        Err(e) => {
            tracing::error!(error = %e, "failed to subscribe to notification channel");
            return;
        }
    };
    let mut stop_check = tokio::time::interval(STOP_CHECK_TICK);
    loop {
        tokio::select! {
            biased;
            () = handle.inner.stop_notify.notified() => {
                while let Ok(raw) = rx.try_recv() {
                    parse_and_handle_notification(&handle, raw).await;
                }
                break;
            }
            _ = stop_check.tick() => {
                if handle.is_stopped() {
                    while let Ok(raw) = rx.try_recv() {
                        parse_and_handle_notification(&handle, raw).await;
                    }
                    break;
                }
            }
            received = rx.recv() => {
                match received {
                    Some(raw) => parse_and_handle_notification(&handle, raw).await,
                    None => break,
                }
            }
        }
    }
}

async fn parse_and_handle_payload(handle: &SessionHandle, raw: Vec<u8>) {
    let envelope = meshsdk_envelope::parse(
        &raw,
        handle.address(),
        handle.inner.identity.as_ref(),
        &handle.inner.formatters,
    );
    match envelope {
        Ok(envelope) => handlers::handle_payload(handle, envelope).await,
        Err(e) => log_dropped_frame(&e),
    }
}

async fn payload_loop(handle: SessionHandle) {
    let mut rx = match handle.inner.broker.subscribe(&handle.inner.channels.payloads).await {
        Ok(rx) => rx,
        Err(e) => {
            tracing::error!(error = %e, "failed to subscribe to payload channel");
            return;
        }
    };
    let mut stop_check = tokio::time::interval(STOP_CHECK_TICK);
    loop {
        tokio::select! {
            biased;
            () = handle.inner.stop_notify.notified() => {
                while let Ok(raw) = rx.try_recv() {
                    parse_and_handle_payload(&handle, raw).await;
                }
                break;
            }
            _ = stop_check.tick() => {
                if handle.is_stopped() {
                    while let Ok(raw) = rx.try_recv() {
                        parse_and_handle_payload(&handle, raw).await;
                    }
                    break;
                }
            }
            received = rx.recv() => {
                match received {
                    Some(raw) => parse_and_handle_payload(&handle, raw).await,
                    None => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_handle;
    use meshsdk_envelope::fields;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn heartbeat_frame(sender: &str) -> Vec<u8> {
        serde_json::json!({
            fields::EE_SENDER: sender,
            fields::EE_ID: "alias",
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn heartbeat_worker_invokes_callback_on_inbound_heartbeat() {
        let (handle, broker) = test_handle();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        *handle.inner.callbacks.heartbeat.lock().expect("callbacks lock poisoned") =
            Some(Arc::new(move |_, _, _| {
                seen_clone.fetch_add(1, Ordering::SeqCst);
            }));

        let topic = handle.inner.channels.ctrl.clone();
        let workers = spawn(handle.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;
        broker.inject(&topic, heartbeat_frame("peer-1"));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);

        handle.inner.stop_notify.notify_waiters();
        let _ = tokio::time::timeout(Duration::from_secs(1), workers.heartbeat).await;
    }

    #[tokio::test]
    async fn heartbeat_loop_collapses_queued_frames_to_the_newest() {
        let (handle, broker) = test_handle();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        *handle.inner.callbacks.heartbeat.lock().expect("callbacks lock poisoned") =
            Some(Arc::new(move |_, _, _| {
                seen_clone.fetch_add(1, Ordering::SeqCst);
            }));

        let topic = handle.inner.channels.ctrl.clone();
        let workers = spawn(handle.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;

        for i in 0..5 {
            broker.inject(&topic, heartbeat_frame(&format!("peer-{i}")));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(seen.load(Ordering::SeqCst) < 5, "collapsed queue handles fewer than every queued frame");

        handle.inner.stop_notify.notify_waiters();
        let _ = tokio::time::timeout(Duration::from_secs(1), workers.heartbeat).await;
    }

    #[tokio::test]
    async fn stop_notify_drains_buffered_payload_frames_before_exiting() {
        let (handle, broker) = test_handle();
        let topic = handle.inner.channels.payloads.clone();
        let workers = spawn(handle.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;

        broker.inject(&topic, b"not-valid-json".to_vec());
        handle.inner.stop_notify.notify_waiters();

        let result = tokio::time::timeout(Duration::from_secs(1), workers.payload).await;
        assert!(result.is_ok(), "payload worker exits promptly after stop_notify");
    }
}
