// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use crate::matcher::ResponseMatcher;
use crate::transaction::{Transaction, TransactionHandle};
use meshsdk_envelope::Envelope;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Owns the open-transactions list behind its own lock, independent of any
/// other Session lock, per spec.md §5. A `std::sync::Mutex` suffices: every
/// critical section below is synchronous `Vec` mutation, never held across
/// an `.await`.
#[derive(Default)]
pub struct TransactionTracker {
    open: Mutex<Vec<Transaction>>,
}

impl TransactionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new transaction and returns the handle the caller polls.
    pub fn register(
        &self,
        session_id: String,
        matchers: Vec<Box<dyn ResponseMatcher>>,
        timeout: Duration,
    ) -> TransactionHandle {
        let (transaction, handle) = Transaction::new(session_id, matchers, Instant::now() + timeout);
        self.open.lock().expect("transaction tracker lock poisoned").push(transaction);
        handle
    }

    /// Offers an inbound envelope to every open transaction's matchers.
    pub fn offer(&self, envelope: &Envelope) {
        let mut open = self.open.lock().expect("transaction tracker lock poisoned");
        for transaction in open.iter_mut() {
            transaction.offer(envelope);
        }
    }

    /// The supervisor's periodic sweep: snapshots the list under the lock,
    /// then fires callbacks outside it. Returns the number of transactions
    /// reaped (solved + expired).
    pub fn reap<FSolved, FExpired>(
        &self,
        now: Instant,
        mut on_solved: FSolved,
        mut on_expired: FExpired,
    ) -> usize
    where
        FSolved: FnMut(&Transaction),
        FExpired: FnMut(&Transaction),
    {
        let (solved, expired): (Vec<_>, Vec<_>) = {
            let mut open = self.open.lock().expect("transaction tracker lock poisoned");
            let mut solved = Vec::new();
            let mut expired = Vec::new();
            open.retain_mut(|t| {
                if t.is_solved() {
                    solved.push(std::mem::replace(
                        t,
                        Transaction::new(String::new(), Vec::new(), now).0,
                    ));
                    false
                } else if t.is_expired(now) {
                    expired.push(std::mem::replace(
                        t,
                        Transaction::new(String::new(), Vec::new(), now).0,
                    ));
                    false
                } else {
                    true
                }
            });
            (solved, expired)
        };

        let reaped = solved.len() + expired.len();
        for transaction in &solved {
            transaction.mark_finished(true);
            on_solved(transaction);
        }
        for transaction in &expired {
            transaction.mark_finished(false);
            on_expired(transaction);
        }
        reaped
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Blocks until every handle reports finished, polling without holding the
/// tracker lock, per spec.md §4.9.
pub async fn wait_for_transactions(handles: &[TransactionHandle]) {
    loop {
        if handles.iter().all(TransactionHandle::is_finished) {
            return;
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Waits for every set in `sets` to finish (all handles in all sets done).
pub async fn wait_for_all_sets(sets: &[Vec<TransactionHandle>]) {
    loop {
        if sets.iter().all(|set| set.iter().all(TransactionHandle::is_finished)) {
            return;
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Waits until at least one set in `sets` has every handle finished.
/// Returns the index of the first such set.
pub async fn wait_for_any_set(sets: &[Vec<TransactionHandle>]) -> usize {
    loop {
        if let Some(idx) = sets.iter().position(|set| set.iter().all(TransactionHandle::is_finished)) {
            return idx;
        }
        sleep(POLL_INTERVAL).await;
    }
}
