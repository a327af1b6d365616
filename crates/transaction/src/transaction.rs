// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use crate::matcher::ResponseMatcher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared outcome flags a [`TransactionHandle`] polls and a [`Transaction`]
/// fills in from the supervisor's reaping pass.
#[derive(Default)]
struct Outcome {
    finished: AtomicBool,
    succeeded: AtomicBool,
}

/// A registered response expectation: a matcher per required reply, a
/// monotonic deadline, and the shared outcome cell the caller's
/// [`TransactionHandle`] polls.
pub struct Transaction {
    pub session_id: String,
    matchers: Vec<Box<dyn ResponseMatcher>>,
    deadline: Instant,
    outcome: Arc<Outcome>,
}

/// What the caller holds onto after registering a transaction.
#[derive(Clone)]
pub struct TransactionHandle {
    outcome: Arc<Outcome>,
}

impl TransactionHandle {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.outcome.finished.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.outcome.succeeded.load(Ordering::Acquire)
    }
}

impl Transaction {
    #[must_use]
    pub fn new(
        session_id: String,
        matchers: Vec<Box<dyn ResponseMatcher>>,
        deadline: Instant,
    ) -> (Self, TransactionHandle) {
        let outcome = Arc::new(Outcome::default());
        let handle = TransactionHandle { outcome: outcome.clone() };
        (Self { session_id, matchers, deadline, outcome }, handle)
    }

    /// Offers one inbound envelope to every unsatisfied matcher.
    pub fn offer(&mut self, envelope: &meshsdk_envelope::Envelope) {
        for matcher in &mut self.matchers {
            matcher.offer(envelope);
        }
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.matchers.iter().all(|m| m.is_satisfied())
    }

    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    pub fn mark_finished(&self, succeeded: bool) {
        self.outcome.succeeded.store(succeeded, Ordering::Release);
        self.outcome.finished.store(true, Ordering::Release);
    }
}
