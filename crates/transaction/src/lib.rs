// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Deadline-bound matching of inbound envelopes against outstanding
//! commands. The Session's supervisor owns the only writer to the tracker;
//! callers get back a cheap, pollable handle.

mod error;
mod matcher;
mod tracker;
mod transaction;

pub use error::{Result, TransactionError};
pub use matcher::{FromSender, ResponseMatcher};
pub use tracker::{wait_for_any_set, wait_for_all_sets, wait_for_transactions, TransactionTracker};
pub use transaction::{Transaction, TransactionHandle};
