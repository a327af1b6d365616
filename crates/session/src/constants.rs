// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Protocol timing constants, carried over verbatim from
//! `generic_session.py`'s module-level constants.

use std::time::Duration;

/// Startup liveness gate: how long `Session::start` waits for the first
/// network-monitor message before giving up (non-fatally).
pub const START_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum interval between two net-config requests to the same peer.
pub const NETCONFIG_REQUEST_DELAY: Duration = Duration::from_secs(300);

/// Supervisor tick period.
pub const SUPERVISOR_TICK: Duration = Duration::from_millis(100);

/// Starting delay for the supervisor's reconnect backoff.
pub const RECONNECT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Ceiling for the supervisor's reconnect backoff.
pub const RECONNECT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Poll interval for `wait_for_node`/`wait_for_any_node`, matching the
/// `generic_session.py` originals' 0.1s polling loop.
pub const DIRECTORY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fallback recheck period for the dispatch workers' stop flag.
/// `Notify::notify_waiters` only wakes tasks already parked on `.notified()`;
/// a worker still inside its initial `subscribe().await` when `close` runs
/// would otherwise never see that wakeup, so each worker also re-checks
/// `SessionHandle::is_stopped` on this tick as a bounded-latency backstop.
pub const STOP_CHECK_TICK: Duration = Duration::from_millis(50);
