// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Shared address newtypes and small helpers used by every other crate in
//! the edge mesh session SDK.

mod address;

pub use address::{EthAddress, EthAddressParseError, NodeAddress};

/// RFC3339 timestamp with microsecond precision, UTC.
///
/// Matches the wire format spec.md §6 requires for `TIME` and
/// `NETMON_LAST_REMOTE_TIME`.
#[must_use]
pub fn timestamp_now_rfc3339_micros() -> String {
    format_rfc3339_micros(time::OffsetDateTime::now_utc())
}

/// Formats a given instant as an RFC3339 timestamp with microsecond precision.
#[must_use]
pub fn format_rfc3339_micros(dt: time::OffsetDateTime) -> String {
    use time::format_description::well_known::Rfc3339;
    dt.format(&Rfc3339).unwrap_or_else(|_| "1970-01-01T00:00:00.000000Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_formatting_is_stable() {
        let ts = timestamp_now_rfc3339_micros();
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z'));
    }
}
