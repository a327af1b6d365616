// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Derives the four well-known channel names from a configurable root and
//! entity id, per spec.md §6.

/// The four broker channels a Session subscribes/publishes to.
#[derive(Debug, Clone)]
pub struct ChannelSet {
    pub config: String,
    pub ctrl: String,
    pub notif: String,
    pub payloads: String,
}

impl ChannelSet {
    #[must_use]
    pub fn derive(root: &str, entity_id: &str) -> Self {
        Self {
            config: format!("{root}/{entity_id}/config"),
            ctrl: format!("{root}/{entity_id}/ctrl"),
            notif: format!("{root}/{entity_id}/notif"),
            payloads: format!("{root}/{entity_id}/payloads"),
        }
    }
}
